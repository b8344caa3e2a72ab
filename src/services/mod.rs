// src/services/mod.rs
pub mod analysis;
pub mod encoder;
pub mod gemini;
pub mod provider;

pub use analysis::{AnalysisClient, AnalysisOptions};
pub use encoder::validate_and_encode;
pub use gemini::GeminiProvider;
pub use provider::{InferenceProvider, ProviderRequest};
