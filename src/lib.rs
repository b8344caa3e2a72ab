// src/lib.rs
//! Performance critiques of ad creatives by a multimodal model.

use std::sync::Arc;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod services;
pub mod state;

use crate::services::AnalysisClient;
use crate::state::AnalysisSlot;

#[derive(Clone)]
pub struct AppState {
    pub analysis_client: Arc<AnalysisClient>,
    pub slot: AnalysisSlot,
}

impl AppState {
    pub fn new(analysis_client: AnalysisClient) -> Self {
        Self {
            analysis_client: Arc::new(analysis_client),
            slot: AnalysisSlot::new(),
        }
    }
}
