// src/services/provider.rs
use crate::errors::ProviderError;
use crate::models::EncodedPayload;
use crate::schema::SchemaNode;
use async_trait::async_trait;

/// Everything a multimodal provider needs for one analysis call.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model: String,
    pub image: EncodedPayload,
    pub instruction: String,
    pub response_schema: SchemaNode,
    pub response_mime_type: &'static str,
    pub temperature: f32,
}

/// Given an image and a schema, return text that should parse as JSON
/// matching the schema, or fail.
///
/// An empty string means the provider answered without any text.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &ProviderRequest) -> Result<String, ProviderError>;
}
