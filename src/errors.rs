// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("file is {size} bytes, the limit is {limit} bytes")]
    Oversized { size: usize, limit: usize },

    #[error("unsupported media type '{0}', expected image/jpeg, image/png or image/webp")]
    UnsupportedType(String),
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::Oversized { .. } => "oversized",
            ValidationError::UnsupportedType(_) => "unsupported-type",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("credential rejected: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unreadable provider envelope: {0}")]
    Envelope(String),
}

impl ProviderError {
    /// Failures worth another attempt under a retry policy.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Transport(_)
            | ProviderError::Timeout(_)
            | ProviderError::RateLimited(_) => true,
            ProviderError::Api { status, .. } => *status >= 500,
            ProviderError::Unauthorized(_) | ProviderError::Envelope(_) => false,
        }
    }

    pub fn is_credential_issue(&self) -> bool {
        match self {
            ProviderError::Unauthorized(_) => true,
            ProviderError::Api { message, .. } | ProviderError::Transport(message) => {
                mentions_api_key(message)
            }
            _ => false,
        }
    }
}

pub(crate) fn mentions_api_key(message: &str) -> bool {
    message.contains("API key") || message.contains("API_KEY")
}

#[derive(Error, Debug)]
pub enum CritiqueError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid creative: {0}")]
    Validation(#[from] ValidationError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Provider response is not valid JSON: {0}")]
    MalformedResponse(String),

    #[error("Provider response has an invalid shape: {0}")]
    InvalidShape(String),

    #[error("An analysis is already in progress")]
    Busy,

    #[error("Invalid upload: {0}")]
    Upload(String),
}

impl CritiqueError {
    /// Stable code for logs, tests and the `kind` field of error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CritiqueError::Configuration(_) => "configuration",
            CritiqueError::Validation(e) => e.kind(),
            CritiqueError::Provider(e) if e.is_credential_issue() => "provider-credentials",
            CritiqueError::Provider(ProviderError::Timeout(_)) => "provider-timeout",
            CritiqueError::Provider(_) => "provider",
            CritiqueError::EmptyResponse => "empty-response",
            CritiqueError::MalformedResponse(_) => "malformed-response",
            CritiqueError::InvalidShape(_) => "invalid-shape",
            CritiqueError::Busy => "busy",
            CritiqueError::Upload(_) => "upload",
        }
    }

    /// The single human-readable message shown to users.
    pub fn user_message(&self) -> String {
        let detail = match self {
            CritiqueError::Provider(e) if e.is_credential_issue() => {
                "the provider API key is invalid or has expired".to_string()
            }
            CritiqueError::Validation(e) => e.to_string(),
            CritiqueError::Upload(reason) => reason.clone(),
            CritiqueError::Busy => "another analysis is still running".to_string(),
            _ => "the analysis could not be processed, please try again".to_string(),
        };
        format!("Analysis failed: {}", detail)
    }
}

impl ResponseError for CritiqueError {
    fn status_code(&self) -> StatusCode {
        match self {
            CritiqueError::Validation(ValidationError::Oversized { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            CritiqueError::Validation(ValidationError::UnsupportedType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            CritiqueError::Upload(_) => StatusCode::BAD_REQUEST,
            CritiqueError::Busy => StatusCode::CONFLICT,
            CritiqueError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CritiqueError::Provider(ProviderError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            CritiqueError::Provider(_)
            | CritiqueError::EmptyResponse
            | CritiqueError::MalformedResponse(_)
            | CritiqueError::InvalidShape(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": "Analysis failed",
            "kind": self.kind(),
            "message": self.user_message()
        }))
    }
}
