// src/services/encoder.rs
use crate::errors::ValidationError;
use crate::models::{CreativeFile, EncodedPayload, MediaType};
use base64::{Engine as _, engine::general_purpose};

/// 10 MiB.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Checks size then media type, and encodes the bytes for transport.
pub fn validate_and_encode(file: &CreativeFile) -> Result<EncodedPayload, ValidationError> {
    if file.size() > MAX_FILE_BYTES {
        return Err(ValidationError::Oversized {
            size: file.size(),
            limit: MAX_FILE_BYTES,
        });
    }

    let media_type = MediaType::parse(&file.content_type)
        .ok_or_else(|| ValidationError::UnsupportedType(file.content_type.clone()))?;

    Ok(EncodedPayload {
        data: general_purpose::STANDARD.encode(&file.data),
        media_type,
    })
}
