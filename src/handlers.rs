// src/handlers.rs
use crate::{
    AppState,
    errors::{CritiqueError, ValidationError},
    models::*,
    services::encoder::MAX_FILE_BYTES,
};
use actix_multipart::{Multipart, MultipartError};
use actix_web::{HttpResponse, web};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use log::{error, info};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/analyze", web::post().to(analyze_creative))
            .route("/analysis", web::get().to(get_analysis))
            .route("/analysis", web::delete().to(reset_analysis))
            .route("/dimensions", web::get().to(list_dimensions)),
    )
    .route("/health", web::get().to(health_check));
}

pub async fn analyze_creative(
    payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, CritiqueError> {
    // Claim the slot before buffering so a busy service refuses early.
    let guard = data.slot.begin()?;
    let file = match read_creative(payload).await {
        Ok(file) => file,
        Err(e) => {
            guard.fail();
            return Err(e);
        }
    };

    match data.analysis_client.run(&file).await {
        Ok(report) => {
            info!(
                "Analysis {} by {} scored {} in {} ms",
                report.id,
                data.analysis_client.model(),
                report.result.overall_score,
                report.processing_time_ms
            );
            if !guard.complete(report.clone()) {
                info!("Analysis {} finished after a reset, not stored", report.id);
            }
            Ok(HttpResponse::Ok().json(&report))
        }
        Err(e) => {
            error!("Analysis failed ({}): {}", e.kind(), e);
            guard.fail();
            Err(e)
        }
    }
}

pub async fn get_analysis(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.slot.snapshot())
}

pub async fn reset_analysis(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.slot.reset())
}

pub async fn list_dimensions() -> HttpResponse {
    let dimensions: Vec<_> = Dimension::ALL
        .iter()
        .map(|d| {
            serde_json::json!({
                "id": d,
                "label": d.label(),
                "question": d.question()
            })
        })
        .collect();

    HttpResponse::Ok().json(serde_json::json!({ "dimensions": dimensions }))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Reads the single file field of the form, stopping once it outgrows the
/// size limit.
async fn read_creative(mut payload: Multipart) -> Result<CreativeFile, CritiqueError> {
    let mut creative: Option<CreativeFile> = None;

    while let Some(mut field) = payload.try_next().await.map_err(upload_error)? {
        let filename = field
            .content_disposition()
            .get_filename()
            .map(|name| name.to_string());

        let Some(filename) = filename else {
            while field.try_next().await.map_err(upload_error)?.is_some() {}
            continue;
        };

        if creative.is_some() {
            return Err(CritiqueError::Upload(
                "only one creative can be analyzed at a time".to_string(),
            ));
        }

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut image_data = BytesMut::new();
        while let Some(chunk) = field.try_next().await.map_err(upload_error)? {
            image_data.extend_from_slice(&chunk);
            if image_data.len() > MAX_FILE_BYTES {
                return Err(ValidationError::Oversized {
                    size: image_data.len(),
                    limit: MAX_FILE_BYTES,
                }
                .into());
            }
        }

        creative = Some(CreativeFile::new(content_type, image_data.freeze()).with_filename(filename));
    }

    creative.ok_or_else(|| CritiqueError::Upload("no file was uploaded".to_string()))
}

fn upload_error(e: MultipartError) -> CritiqueError {
    CritiqueError::Upload(e.to_string())
}
