// src/services/analysis.rs
use crate::config::{Config, DEFAULT_MODEL};
use crate::errors::{CritiqueError, ProviderError};
use crate::models::*;
use crate::schema::{SchemaNode, analysis_schema};
use crate::services::encoder::validate_and_encode;
use crate::services::gemini::GeminiProvider;
use crate::services::provider::{InferenceProvider, ProviderRequest};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const TEMPERATURE: f32 = 0.3;
pub const RESPONSE_MIME_TYPE: &str = "application/json";
pub const METRIC_COUNT: usize = Dimension::ALL.len();

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub model: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(60),
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl From<&Config> for AnalysisOptions {
    fn from(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            request_timeout: config.request_timeout,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        }
    }
}

pub struct AnalysisClient {
    provider: Arc<dyn InferenceProvider>,
    options: AnalysisOptions,
    instruction: String,
    schema: SchemaNode,
}

impl AnalysisClient {
    pub fn new(provider: Arc<dyn InferenceProvider>, options: AnalysisOptions) -> Self {
        Self {
            provider,
            options,
            instruction: instruction(),
            schema: analysis_schema(),
        }
    }

    /// Builds the Gemini-backed client; fails before any network use when
    /// the credential is missing.
    pub fn from_config(config: &Config) -> Result<Self, CritiqueError> {
        let provider = GeminiProvider::from_config(config)?;
        Ok(Self::new(Arc::new(provider), AnalysisOptions::from(config)))
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    pub async fn analyze_creative(
        &self,
        file: &CreativeFile,
    ) -> Result<AnalysisResult, CritiqueError> {
        let image = validate_and_encode(file)?;

        info!(
            "Analyzing creative {} ({}, {} bytes) with {}",
            file.filename.as_deref().unwrap_or("<unnamed>"),
            image.media_type,
            file.size(),
            self.options.model
        );
        debug!("Encoded payload is {} characters", image.data.len());

        let request = ProviderRequest {
            model: self.options.model.clone(),
            image,
            instruction: self.instruction.clone(),
            response_schema: self.schema.clone(),
            response_mime_type: RESPONSE_MIME_TYPE,
            temperature: TEMPERATURE,
        };

        let text = self.generate(&request).await?;
        parse_analysis(&text)
    }

    /// `analyze_creative` plus the envelope the HTTP layer hands out.
    pub async fn run(&self, file: &CreativeFile) -> Result<AnalysisReport, CritiqueError> {
        let start = Instant::now();
        let result = self.analyze_creative(file).await?;

        Ok(AnalysisReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            model: self.options.model.clone(),
            processing_time_ms: start.elapsed().as_millis() as u64,
            result,
        })
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let mut attempt = 0;
        let mut backoff = self.options.retry_backoff;

        loop {
            let outcome =
                match tokio::time::timeout(self.options.request_timeout, self.provider.generate(request))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ProviderError::Timeout(self.options.request_timeout)),
                };

            match outcome {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.options.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} call failed ({}), retry {}/{} in {:?}",
                        self.provider.name(),
                        e,
                        attempt,
                        self.options.max_retries,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(e) => {
                    error!("{} API error: {}", self.provider.name(), e);
                    return Err(e);
                }
            }
        }
    }
}

pub fn instruction() -> String {
    let dimensions = Dimension::ALL
        .iter()
        .enumerate()
        .map(|(i, d)| format!("{}. **{}**: {}", i + 1, d.label(), d.question()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze this image of an ad creative. Act as a performance marketing and growth marketing expert.\n\
         Your analysis must be critical, objective and focused on optimizing conversion. \
         Evaluate the creative on {count} essential dimensions, giving each one a score from 0 to 10, \
         a diagnostic and an improvement suggestion.\n\
         The {count} dimensions are:\n\
         {dimensions}\n\n\
         Besides the metrics, provide an overall score from 0 to 100, a summary of your analysis (AI suggestion), \
         and specific suggestions for Title, Subtitle, CTA and Final Observations.\n\
         Return your analysis strictly in the requested JSON format. \
         Do not include markdown or any text outside the JSON.",
        count = METRIC_COUNT,
        dimensions = dimensions
    )
}

/// Removes a leading "```json" (or bare "```") and a trailing "```".
///
/// Only the outermost pair is removed per call: a doubly fenced reply keeps
/// its inner fence, which the JSON parser then rejects as malformed.
pub fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Turns provider text into a validated result.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, CritiqueError> {
    if text.trim().is_empty() {
        return Err(CritiqueError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| CritiqueError::MalformedResponse(e.to_string()))?;

    check_shape(&value)?;

    let result: AnalysisResult = serde_json::from_value(value)
        .map_err(|e| CritiqueError::InvalidShape(e.to_string()))?;

    for metric in &result.metrics {
        if metric.dimension().is_none() {
            warn!("Metric '{}' does not match a known dimension", metric.name);
        }
    }

    Ok(result)
}

fn check_shape(value: &Value) -> Result<(), CritiqueError> {
    analysis_schema()
        .validate(value)
        .map_err(CritiqueError::InvalidShape)?;

    let overall = &value["overallScore"];
    if !in_range(overall, 100) {
        return Err(CritiqueError::InvalidShape(format!(
            "$.overallScore: {} is outside 0..=100",
            overall
        )));
    }

    let metrics = value["metrics"].as_array().map(Vec::as_slice).unwrap_or_default();
    if metrics.len() != METRIC_COUNT {
        return Err(CritiqueError::InvalidShape(format!(
            "$.metrics: expected {} entries, found {}",
            METRIC_COUNT,
            metrics.len()
        )));
    }

    for (index, metric) in metrics.iter().enumerate() {
        if !in_range(&metric["score"], 10) {
            return Err(CritiqueError::InvalidShape(format!(
                "$.metrics[{}].score: {} is outside 0..=10",
                index, metric["score"]
            )));
        }
        for field in ["name", "diagnostic", "improvement"] {
            if metric[field].as_str().is_none_or(|s| s.trim().is_empty()) {
                return Err(CritiqueError::InvalidShape(format!(
                    "$.metrics[{}].{}: must not be empty",
                    index, field
                )));
            }
        }
    }

    Ok(())
}

fn in_range(value: &Value, max: u64) -> bool {
    value.as_u64().is_some_and(|n| n <= max)
}
