#![allow(dead_code)]

use adcritic::errors::ProviderError;
use adcritic::models::Dimension;
use adcritic::services::{InferenceProvider, ProviderRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted provider that counts its calls.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn answering(text: impl Into<String>) -> Arc<Self> {
        Self::new(vec![Ok(text.into())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _request: &ProviderRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Transport("script exhausted".into())))
    }
}

pub fn analysis_json(overall: u64) -> Value {
    let metrics: Vec<Value> = Dimension::ALL
        .iter()
        .map(|d| {
            json!({
                "name": d.label(),
                "score": 7,
                "diagnostic": format!("{} is fine", d.label()),
                "improvement": format!("Sharpen the {}", d.label())
            })
        })
        .collect();

    json!({
        "overallScore": overall,
        "metrics": metrics,
        "aiSuggestion": "Put the offer above the fold.",
        "suggestedTitle": "Half price this week",
        "suggestedSubtitle": "Every plan, no contract",
        "suggestedCTA": "Start free trial",
        "finalObservations": "The creative is close; the offer needs to lead."
    })
}

/// Wraps text the way Gemini's generateContent returns it.
pub fn gemini_envelope(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 1290, "candidatesTokenCount": 420, "totalTokenCount": 1710}
    })
    .to_string()
}
