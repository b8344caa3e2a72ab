// src/models.rs
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An uploaded ad creative, borrowed by the core for a single analysis.
#[derive(Debug, Clone)]
pub struct CreativeFile {
    pub filename: Option<String>,
    pub content_type: String,
    pub data: Bytes,
}

impl CreativeFile {
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: None,
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [MediaType::Jpeg, MediaType::Png, MediaType::Webp];

    /// Parses a declared content type, ignoring case and `;` parameters.
    pub fn parse(declared: &str) -> Option<Self> {
        let essence = declared.split(';').next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(essence))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Webp => "image/webp",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub data: String,
    pub media_type: MediaType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: u8,
    pub metrics: Vec<Metric>,
    pub ai_suggestion: String,
    pub suggested_title: String,
    pub suggested_subtitle: String,
    #[serde(rename = "suggestedCTA")]
    pub suggested_cta: String,
    pub final_observations: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub score: u8,
    pub diagnostic: String,
    pub improvement: String,
}

impl Metric {
    pub fn dimension(&self) -> Option<Dimension> {
        Dimension::match_name(&self.name)
    }
}

/// The five axes every creative is scored on, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    MessageClarity,
    ValueProposition,
    VisualHierarchy,
    CallToAction,
    CopyAndLanguage,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::MessageClarity,
        Dimension::ValueProposition,
        Dimension::VisualHierarchy,
        Dimension::CallToAction,
        Dimension::CopyAndLanguage,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::MessageClarity => "Message Clarity",
            Dimension::ValueProposition => "Value Proposition",
            Dimension::VisualHierarchy => "Visual Hierarchy",
            Dimension::CallToAction => "CTA (Call to Action)",
            Dimension::CopyAndLanguage => "Copy and Language",
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            Dimension::MessageClarity => "Is the value proposition understood in under 3 seconds?",
            Dimension::ValueProposition => "Is the customer benefit clear and convincing?",
            Dimension::VisualHierarchy => {
                "Does the design lead the eye to the most important elements (offer, CTA)?"
            }
            Dimension::CallToAction => "Is there a clear and compelling call to action?",
            Dimension::CopyAndLanguage => {
                "Is the text persuasive, relevant to the audience and free of jargon?"
            }
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Dimension::MessageClarity => &["clarity", "clareza"],
            Dimension::ValueProposition => &["value", "proposta"],
            Dimension::VisualHierarchy => &["hierarchy", "hierarquia"],
            Dimension::CallToAction => &["cta", "call to action", "call-to-action"],
            Dimension::CopyAndLanguage => &["copy", "language", "linguagem"],
        }
    }

    /// Best-effort mapping of a provider-supplied metric name.
    pub fn match_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|d| d.label().to_lowercase() == lowered)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|d| d.keywords().iter().any(|k| lowered.contains(k)))
            })
    }
}

/// What the HTTP layer returns and keeps in its result slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub model: String,
    pub processing_time_ms: u64,
    pub result: AnalysisResult,
}
