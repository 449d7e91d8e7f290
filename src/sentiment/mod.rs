// MoodReel Sentiment Classifiers
// Copyright (c) 2026 Xing_The_Creator | MoodReel
//
// The classifier is a black box: text in, a ranked list of label/score
// pairs out. Backends are loaded lazily through a `ClassifierLoader`.

pub mod http;
pub mod lexicon;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use http::{HttpClassifier, HttpClassifierLoader};
pub use lexicon::{LexiconClassifier, LexiconLoader};

/// One entry of a classifier's ranked output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: String,
    pub score: f32,
}

impl SentimentScore {
    pub fn new(label: &str, score: f32) -> Self {
        Self {
            label: label.to_string(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Other(String),
}

impl SentimentLabel {
    /// Labels are matched exactly, the way the model emits them.
    pub fn parse(label: &str) -> Self {
        match label {
            "POSITIVE" => SentimentLabel::Positive,
            "NEGATIVE" => SentimentLabel::Negative,
            other => SentimentLabel::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "POSITIVE"),
            SentimentLabel::Negative => write!(f, "NEGATIVE"),
            SentimentLabel::Other(label) => write!(f, "{}", label),
        }
    }
}

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("model unavailable: {0}")]
    Load(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("classifier answered with HTTP {0}")]
    Status(u16),

    #[error("unexpected classifier response: {0}")]
    Malformed(String),

    #[error("classifier returned no results")]
    Empty,
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Ranked by descending score.
    async fn classify(&self, text: &str) -> Result<Vec<SentimentScore>, SentimentError>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait ClassifierLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Classifier>, SentimentError>;
}

/// Sort descending by score, keeping the input order for ties.
pub fn rank(mut scores: Vec<SentimentScore>) -> Vec<SentimentScore> {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Read from `MOODREEL_CLASSIFIER_*` environment variables (`.env` is honoured).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Inference endpoint. Without one the offline lexicon is used.
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let timeout = non_empty("MOODREEL_CLASSIFIER_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            endpoint: non_empty("MOODREEL_CLASSIFIER_URL"),
            token: non_empty("MOODREEL_CLASSIFIER_TOKEN"),
            timeout: Duration::from_secs(timeout),
        }
    }

    pub fn loader(&self) -> Arc<dyn ClassifierLoader> {
        match &self.endpoint {
            Some(endpoint) => Arc::new(HttpClassifierLoader::new(
                endpoint,
                self.token.as_deref(),
                self.timeout,
            )),
            None => Arc::new(LexiconLoader),
        }
    }
}
