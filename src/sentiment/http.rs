// MoodReel HTTP Classifier
// Copyright (c) 2026 Xing_The_Creator | MoodReel
//
// Speaks the Hugging Face inference wire format:
//   POST {"inputs": "..."}  ->  [[{"label": "POSITIVE", "score": 0.99}, ...]]

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{rank, Classifier, ClassifierLoader, SentimentError, SentimentScore};

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceBody {
    Batched(Vec<Vec<SentimentScore>>),
    Flat(Vec<SentimentScore>),
}

/// Ranked scores from a response body. Batched bodies use their first entry.
pub fn parse_inference_body(body: &str) -> Result<Vec<SentimentScore>, SentimentError> {
    let parsed: InferenceBody =
        serde_json::from_str(body).map_err(|e| SentimentError::Malformed(e.to_string()))?;
    let scores = match parsed {
        InferenceBody::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
        InferenceBody::Flat(scores) => scores,
    };
    if scores.is_empty() {
        return Err(SentimentError::Empty);
    }
    Ok(rank(scores))
}

pub struct HttpClassifier {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<SentimentScore>, SentimentError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "inputs": text }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SentimentError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!("[SENTIMENT] {} answered: {}", self.endpoint, body);
        parse_inference_body(&body)
    }

    fn name(&self) -> &str {
        self.endpoint.as_str()
    }
}

pub struct HttpClassifierLoader {
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpClassifierLoader {
    pub fn new(endpoint: &str, token: Option<&str>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            token: token.map(str::to_string),
            timeout,
        }
    }
}

#[async_trait]
impl ClassifierLoader for HttpClassifierLoader {
    async fn load(&self) -> Result<Arc<dyn Classifier>, SentimentError> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| SentimentError::Load(format!("invalid endpoint '{}': {}", self.endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SentimentError::Load(format!(
                "unsupported scheme '{}'",
                endpoint.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| SentimentError::Load(e.to_string()))?;

        info!("[SENTIMENT] Using inference endpoint {}", endpoint);
        Ok(Arc::new(HttpClassifier {
            client,
            endpoint,
            token: self.token.clone(),
        }))
    }
}
