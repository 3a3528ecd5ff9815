use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::models::{parse_prediction, Prediction, PredictionRequest};
use crate::error::PredictionError;

/// Anything that can turn a match setup into a win probability.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, PredictionError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Client for the HTTP inference service (`POST /predict`).
#[derive(Clone)]
pub struct HttpPredictionClient {
    http: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpPredictionClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpPredictionClient {
            http,
            endpoint: endpoint.to_string(),
            timeout,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> PredictionError {
        if e.is_timeout() {
            PredictionError::Timeout(self.timeout)
        } else {
            PredictionError::Transport(e)
        }
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, PredictionError> {
        debug!("POST {} {:?}", self.endpoint, request);

        let resp = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PredictionError::Status { status, body });
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PredictionError::MalformedResponse(e.to_string()))?;
        debug!("Prediction response: {}", raw);

        let prediction = parse_prediction(&raw)?;
        info!(
            "Prediction {} vs {}: {:.2}%",
            request.team1, request.team2, prediction.win_probability
        );
        Ok(prediction)
    }
}
