//! HTTP evidence provider (feature `http`).
//!
//! Generic client for JSON evidence services: it POSTs the candidate
//! profile to a configured endpoint and expects an [`EvidencePayload`]
//! back. Transient failures are retried with exponential backoff;
//! anything still failing after that surfaces as a transport error for
//! the orchestrator to record.

use backon::{ExponentialBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use async_trait::async_trait;
use vetter_core::{Candidate, EvidenceBundle, EvidencePayload, RequirementSet};

use super::{EvidenceProvider, ProviderError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_RETRIES: usize = 3;

/// Evidence provider backed by a JSON-over-HTTP service.
pub struct HttpEvidenceProvider {
    name: String,
    endpoint: String,
    api_key: Option<SecretString>,
    confidence: f64,
    client: reqwest::Client,
}

impl HttpEvidenceProvider {
    /// Build a provider for one endpoint.
    ///
    /// `confidence` is the trust assigned to bundles this source
    /// produces, in `[0.0, 1.0]`.
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: Option<SecretString>,
        confidence: f64,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key,
            confidence: confidence.clamp(0.0, 1.0),
            client,
        })
    }

    async fn query(&self, candidate: &Candidate, requirements: &RequirementSet) -> Result<Option<EvidencePayload>, ProviderError> {
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "candidate": candidate,
            "requirement_id": requirements.id,
            "keywords": requirements.keywords,
        }));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(DEFAULT_TIMEOUT)
            } else {
                ProviderError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }
        if status.as_u16() == 404 {
            // The service knows nothing about this candidate.
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::Transport(format!(
                "{} returned {}",
                self.name, status
            )));
        }

        let payload: EvidencePayload = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(Some(payload))
    }
}

#[async_trait]
impl EvidenceProvider for HttpEvidenceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        candidate: &Candidate,
        requirements: &RequirementSet,
    ) -> Result<EvidenceBundle, ProviderError> {
        let payload = (|| self.query(candidate, requirements))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(250))
                    .with_max_times(MAX_RETRIES),
            )
            .when(|err| matches!(err, ProviderError::Transport(_) | ProviderError::RateLimited { .. }))
            .await?;

        match payload {
            Some(payload) => {
                debug!(provider = %self.name, candidate = %candidate.id, "evidence fetched");
                Ok(EvidenceBundle::new(
                    self.name.clone(),
                    payload,
                    self.confidence,
                ))
            }
            None => Ok(EvidenceBundle::empty(self.name.clone())),
        }
    }
}
