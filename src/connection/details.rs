use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::language::Language;

/// Short-lived credentials for one connection attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    pub server_url: String,
    pub participant_token: String,
}

/// Source of per-attempt connection details.
///
/// The session controller depends on this seam rather than on a concrete
/// HTTP client so the lifecycle can be exercised without a backend.
#[async_trait]
pub trait ConnectionDetailsProvider: Send + Sync {
    async fn fetch(&self, language: Language) -> AppResult<ConnectionDetails>;
}

/// HTTP implementation hitting the configured endpoint with the selected
/// language as a query parameter.
pub struct ConnectionDetailsFetcher {
    endpoint: String,
    client: reqwest::Client,
}

impl ConnectionDetailsFetcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ConnectionDetailsProvider for ConnectionDetailsFetcher {
    async fn fetch(&self, language: Language) -> AppResult<ConnectionDetails> {
        debug!(endpoint = %self.endpoint, %language, "fetching connection details");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("language", language.code())])
            .send()
            .await
            .map_err(|e| AppError::ConnectionDetails(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Non-2xx: the response body is the user-facing error message.
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(AppError::ConnectionDetails(message));
        }

        response
            .json::<ConnectionDetails>()
            .await
            .map_err(|e| AppError::ConnectionDetails(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_deserialize_camel_case() {
        let details: ConnectionDetails = serde_json::from_str(
            r#"{"serverUrl":"wss://agent.example.com","participantToken":"tok-123"}"#,
        )
        .unwrap();
        assert_eq!(details.server_url, "wss://agent.example.com");
        assert_eq!(details.participant_token, "tok-123");
    }

    #[test]
    fn test_details_reject_missing_token() {
        let result: Result<ConnectionDetails, _> =
            serde_json::from_str(r#"{"serverUrl":"wss://agent.example.com"}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_endpoint_wraps_error() {
        // Port 1 is never listening; the transport error must come back as
        // the generic connection-details condition.
        let fetcher = ConnectionDetailsFetcher::new("http://127.0.0.1:1/api/connection-details");
        let result = fetcher.fetch(Language::En).await;
        assert!(matches!(result, Err(AppError::ConnectionDetails(_))));
    }
}
