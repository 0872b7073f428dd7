// Gemini API client for the generateContent endpoint

use super::GeminiError;
use crate::config::GeminiConfig;
use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::utils::logging::sanitize;
use crate::utils::retry::with_retry;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Status label for calls that timed out or never produced an HTTP response.
const TRANSPORT_FAILURE: u16 = 0;

/// Client for the Google Gemini REST API, authenticated with an API key.
///
/// Every call is bounded by `timeout_seconds`, retries included.
pub struct GeminiClient {
    http_client: Client,
    config: GeminiConfig,
    api_key: String,
}

impl GeminiClient {
    /// Create a client. Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Option<Self>, GeminiError> {
        match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Self::new(config, key.to_string()).map(Some),
            _ => Ok(None),
        }
    }

    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self, GeminiError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(5)))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| GeminiError::Http(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created Gemini HTTP client for model {}", config.model);

        Ok(Self {
            http_client,
            config: config.clone(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Call `generateContent` and return the parsed response.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.model
        );
        debug!("Calling generateContent API for model: {}", self.config.model);

        let http = &self.http_client;
        let api_key = self.api_key.as_str();
        let url = url.as_str();
        let attempts = self.config.max_retries + 1;

        let call = with_retry("generateContent", attempts, || async move {
            let response = http
                .post(url)
                .header("x-goog-api-key", api_key)
                .header("Content-Type", "application/json")
                .json(request)
                .send()
                .await
                .map_err(|e| (TRANSPORT_FAILURE, e.to_string()))?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err((status.as_u16(), body));
            }
            Ok(body)
        });

        let started = Instant::now();
        let timeout = self.config.timeout_seconds;
        let result = tokio::time::timeout(Duration::from_secs(timeout), call).await;
        let elapsed = started.elapsed().as_secs_f64();

        let body = match result {
            Err(_) => {
                crate::metrics::record_gemini_call(&self.config.model, TRANSPORT_FAILURE, elapsed);
                return Err(GeminiError::Timeout(timeout));
            }
            Ok(Err((TRANSPORT_FAILURE, detail))) => {
                crate::metrics::record_gemini_call(&self.config.model, TRANSPORT_FAILURE, elapsed);
                let detail = sanitize(&detail);
                error!("Gemini API request failed: {}", detail);
                return Err(GeminiError::Http(detail));
            }
            Ok(Err((status, body))) => {
                crate::metrics::record_gemini_call(&self.config.model, status, elapsed);
                let message = sanitize(&Self::extract_error_message(&body).unwrap_or(body));
                error!("Gemini API error: HTTP {} - {}", status, message);
                return Err(GeminiError::Status { status, message });
            }
            Ok(Ok(body)) => {
                crate::metrics::record_gemini_call(&self.config.model, 200, elapsed);
                body
            }
        };

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            GeminiError::Parse(e.to_string())
        })
    }

    /// Single-turn text generation: system instruction + user content in,
    /// first candidate's text out.
    pub async fn generate_text(
        &self,
        system: &str,
        user: &str,
        generation_config: GenerationConfig,
    ) -> Result<String, GeminiError> {
        let request = GenerateContentRequest::single_turn(system, user, generation_config);
        let response = self.generate_content(&request).await?;
        response.first_text().ok_or(GeminiError::EmptyResponse)
    }

    /// Extract error message from API response JSON
    fn extract_error_message(response_text: &str) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(serde::Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        let error_resp: ErrorResponse = serde_json::from_str(response_text).ok()?;
        let error = error_resp.error?;
        error.message.or(error.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_key_means_no_client() {
        let config = GeminiConfig::default();
        assert!(GeminiClient::from_config(&config).unwrap().is_none());

        let config = GeminiConfig {
            api_key: Some("  ".to_string()),
            ..GeminiConfig::default()
        };
        assert!(GeminiClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            GeminiClient::extract_error_message(body).as_deref(),
            Some("API key not valid")
        );
        assert!(GeminiClient::extract_error_message("plain text").is_none());
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = GeminiConfig {
            api_base_url: format!("http://{}", addr),
            max_retries: 0,
            timeout_seconds: 5,
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(&config, "test-key".to_string()).unwrap();
        assert_eq!(client.model(), "gemini-2.0-flash");

        let err = client
            .generate_text("system", "hello", GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::Http(_)), "unexpected error: {err:?}");
    }
}
