use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use super::types::{CreateResponseRequest, ErrorEnvelope, ResponseObject};
use crate::config::{ApiKey, ProbeConfig};

/// Transport timeout, matching the vendor SDK default (10 minutes)
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// CLI version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to initialize HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("invalid API base URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("API request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("failed to decode API response: {0}")]
    Decode(#[source] serde_json::Error),
}

fn build_user_agent() -> String {
    format!("openai-probe/{}", DEFAULT_VERSION)
}

/// Build `{base_url}/responses`, tolerating a base URL with or without a
/// trailing slash.
pub(crate) fn build_responses_url(base_url: &str) -> Result<Url, ApiError> {
    let invalid = |source| ApiError::InvalidUrl {
        url: base_url.to_string(),
        source,
    };

    let mut base = Url::parse(base_url).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("responses").map_err(invalid)
}

/// Summarize a non-success response body, preferring the API's own message.
fn describe_error_body(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let detail = envelope.error;
        let code = detail
            .code
            .filter(|code| !code.is_null())
            .map(|code| match code.as_str() {
                Some(s) => s.to_string(),
                None => code.to_string(),
            });
        return match (detail.kind, code) {
            (Some(kind), Some(code)) => {
                format!("{} (type: {}, code: {})", detail.message, kind, code)
            }
            (Some(kind), _) => format!("{} (type: {})", detail.message, kind),
            _ => detail.message,
        };
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

/// HTTP client for the OpenAI API, without credentials
pub struct ApiClient {
    client: Client,
    user_agent: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// Fails only when the HTTP stack itself cannot be initialized.
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            client,
            user_agent: build_user_agent(),
        })
    }

    /// Create a model response. Sent exactly once; no retries.
    pub async fn create_response(
        &self,
        base_url: &str,
        api_key: &ApiKey,
        organization: Option<&str>,
        project: Option<&str>,
        body: &CreateResponseRequest,
    ) -> Result<ResponseObject, ApiError> {
        let url = build_responses_url(base_url)?;
        let request_id = Uuid::new_v4().to_string();

        debug!("=== Create Response Request ===");
        debug!("URL: {}", url);
        debug!("Model: {}", body.model);
        debug!("Request ID: {}", request_id);

        let mut request = self
            .client
            .post(url.clone())
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.user_agent)
            .header("X-Client-Request-Id", &request_id)
            .bearer_auth(api_key.expose())
            .json(body);
        if let Some(organization) = organization {
            request = request.header("OpenAI-Organization", organization);
        }
        if let Some(project) = project {
            request = request.header("OpenAI-Project", project);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        debug!("=== Create Response Response ===");
        debug!("Status: {}", status);

        let text = response
            .text()
            .await
            .map_err(|source| ApiError::Transport { url, source })?;

        if !status.is_success() {
            let message = describe_error_body(status, &text);
            error!("Create response failed with status {}: {}", status, message);
            return Err(ApiError::Status { status, message });
        }

        serde_json::from_str(&text).map_err(ApiError::Decode)
    }
}

/// API client bound to one credential and account scope.
pub struct AuthenticatedClient {
    inner: ApiClient,
    base_url: String,
    api_key: ApiKey,
    organization: Option<String>,
    project: Option<String>,
}

impl AuthenticatedClient {
    pub fn new(inner: ApiClient, api_key: ApiKey, config: &ProbeConfig) -> Self {
        Self {
            inner,
            base_url: config.base_url.clone(),
            api_key,
            organization: config.organization.clone(),
            project: config.project.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    pub async fn create_response(
        &self,
        body: &CreateResponseRequest,
    ) -> Result<ResponseObject, ApiError> {
        self.inner
            .create_response(
                &self.base_url,
                &self.api_key,
                self.organization.as_deref(),
                self.project.as_deref(),
                body,
            )
            .await
    }
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
