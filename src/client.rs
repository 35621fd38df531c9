//! Generation client: the narrow interface to the external text-generation
//! collaborator.
//!
//! The engine only depends on the [`GenerationClient`] trait — prompt in,
//! text out, typed failures. [`HttpGenerationClient`] adapts that contract
//! to the thin backend proxy, classifying HTTP status codes and provider
//! error messages into the stable [`GenerationError`] taxonomy. The client
//! never retries; retry policy, if any, belongs to callers outside the core
//! so run semantics stay predictable.

use async_trait::async_trait;
use miette::Diagnostic;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClientConfig;

/// One generation request as the proxy expects it on the wire.
#[derive(Clone, Debug, Serialize)]
pub struct GenerationRequest {
    /// Required, non-empty prompt.
    pub prompt: String,
    /// Caller-supplied credential overriding the server-side default.
    #[serde(rename = "personalApiKey")]
    pub personal_api_key: Option<String>,
    /// Model identifier.
    pub model: String,
}

/// Classified failure from the generation service.
///
/// The taxonomy is stable: downstream code matches on variants, never on
/// message text.
#[derive(Debug, Error, Diagnostic)]
pub enum GenerationError {
    #[error("invalid credential: {message}")]
    #[diagnostic(
        code(flowcanvas::client::invalid_credential),
        help("Check the personal API key on the generator node, or the server-side default.")
    )]
    InvalidCredential { message: String },

    #[error("rate limited: {message}")]
    #[diagnostic(
        code(flowcanvas::client::rate_limited),
        help("Wait and re-run; the provider is throttling requests.")
    )]
    RateLimited { message: String },

    #[error("region not supported: {message}")]
    #[diagnostic(code(flowcanvas::client::unsupported_region))]
    UnsupportedRegion { message: String },

    #[error("bad request: {message}")]
    #[diagnostic(code(flowcanvas::client::bad_request))]
    BadRequest { message: String },

    #[error("generation service unavailable: {message}")]
    #[diagnostic(
        code(flowcanvas::client::service_unavailable),
        help("The proxy or the provider could not be reached.")
    )]
    ServiceUnavailable { message: String },

    #[error("{message}")]
    #[diagnostic(code(flowcanvas::client::unknown))]
    Unknown { message: String },
}

/// Contract the execution engine depends on.
///
/// Implementations must not retry internally.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    output: Option<String>,
    error: Option<ProxyError>,
}

#[derive(Debug, Deserialize)]
struct ProxyError {
    message: String,
}

/// HTTP adapter to the backend generation proxy.
pub struct HttpGenerationClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpGenerationClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, mut request: GenerationRequest) -> Result<String, GenerationError> {
        if request.prompt.trim().is_empty() {
            return Err(GenerationError::BadRequest {
                message: "missing or empty prompt".to_string(),
            });
        }
        if request.personal_api_key.is_none() {
            request.personal_api_key = self.config.default_api_key.clone();
        }

        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::ServiceUnavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            let parsed: ProxyResponse =
                serde_json::from_str(&body).map_err(|e| GenerationError::Unknown {
                    message: format!("malformed proxy response: {e}"),
                })?;
            return match (parsed.output, parsed.error) {
                (Some(output), _) => Ok(output),
                (None, Some(err)) => Err(classify(status, &err.message)),
                (None, None) => Err(GenerationError::Unknown {
                    message: "proxy returned neither output nor error".to_string(),
                }),
            };
        }

        let message = serde_json::from_str::<ProxyResponse>(&body)
            .ok()
            .and_then(|p| p.error)
            .map(|e| e.message)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body.trim().to_string()
                }
            });

        Err(classify(status, &message))
    }
}

/// Maps an HTTP status plus provider message onto the stable taxonomy.
///
/// Explicit provider signals in the body (invalid key, quota, unsupported
/// location) take precedence within the 4xx range, mirroring how the
/// upstream provider reports them through the proxy.
fn classify(status: StatusCode, message: &str) -> GenerationError {
    let lower = message.to_ascii_lowercase();
    let invalid_key = lower.contains("api key not valid") || lower.contains("invalid api key");
    let quota = lower.contains("quota") || lower.contains("rate limit");
    let region = lower.contains("location is not supported") || lower.contains("unsupported region");
    let message = message.to_string();

    match status.as_u16() {
        401 => GenerationError::InvalidCredential { message },
        403 if region => GenerationError::UnsupportedRegion { message },
        403 => GenerationError::InvalidCredential { message },
        429 => GenerationError::RateLimited { message },
        400..=499 if invalid_key => GenerationError::InvalidCredential { message },
        400..=499 if region => GenerationError::UnsupportedRegion { message },
        400..=499 if quota => GenerationError::RateLimited { message },
        400..=499 => GenerationError::BadRequest { message },
        500..=599 => GenerationError::ServiceUnavailable { message },
        _ => GenerationError::Unknown { message },
    }
}
