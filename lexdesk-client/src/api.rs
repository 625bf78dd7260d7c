//! HTTP plumbing for the LexDesk backend
//!
//! Every endpoint answers with the same `{success, message, data}` envelope.
//! This module owns the reqwest client, bearer-token injection and the
//! mapping from HTTP failures to [`LexError`].

use lexdesk_core::{ApiConfig, ErrorContext, LexError, LexResult};
use lexdesk_session::SessionContext;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Response envelope shared by all endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload; `success: false` becomes an authentication error
    /// carrying the server message, or `fallback` when there is none
    pub fn into_data(self, fallback: &str, operation: &str) -> LexResult<T> {
        if !self.success {
            return Err(LexError::Authentication {
                message: self
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
                status: None,
                context: ErrorContext::new("api_client").with_operation(operation),
            });
        }

        self.data.ok_or_else(|| LexError::Network {
            message: "Malformed response: missing data".to_string(),
            status: None,
            source: None,
            context: ErrorContext::new("api_client").with_operation(operation),
        })
    }

    /// Check the flag only; for endpoints without a payload
    pub fn into_ack(self, fallback: &str, operation: &str) -> LexResult<()> {
        if self.success {
            return Ok(());
        }
        Err(LexError::Authentication {
            message: self
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| fallback.to_string()),
            status: None,
            context: ErrorContext::new("api_client").with_operation(operation),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &ApiConfig) -> LexResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            LexError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );
    headers.insert(
        reqwest::header::CONTENT_TYPE,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| LexError::Internal {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}

/// Helper function to turn a non-2xx response into an error.
///
/// The message is the body's `message` when the body is JSON and has one,
/// otherwise `HTTP error! status: <code>`.
pub(crate) async fn handle_response_error(response: reqwest::Response, operation: &str) -> LexError {
    let status = response.status();
    let url = response.url().clone();

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

    debug!("Request to {} failed with {}: {}", url, status, message);

    let context = ErrorContext::new("api_client")
        .with_operation(operation)
        .with_metadata("url", url.as_str());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LexError::Authentication {
            message,
            status: Some(status.as_u16()),
            context: context.with_suggestion("Log in again"),
        },
        _ => LexError::Network {
            message,
            status: Some(status.as_u16()),
            source: None,
            context: context.with_suggestion(if status.is_server_error() {
                "The server is having trouble; try again shortly"
            } else {
                "Check the request and the API base URL"
            }),
        },
    }
}

/// JSON client bound to one base URL, attaching the session's bearer token
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Option<SessionContext>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Option<SessionContext>) -> LexResult<Self> {
        url::Url::parse(&config.base_url).map_err(|e| LexError::Config {
            message: format!("Invalid API base URL '{}': {}", config.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("api_client")
                .with_operation("new")
                .with_suggestion("Set api.base_url or LEXDESK_API_URL to an absolute URL"),
        })?;

        Ok(Self {
            client: create_http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Send a request and return the response once its status is 2xx
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> LexResult<reqwest::Response> {
        let url = self.endpoint_url(endpoint);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url.as_str());

        if let Some(session) = &self.session {
            if let Some(token) = session.token().await {
                request = request.bearer_auth(token);
            }
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| LexError::Network {
            message: if e.is_timeout() {
                format!("Request to {} timed out", url)
            } else {
                format!("Failed to reach {}: {}", url, e)
            },
            status: None,
            source: Some(Box::new(e)),
            context: ErrorContext::new("api_client")
                .with_operation(endpoint)
                .with_suggestion("Check network connectivity and the API base URL"),
        })?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, endpoint).await);
        }

        Ok(response)
    }

    /// Send a request and decode the JSON body
    pub async fn request<T, B>(&self, method: Method, endpoint: &str, body: Option<&B>) -> LexResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(method, endpoint, body).await?;

        response.json::<T>().await.map_err(|e| LexError::Network {
            message: format!("Malformed response from {}: {}", endpoint, e),
            status: None,
            source: Some(Box::new(e)),
            context: ErrorContext::new("api_client").with_operation(endpoint),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> LexResult<T> {
        self.request::<T, ()>(Method::GET, endpoint, None).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> LexResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> LexResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, endpoint, Some(body)).await
    }
}
