//! HTTP client for the OpenAI API.

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::OpenAIError;
use crate::error::Result;
use crate::resources::Chat;
use crate::resources::Messages;
use crate::resources::Runs;
use crate::resources::Threads;
use crate::retry::RetryExecutor;

/// Environment variable for API key.
const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Header carrying the assistants API version marker.
const BETA_HEADER: &str = "OpenAI-Beta";

/// Endpoint family of a request; assistants endpoints need the beta header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFamily {
    /// `/chat/completions`.
    Chat,
    /// `/threads`, thread messages and runs.
    Assistants,
}

/// The OpenAI API client.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: reqwest::Client,
    config: ClientConfig,
    default_headers: HeaderMap,
    assistants_headers: HeaderMap,
    retry: RetryExecutor,
}

impl Client {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(OpenAIError::Configuration("API key is required".to_string()));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|_| {
            OpenAIError::Configuration("API key contains invalid header characters".to_string())
        })?;
        default_headers.insert(AUTHORIZATION, auth);

        let mut assistants_headers = default_headers.clone();
        let beta = HeaderValue::from_str(&config.assistants_beta).map_err(|_| {
            OpenAIError::Configuration(format!(
                "invalid assistants beta header value: {}",
                config.assistants_beta
            ))
        })?;
        assistants_headers.insert(BETA_HEADER, beta);

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OpenAIError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let retry = RetryExecutor::new(
            config.retry.clone(),
            config.clock.clone(),
            config.telemetry.clone(),
        );

        Ok(Self {
            http_client,
            config,
            default_headers,
            assistants_headers,
            retry,
        })
    }

    /// Create a new client using the OPENAI_API_KEY environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            OpenAIError::Configuration(format!("Missing {API_KEY_ENV} environment variable"))
        })?;

        Self::new(ClientConfig::new(api_key))
    }

    /// Create a new client with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::new(api_key))
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the chat-completions resource.
    pub fn chat(&self) -> Chat<'_> {
        Chat::new(self)
    }

    /// Get the threads resource.
    pub fn threads(&self) -> Threads<'_> {
        Threads::new(self)
    }

    /// Get the thread messages resource.
    pub fn messages(&self) -> Messages<'_> {
        Messages::new(self)
    }

    /// Get the runs resource.
    pub fn runs(&self) -> Runs<'_> {
        Runs::new(self)
    }

    fn headers(&self, family: ApiFamily) -> &HeaderMap {
        match family {
            ApiFamily::Chat => &self.default_headers,
            ApiFamily::Assistants => &self.assistants_headers,
        }
    }

    /// Send a request with retries and decode the JSON response.
    ///
    /// `path` is appended to the configured base URL. Network failures,
    /// HTTP 429 and 5xx responses are retried per the retry policy; other
    /// client errors fail on the first attempt. `operation` labels log lines
    /// and errors.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        family: ApiFamily,
        operation: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let url = url.as_str();
        let method = &method;
        let headers = self.headers(family);

        self.retry
            .execute(operation, move |attempt| {
                self.attempt(method, url, headers, body, operation, attempt)
            })
            .await
    }

    /// Send a POST request to the API.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
        family: ApiFamily,
        operation: &str,
    ) -> Result<T> {
        self.send(Method::POST, path, Some(&body), family, operation).await
    }

    /// Send a GET request to the API.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        family: ApiFamily,
        operation: &str,
    ) -> Result<T> {
        self.send(Method::GET, path, None, family, operation).await
    }

    fn elapsed_since(&self, start: std::time::Instant) -> std::time::Duration {
        self.config.clock.now().saturating_duration_since(start)
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&serde_json::Value>,
        operation: &str,
        attempt: i32,
    ) -> Result<T> {
        let telemetry = &self.config.telemetry;
        let start = self.config.clock.now();

        let mut request = self
            .http_client
            .request(method.clone(), url)
            .headers(headers.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = OpenAIError::network(operation, &e);
                let elapsed = self.elapsed_since(start);
                telemetry.on_request(operation, attempt, None, Some(&error), elapsed);
                return Err(error);
            }
        };

        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body_text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let error = OpenAIError::network(operation, &e);
                let elapsed = self.elapsed_since(start);
                telemetry.on_request(operation, attempt, Some(status), Some(&error), elapsed);
                return Err(error);
            }
        };

        if !status.is_success() {
            let error = parse_api_error(operation, status.as_u16(), &body_text, request_id);
            let elapsed = self.elapsed_since(start);
            telemetry.on_request(operation, attempt, Some(status), Some(&error), elapsed);
            return Err(error);
        }

        let elapsed = self.elapsed_since(start);
        telemetry.on_request(operation, attempt, Some(status), None, elapsed);

        serde_json::from_str(&body_text).map_err(|e| OpenAIError::Parse {
            operation: operation.to_string(),
            message: format!("{e}\nBody: {body_text}"),
        })
    }
}

/// Parse an API error response.
fn parse_api_error(
    operation: &str,
    status: u16,
    body: &str,
    request_id: Option<String>,
) -> OpenAIError {
    // Try to parse structured error
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(error_response) => match error_response.error.code {
            Some(code) if !code.is_empty() => {
                format!("{} ({code})", error_response.error.message)
            }
            _ => error_response.error.message,
        },
        Err(_) => body.to_string(),
    };

    OpenAIError::Api {
        operation: operation.to_string(),
        status,
        message,
        request_id,
    }
}

/// API error response structure.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

#[cfg(test)]
#[path = "client.test.rs"]
mod tests;
