//! HTTP transport boundary
//!
//! The `Transport` trait is the only place the crate touches the network.
//! Operations hand it a fully-built [`ApiRequest`] and get back a parsed
//! [`ResponseBody`] or a [`CoreError`]. Swapping the transport is how tests
//! observe which requests were (or were not) sent.

use crate::error::{CoreError, Result, ValidationError};
use crate::options::ConnectionOptions;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use reqwest::{Method, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// User agent string for qualtrics-core HTTP requests
const USER_AGENT: &str = concat!("qualtrics-core/", env!("CARGO_PKG_VERSION"));

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as `application/json`
    Json(Value),
    /// Serialized as `multipart/form-data`
    Form(Vec<(String, String)>),
}

/// One request against the Qualtrics API
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Route relative to the datacenter host, query string included
    pub route: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
    /// Hand back the body as [`ResponseBody::Bytes`] without content-type parsing
    pub raw: bool,
}

impl ApiRequest {
    /// GET without a body, POST otherwise
    #[must_use]
    pub fn method(&self) -> Method {
        if self.body.is_some() {
            Method::POST
        } else {
            Method::GET
        }
    }
}

/// Response parsed according to its content type
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

impl ResponseBody {
    /// Short name of the body kind, for error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseBody::Json(_) => "JSON",
            ResponseBody::Text(_) => "text",
            ResponseBody::Bytes(_) => "binary",
        }
    }

    /// Require a JSON body
    pub fn into_json(self, context: &'static str) -> Result<Value> {
        match self {
            ResponseBody::Json(value) => Ok(value),
            other => Err(ValidationError::UnexpectedBody {
                context,
                found: other.kind(),
            }
            .into()),
        }
    }

    /// Raw payload bytes regardless of how the body was parsed
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ResponseBody::Json(value) => value.to_string().into_bytes(),
            ResponseBody::Text(text) => text.into_bytes(),
            ResponseBody::Bytes(bytes) => bytes,
        }
    }
}

/// Executes a single HTTP request
///
/// Implementations must map non-2xx responses to [`CoreError::Api`] and
/// enforce `request.timeout`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ResponseBody>;
}

/// Production transport using reqwest
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport for the datacenter (or base URL override) in `options`
    pub fn new(options: &ConnectionOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .build()?;
        Ok(Self::with_client(client, options.resolve_base_url()?))
    }

    /// Use an existing reqwest client (shares its connection pool)
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ResponseBody> {
        let method = request.method();
        let url = self.base_url.join(&request.route).map_err(|e| {
            CoreError::Config(format!("Invalid route '{}': {}", request.route, e))
        })?;

        debug!(%method, %url, timeout_ms = request.timeout.as_millis() as u64, "Executing Qualtrics request");

        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .headers(request.headers)
            .timeout(request.timeout);

        match request.body {
            Some(RequestBody::Json(value)) => {
                builder = builder.header(ACCEPT, "application/json").json(&value);
            }
            Some(RequestBody::Form(fields)) => {
                let form = fields
                    .into_iter()
                    .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                        form.text(name, value)
                    });
                builder = builder.multipart(form);
            }
            None => {}
        }

        let response = builder.send().await.map_err(|e| {
            debug!(%method, %url, error = %e, "Qualtrics request failed");
            e
        })?;

        let status = response.status();
        debug!(%method, %url, %status, "Received Qualtrics response");

        if status.is_success() && request.raw {
            Ok(ResponseBody::Bytes(response.bytes().await?.to_vec()))
        } else if status.is_success() {
            parse_body(response).await
        } else {
            let body = response.text().await.unwrap_or_default();
            trace!(body = %body, "Error response body");
            Err(api_error(status.as_u16(), &body))
        }
    }
}

async fn parse_body(response: Response) -> Result<ResponseBody> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.contains("json") {
        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes).map_err(|e| ValidationError::InvalidShape {
            context: "Response body",
            reason: e.to_string(),
        })?;
        Ok(ResponseBody::Json(value))
    } else if content_type.starts_with("text/") {
        Ok(ResponseBody::Text(response.text().await?))
    } else {
        Ok(ResponseBody::Bytes(response.bytes().await?.to_vec()))
    }
}

/// Build an API error from a non-2xx body.
///
/// Qualtrics puts `{errorCode, errorMessage}` either under `error` or under
/// `meta.error`; anything else is carried through as plain text.
pub(crate) fn api_error(status: u16, body: &str) -> CoreError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let error = parsed
        .as_ref()
        .and_then(|v| v.get("error").or_else(|| v.pointer("/meta/error")));

    match error {
        Some(error) => CoreError::Api {
            status,
            code: error
                .get("errorCode")
                .and_then(Value::as_str)
                .map(str::to_string),
            message: error
                .get("errorMessage")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), str::to_string),
        },
        None => CoreError::Api {
            status,
            code: None,
            message: if body.trim().is_empty() {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                body.trim().to_string()
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_follows_body() {
        let mut request = ApiRequest {
            route: "/API/v3/whoami".to_string(),
            headers: HeaderMap::new(),
            body: None,
            timeout: Duration::from_secs(1),
            raw: false,
        };
        assert_eq!(request.method(), Method::GET);

        request.body = Some(RequestBody::Json(json!({})));
        assert_eq!(request.method(), Method::POST);
    }

    #[test]
    fn test_api_error_from_error_object() {
        let body = json!({"error": {"errorCode": "AUTH_1", "errorMessage": "Bad token"}});
        let err = api_error(401, &body.to_string());
        assert_eq!(err.to_string(), "401: AUTH_1: Bad token");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_api_error_from_meta_error() {
        let body = json!({
            "meta": {
                "httpStatus": "404 - Not Found",
                "error": {"errorCode": "RCE_1", "errorMessage": "Survey not found"}
            }
        });
        let err = api_error(404, &body.to_string());
        assert_eq!(err.to_string(), "404: RCE_1: Survey not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_api_error_plain_text() {
        assert_eq!(api_error(500, "boom").to_string(), "500: boom");
        assert_eq!(api_error(503, "").to_string(), "503: Service Unavailable");
    }

    #[test]
    fn test_into_json_rejects_bytes() {
        let err = ResponseBody::Bytes(vec![1, 2, 3])
            .into_json("Get Distribution response")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected binary body in Get Distribution response"
        );
    }

    #[test]
    fn test_into_bytes() {
        assert_eq!(ResponseBody::Text("a,b".into()).into_bytes(), b"a,b");
        assert_eq!(ResponseBody::Bytes(vec![7]).into_bytes(), vec![7]);
    }
}
