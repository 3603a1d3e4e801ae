//! Qualtrics API client
//!
//! `QualtricsClient` pairs read-only [`ConnectionOptions`] with a
//! [`Transport`]. Cloning is cheap and clones share both, so one client can
//! serve any number of concurrent operations.

use crate::auth::auth_headers;
use crate::error::Result;
use crate::options::ConnectionOptions;
use crate::transport::{ApiRequest, RequestBody, ReqwestTransport, ResponseBody, Transport};
use reqwest::header::HeaderMap;
use std::borrow::Cow;
use std::sync::Arc;

/// Client for the Qualtrics REST API
#[derive(Clone)]
pub struct QualtricsClient {
    options: Arc<ConnectionOptions>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for QualtricsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualtricsClient")
            .field("datacenter_id", &self.options.datacenter_id)
            .field("base_url", &self.options.base_url)
            .finish_non_exhaustive()
    }
}

impl QualtricsClient {
    /// Create a client backed by the reqwest transport
    pub fn new(options: ConnectionOptions) -> Result<Self> {
        let transport = ReqwestTransport::new(&options)?;
        Ok(Self::with_transport(options, Arc::new(transport)))
    }

    /// Create a client with a custom transport
    pub fn with_transport(options: ConnectionOptions, transport: Arc<dyn Transport>) -> Self {
        Self {
            options: Arc::new(options),
            transport,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Versioned route for a resource path
    pub(crate) fn route(&self, path: &str) -> String {
        self.options.route(path)
    }

    /// Authorized GET
    pub(crate) async fn get(&self, route: String, bearer_token: Option<&str>) -> Result<ResponseBody> {
        let headers = self.authorize(bearer_token)?;
        self.send(route, headers, None).await
    }

    /// Authorized GET returning the body bytes exactly as served
    pub(crate) async fn get_raw(&self, route: String, bearer_token: Option<&str>) -> Result<Vec<u8>> {
        let headers = self.authorize(bearer_token)?;
        let response = self
            .transport
            .execute(ApiRequest {
                route,
                headers,
                body: None,
                timeout: self.options.timeout,
                raw: true,
            })
            .await?;
        Ok(response.into_bytes())
    }

    /// Authorized POST
    pub(crate) async fn post(
        &self,
        route: String,
        body: RequestBody,
        bearer_token: Option<&str>,
    ) -> Result<ResponseBody> {
        let headers = self.authorize(bearer_token)?;
        self.send(route, headers, Some(body)).await
    }

    /// Send with caller-supplied headers, skipping credential selection
    pub(crate) async fn send(
        &self,
        route: String,
        headers: HeaderMap,
        body: Option<RequestBody>,
    ) -> Result<ResponseBody> {
        self.transport
            .execute(ApiRequest {
                route,
                headers,
                body,
                timeout: self.options.timeout,
                raw: false,
            })
            .await
    }

    fn authorize(&self, bearer_token: Option<&str>) -> Result<HeaderMap> {
        auth_headers(self.options.api_token.as_deref(), bearer_token)
    }
}

/// Percent-encode one path segment (ids come from callers and remote responses)
pub(crate) fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockReply, MockTransport};
    use reqwest::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_credentials_never_reach_transport() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(
            Method::GET,
            "/API/v3/whoami",
            MockReply::Json(json!({"result": {}})),
        );
        let client = QualtricsClient::with_transport(ConnectionOptions::new("iad1"), transport.clone());

        let err = client
            .get(client.route("whoami"), None)
            .await
            .unwrap_err();

        assert!(err.is_config());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_request_carries_timeout_and_headers() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(Method::GET, "/API/v3/whoami", MockReply::Json(json!({})));
        let options = ConnectionOptions::builder("iad1")
            .api_token("tok")
            .timeout(std::time::Duration::from_secs(5))
            .build();
        let client = QualtricsClient::with_transport(options, transport.clone());

        client.get(client.route("whoami"), Some("ignored")).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].timeout, std::time::Duration::from_secs(5));
        assert_eq!(requests[0].headers.get("x-api-token").unwrap(), "tok");
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("SV_123"), "SV_123");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
