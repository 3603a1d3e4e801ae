//! Connection checks and OAuth token exchange

use crate::auth::basic_auth_headers;
use crate::client::QualtricsClient;
use crate::error::{CoreError, Result};
use crate::transport::RequestBody;
use crate::validate::{parse_bare, parse_result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const INCORRECT_TEST_RESPONSE: &str = "Incorrect test response format";
const INCORRECT_TOKEN: &str = "Incorrect token format";

/// Identity behind the credential in use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
}

/// OAuth client-credentials grant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BearerTokenRequest {
    pub client_id: String,
    pub client_secret: String,
    /// Space-separated scopes, e.g. `manage:all`
    pub scope: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl QualtricsClient {
    /// Verify the credential by asking who it belongs to
    pub async fn test_connection(&self, bearer_token: Option<&str>) -> Result<WhoAmI> {
        let body = self.get(self.route("whoami"), bearer_token).await?;
        parse_result::<WhoAmI>(body, "Test Response").map_err(|e| match e {
            CoreError::Validation(_) => CoreError::Failure(INCORRECT_TEST_RESPONSE.to_string()),
            other => other,
        })
    }

    /// Exchange client credentials for a bearer token
    ///
    /// Uses Basic authorization only; the configured API token is not sent.
    pub async fn get_bearer_token(&self, request: &BearerTokenRequest) -> Result<String> {
        debug!(client_id = %request.client_id, scope = %request.scope, "Requesting bearer token");
        let headers = basic_auth_headers(&request.client_id, &request.client_secret)?;
        let body = RequestBody::Form(vec![
            ("grant_type".to_string(), "client_credentials".to_string()),
            ("scope".to_string(), request.scope.clone()),
        ]);

        let response = self
            .send("/oauth2/token".to_string(), headers, Some(body))
            .await?;
        let token: TokenResponse = parse_bare(response, "Bearer Token Response", INCORRECT_TOKEN)?;
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ConnectionOptions;
    use crate::testing::{MockReply, MockTransport};
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: Arc<MockTransport>, api_token: Option<&str>) -> QualtricsClient {
        let mut options = ConnectionOptions::new("iad1");
        options.api_token = api_token.map(str::to_string);
        QualtricsClient::with_transport(options, transport)
    }

    #[tokio::test]
    async fn test_connection_success() {
        let transport = Arc::new(MockTransport::new());
        transport.reply_result(
            Method::GET,
            "/API/v3/whoami",
            json!({"userId": "UR_1", "userName": "ana", "accountType": "UT_BRANDADMIN"}),
        );

        let who = client(transport.clone(), Some("tok"))
            .test_connection(None)
            .await
            .unwrap();

        assert_eq!(who.user_id, "UR_1");
        assert_eq!(who.user_name.as_deref(), Some("ana"));
    }

    #[tokio::test]
    async fn test_connection_bad_shape() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(
            Method::GET,
            "/API/v3/whoami",
            MockReply::Json(json!({"result": "bad result"})),
        );

        let err = client(transport, Some("tok"))
            .test_connection(None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Incorrect test response format");
    }

    #[tokio::test]
    async fn test_connection_transport_error_passes_through() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(
            Method::GET,
            "/API/v3/whoami",
            MockReply::Status(
                401,
                json!({"meta": {"error": {"errorCode": "AUTH", "errorMessage": "Invalid token"}}}),
            ),
        );

        let err = client(transport, Some("tok"))
            .test_connection(None)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "401: AUTH: Invalid token");
    }

    #[tokio::test]
    async fn test_get_bearer_token() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(
            Method::POST,
            "/oauth2/token",
            MockReply::Json(json!({"access_token": "sometoken", "token_type": "Bearer"})),
        );

        let token = client(transport.clone(), None)
            .get_bearer_token(&BearerTokenRequest {
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                scope: "manage:all".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(token, "sometoken");
        let request = &transport.requests()[0];
        assert_eq!(
            request.headers.get("authorization").unwrap(),
            "Basic Y2xpZW50OnNlY3JldA=="
        );
        assert_eq!(
            request.body,
            Some(RequestBody::Form(vec![
                ("grant_type".to_string(), "client_credentials".to_string()),
                ("scope".to_string(), "manage:all".to_string()),
            ]))
        );
    }

    #[tokio::test]
    async fn test_get_bearer_token_bad_shape() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(
            Method::POST,
            "/oauth2/token",
            MockReply::Json(json!({"result": "bad result"})),
        );

        let err = client(transport, None)
            .get_bearer_token(&BearerTokenRequest {
                client_id: "c".to_string(),
                client_secret: "s".to_string(),
                scope: "manage:all".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Incorrect token format");
    }
}
