use super::json_body;
use crate::client::{QualtricsClient, segment};
use crate::error::Result;
use crate::validate::parse_result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for creating a mailing list in a directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMailingListOptions {
    pub directory_id: String,
    pub name: String,
    pub owner_id: String,
    #[serde(default)]
    pub prioritize_list_metadata: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMailingListBody<'a> {
    name: &'a str,
    owner_id: &'a str,
    prioritize_list_metadata: bool,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

impl QualtricsClient {
    /// Create a mailing list and return its id
    pub async fn create_mailing_list(&self, options: &CreateMailingListOptions) -> Result<String> {
        let route = self.route(&format!(
            "directories/{}/mailinglists",
            segment(&options.directory_id)
        ));
        debug!(directory_id = %options.directory_id, name = %options.name, "Creating mailing list");

        let body = json_body(
            &CreateMailingListBody {
                name: &options.name,
                owner_id: &options.owner_id,
                prioritize_list_metadata: options.prioritize_list_metadata,
            },
            "Create Mailing List request",
        )?;
        let response = self.post(route, body, options.bearer_token.as_deref()).await?;
        let created: Created = parse_result(response, "Create Mailing List Response")?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ConnectionOptions;
    use crate::testing::MockTransport;
    use crate::transport::RequestBody;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    const ROUTE: &str = "/API/v3/directories/POOL_1/mailinglists";

    fn options() -> CreateMailingListOptions {
        CreateMailingListOptions {
            directory_id: "POOL_1".to_string(),
            name: "Spring wave".to_string(),
            owner_id: "UR_1".to_string(),
            ..CreateMailingListOptions::default()
        }
    }

    #[tokio::test]
    async fn test_create_mailing_list() {
        let transport = Arc::new(MockTransport::new());
        transport.reply_result(Method::POST, ROUTE, json!({"id": "CG_1"}));
        let client = QualtricsClient::with_transport(
            ConnectionOptions::new("iad1"),
            transport.clone(),
        );

        let mut options = options();
        options.bearer_token = Some("bearer".to_string());
        let id = client.create_mailing_list(&options).await.unwrap();

        assert_eq!(id, "CG_1");
        let request = &transport.requests()[0];
        assert_eq!(request.headers.get("authorization").unwrap(), "Bearer bearer");
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!({
                "name": "Spring wave",
                "ownerId": "UR_1",
                "prioritizeListMetadata": false
            })))
        );
    }

    #[tokio::test]
    async fn test_create_mailing_list_missing_id() {
        let transport = Arc::new(MockTransport::new());
        transport.reply_result(Method::POST, ROUTE, json!({"name": "Spring wave"}));
        let client = QualtricsClient::with_transport(
            ConnectionOptions::builder("iad1").api_token("tok").build(),
            transport,
        );

        let err = client.create_mailing_list(&options()).await.unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Create Mailing List Response invalid format"),
            "{err}"
        );
    }
}
