use super::{Page, with_query};
use crate::client::{QualtricsClient, segment};
use crate::error::Result;
use crate::validate::parse_result;
use serde::{Deserialize, Serialize};

/// A saved message in a library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryMessage {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLibraryMessagesOptions {
    pub library_id: String,
    /// e.g. `invite`, `reminder`, `thankYou`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

#[derive(Serialize)]
struct MessagesQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u32>,
}

impl QualtricsClient {
    /// List the messages saved in a library
    pub async fn list_library_messages(
        &self,
        options: &ListLibraryMessagesOptions,
    ) -> Result<Page<LibraryMessage>> {
        let route = with_query(
            self.route(&format!("libraries/{}/messages", segment(&options.library_id))),
            &MessagesQuery {
                category: options.category.as_deref().filter(|c| !c.is_empty()),
                offset: options.offset.filter(|o| *o > 0),
            },
        )?;
        let response = self.get(route, options.bearer_token.as_deref()).await?;
        parse_result(response, "List Library Messages response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ConnectionOptions;
    use crate::testing::MockTransport;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: Arc<MockTransport>) -> QualtricsClient {
        QualtricsClient::with_transport(
            ConnectionOptions::builder("iad1").api_token("tok").build(),
            transport,
        )
    }

    #[tokio::test]
    async fn test_list_library_messages_query() {
        let transport = Arc::new(MockTransport::new());
        transport.reply_result(
            Method::GET,
            "/API/v3/libraries/UR_1/messages?category=invite&offset=100",
            json!({
                "elements": [{"id": "MS_1", "description": "Invite", "category": "invite"}],
                "nextPage": null
            }),
        );

        let page = client(transport)
            .list_library_messages(&ListLibraryMessagesOptions {
                library_id: "UR_1".to_string(),
                category: Some("invite".to_string()),
                offset: Some(100),
                bearer_token: None,
            })
            .await
            .unwrap();

        assert_eq!(page.elements.len(), 1);
        assert_eq!(page.elements[0].id, "MS_1");
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn test_zero_offset_is_omitted() {
        let transport = Arc::new(MockTransport::new());
        transport.reply_result(
            Method::GET,
            "/API/v3/libraries/UR_1/messages",
            json!({"elements": [], "nextPage": null}),
        );

        let page = client(transport.clone())
            .list_library_messages(&ListLibraryMessagesOptions {
                library_id: "UR_1".to_string(),
                offset: Some(0),
                ..ListLibraryMessagesOptions::default()
            })
            .await
            .unwrap();
        assert!(page.elements.is_empty());
        assert_eq!(transport.count(Method::GET, "/API/v3/libraries/UR_1/messages"), 1);
    }

    #[tokio::test]
    async fn test_elements_must_be_a_list() {
        let transport = Arc::new(MockTransport::new());
        transport.reply_result(
            Method::GET,
            "/API/v3/libraries/UR_1/messages",
            json!({"elements": "nope"}),
        );

        let err = client(transport)
            .list_library_messages(&ListLibraryMessagesOptions {
                library_id: "UR_1".to_string(),
                ..ListLibraryMessagesOptions::default()
            })
            .await
            .unwrap_err();
        assert!(
            err.to_string()
                .starts_with("List Library Messages response invalid format"),
            "{err}"
        );
    }
}
