//! Distributions and reminders
//!
//! A distribution sends a survey link to a mailing list (or a single contact
//! or transaction batch) using a library message. Reminders are follow-up
//! distributions hanging off an existing one.

use super::{Page, iso_datetime, json_body, with_query};
use crate::client::{QualtricsClient, segment};
use crate::error::Result;
use crate::validate::parse_result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// How survey links are issued to recipients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurveyLinkType {
    #[default]
    Individual,
    Multiple,
    Anonymous,
}

/// Kind of distribution request, used to filter listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionRequestType {
    Invite,
    Reminder,
    ThankYou,
    GeneratedInvite,
}

/// Sender and subject shared by distributions and reminders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailHeader {
    pub from_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_email: Option<String>,
    pub from_name: String,
    pub subject: String,
}

/// Parameters for an email distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDistributionOptions {
    pub library_id: String,
    pub message_id: String,
    /// Overrides the library message body when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_text: Option<String>,
    pub mailing_list_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_batch_id: Option<String>,
    pub header: EmailHeader,
    pub survey_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub link_type: SurveyLinkType,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub embedded_data: Map<String, Value>,
    pub send_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

/// Parameters for a reminder on an existing distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReminderOptions {
    pub distribution_id: String,
    pub library_id: String,
    pub message_id: String,
    pub header: EmailHeader,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub embedded_data: Map<String, Value>,
    pub send_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    #[serde(default)]
    pub sent: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub started: u64,
    #[serde(default)]
    pub bounced: u64,
    #[serde(default)]
    pub opened: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub finished: u64,
    #[serde(default)]
    pub complaints: u64,
    #[serde(default)]
    pub blocked: u64,
}

/// A distribution as reported by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_distribution_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_link: Option<Value>,
    pub stats: DistributionStats,
}

/// Filters for listing distributions in a send-date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDistributionsOptions {
    pub send_start_date: DateTime<Utc>,
    pub send_end_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailing_list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_request_type: Option<DistributionRequestType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_token: Option<String>,
    #[serde(default)]
    pub use_new_pagination_scheme: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

// Wire bodies

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageRef<'a> {
    library_id: &'a str,
    message_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_text: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Recipients<'a> {
    mailing_list_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_batch_id: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SurveyLink<'a> {
    survey_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration_date: Option<String>,
    #[serde(rename = "type")]
    link_type: SurveyLinkType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DistributionBody<'a> {
    message: MessageRef<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipients: Option<Recipients<'a>>,
    header: &'a EmailHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    survey_link: Option<SurveyLink<'a>>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    embedded_data: &'a Map<String, Value>,
    send_date: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery<'a> {
    send_start_date: String,
    send_end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    survey_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mailing_list_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distribution_request_type: Option<DistributionRequestType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip_token: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    use_new_pagination_scheme: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReminderCreated {
    distribution_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SurveyQuery<'a> {
    survey_id: &'a str,
}

impl QualtricsClient {
    /// Schedule an email distribution and return its id
    pub async fn create_distribution(&self, options: &CreateDistributionOptions) -> Result<String> {
        debug!(
            survey_id = %options.survey_id,
            mailing_list_id = %options.mailing_list_id,
            send_date = %options.send_date,
            "Creating distribution"
        );
        let body = json_body(
            &DistributionBody {
                message: MessageRef {
                    library_id: &options.library_id,
                    message_id: &options.message_id,
                    message_text: options.message_text.as_deref(),
                },
                recipients: Some(Recipients {
                    mailing_list_id: &options.mailing_list_id,
                    contact_id: options.contact_id.as_deref(),
                    transaction_batch_id: options.transaction_batch_id.as_deref(),
                }),
                header: &options.header,
                survey_link: Some(SurveyLink {
                    survey_id: &options.survey_id,
                    expiration_date: options.expiration_date.as_ref().map(iso_datetime),
                    link_type: options.link_type,
                }),
                embedded_data: &options.embedded_data,
                send_date: iso_datetime(&options.send_date),
            },
            "Create Distribution request",
        )?;

        let response = self
            .post(self.route("distributions"), body, options.bearer_token.as_deref())
            .await?;
        let created: Created = parse_result(response, "Create Distribution Response")?;
        Ok(created.id)
    }

    /// Schedule a reminder for a distribution and return the reminder's distribution id
    pub async fn create_reminder(&self, options: &CreateReminderOptions) -> Result<String> {
        debug!(distribution_id = %options.distribution_id, send_date = %options.send_date, "Creating reminder");
        let route = self.route(&format!(
            "distributions/{}/reminders",
            segment(&options.distribution_id)
        ));
        let body = json_body(
            &DistributionBody {
                message: MessageRef {
                    library_id: &options.library_id,
                    message_id: &options.message_id,
                    message_text: None,
                },
                recipients: None,
                header: &options.header,
                survey_link: None,
                embedded_data: &options.embedded_data,
                send_date: iso_datetime(&options.send_date),
            },
            "Create Reminder request",
        )?;

        let response = self
            .post(route, body, options.bearer_token.as_deref())
            .await?;
        let created: ReminderCreated = parse_result(response, "Create Reminder Response")?;
        Ok(created.distribution_id)
    }

    /// Fetch one distribution with its delivery stats
    pub async fn get_distribution(
        &self,
        distribution_id: &str,
        survey_id: &str,
        bearer_token: Option<&str>,
    ) -> Result<Distribution> {
        let route = with_query(
            self.route(&format!("distributions/{}", segment(distribution_id))),
            &SurveyQuery { survey_id },
        )?;
        let response = self.get(route, bearer_token).await?;
        parse_result(response, "Get Distribution response")
    }

    /// List distributions sent within a date window
    pub async fn list_distributions(
        &self,
        options: &ListDistributionsOptions,
    ) -> Result<Page<Distribution>> {
        let query = ListQuery {
            send_start_date: iso_datetime(&options.send_start_date),
            send_end_date: iso_datetime(&options.send_end_date),
            survey_id: options.survey_id.as_deref(),
            mailing_list_id: options.mailing_list_id.as_deref(),
            distribution_request_type: options.distribution_request_type,
            skip_token: options.skip_token.as_deref(),
            use_new_pagination_scheme: options.use_new_pagination_scheme,
            page_size: options.page_size,
        };
        let route = with_query(self.route("distributions"), &query)?;
        let response = self.get(route, options.bearer_token.as_deref()).await?;
        parse_result(response, "List Distributions response")
    }
}
