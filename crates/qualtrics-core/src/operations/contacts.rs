//! Transaction contact imports
//!
//! An import is a long-running operation: [`start_contacts_import`] returns an
//! import id, [`get_contacts_import_status`] reports progress for it, and
//! [`get_contacts_import_summary`] fetches the final tally once progress
//! reaches 100%. The [`import_contacts`](crate::workflows::import_contacts)
//! workflow chains the three.
//!
//! [`start_contacts_import`]: QualtricsClient::start_contacts_import
//! [`get_contacts_import_status`]: QualtricsClient::get_contacts_import_status
//! [`get_contacts_import_summary`]: QualtricsClient::get_contacts_import_summary

use crate::client::{QualtricsClient, segment};
use crate::error::Result;
use crate::transport::RequestBody;
use crate::validate::parse_result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// A contact as submitted to an import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsubscribed: Option<bool>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub embedded_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub transaction_data: Map<String, Value>,
}

/// Batch metadata attached to every contact in an import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// Transaction data field names carried by the contacts
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Parameters for starting a transaction contacts import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartContactsImport {
    pub directory_id: String,
    pub mailing_list_id: String,
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub transaction_meta: TransactionMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

/// Identifies a running import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactsImportRef<'a> {
    pub directory_id: &'a str,
    pub mailing_list_id: &'a str,
    pub import_id: &'a str,
    pub bearer_token: Option<&'a str>,
}

impl ContactsImportRef<'_> {
    fn route(&self, client: &QualtricsClient, suffix: &str) -> String {
        client.route(&format!(
            "directories/{}/mailinglists/{}/transactioncontacts/{}{}",
            segment(self.directory_id),
            segment(self.mailing_list_id),
            segment(self.import_id),
            suffix
        ))
    }
}

/// Response to starting an import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsImportStarted {
    /// Import id threaded into status and summary calls
    pub id: String,
    pub contacts: Value,
    pub tracking: Value,
    pub status: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCounts {
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactTally {
    pub count: ContactCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCounts {
    #[serde(default)]
    pub created: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTally {
    pub count: TransactionCounts,
}

/// Progress snapshot of a running import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsImportStatus {
    pub percent_complete: f64,
    pub contacts: ContactTally,
    pub transactions: TransactionTally,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_emails: Option<Vec<String>>,
}

impl ContactsImportStatus {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.percent_complete >= 100.0
    }
}

/// Final tally of a finished import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsImportSummary {
    pub percent_complete: f64,
    pub contacts: ContactTally,
    pub transactions: TransactionTally,
    pub status: String,
    pub invalid_emails: Vec<String>,
}

impl QualtricsClient {
    /// Submit contacts to a mailing list as a transaction import
    pub async fn start_contacts_import(
        &self,
        request: &StartContactsImport,
    ) -> Result<ContactsImportStarted> {
        let route = self.route(&format!(
            "directories/{}/mailinglists/{}/transactioncontacts",
            segment(&request.directory_id),
            segment(&request.mailing_list_id)
        ));
        debug!(
            mailing_list_id = %request.mailing_list_id,
            contacts = request.contacts.len(),
            "Starting contacts import"
        );

        let body = serde_json::json!({
            "transactionMeta": request.transaction_meta,
            "contacts": request.contacts,
        });
        let response = self
            .post(route, RequestBody::Json(body), request.bearer_token.as_deref())
            .await?;
        parse_result(response, "Start Contacts Import Response")
    }

    /// Current progress of an import
    pub async fn get_contacts_import_status(
        &self,
        import: &ContactsImportRef<'_>,
    ) -> Result<ContactsImportStatus> {
        let response = self
            .get(import.route(self, ""), import.bearer_token)
            .await?;
        parse_result(response, "Contacts Import Status Response")
    }

    /// Final summary of a finished import
    pub async fn get_contacts_import_summary(
        &self,
        import: &ContactsImportRef<'_>,
    ) -> Result<ContactsImportSummary> {
        let response = self
            .get(import.route(self, "/summary"), import.bearer_token)
            .await?;
        parse_result(response, "Contacts Import Summary Response")
    }
}
