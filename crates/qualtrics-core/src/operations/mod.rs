//! Primitive operations - one method per Qualtrics endpoint
//!
//! Each operation selects credentials, builds its route and body, sends one
//! request through the client's transport, and validates the response into
//! a typed value. Any failure along the way comes back as `Err`.

pub mod connection;
pub mod contacts;
pub mod distributions;
pub mod library;
pub mod mailing_lists;
pub mod responses;

pub use connection::*;
pub use contacts::*;
pub use distributions::*;
pub use library::*;
pub use mailing_lists::*;
pub use responses::*;

use crate::error::{CoreError, Result};
use crate::transport::RequestBody;
use serde::{Deserialize, Serialize};

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub elements: Vec<T>,
    #[serde(default)]
    pub next_page: Option<String>,
}

/// ISO-8601 with millisecond precision and a `Z` suffix, as the API expects
pub(crate) fn iso_datetime(value: &chrono::DateTime<chrono::Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Serialize a request payload into a JSON body
pub(crate) fn json_body<T: Serialize>(value: &T, context: &str) -> Result<RequestBody> {
    serde_json::to_value(value)
        .map(RequestBody::Json)
        .map_err(|e| CoreError::Failure(format!("Unable to serialize {context}: {e}")))
}

/// Append a url-encoded query string to `route`, skipping it when empty
pub(crate) fn with_query<T: Serialize>(route: String, query: &T) -> Result<String> {
    let qs = serde_urlencoded::to_string(query)
        .map_err(|e| CoreError::Failure(format!("Unable to encode query for {route}: {e}")))?;
    if qs.is_empty() {
        Ok(route)
    } else {
        Ok(format!("{route}?{qs}"))
    }
}
