//! Response validators
//!
//! Qualtrics wraps successful payloads under `result` and failures under
//! `error: {errorCode, errorMessage}`. These helpers narrow a parsed body into
//! a typed value, reporting which field was missing or mistyped.

use crate::error::{CoreError, Result, ValidationError};
use crate::transport::ResponseBody;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize the `result` envelope of `body` into `T`.
///
/// `context` names the response in error messages, e.g. `"Start Export Response"`.
pub fn parse_result<T: DeserializeOwned>(body: ResponseBody, context: &'static str) -> Result<T> {
    let Value::Object(mut map) = body.into_json(context)? else {
        return Err(ValidationError::MissingResult { context }.into());
    };

    if let Some(result) = map.remove("result") {
        return serde_json::from_value(result).map_err(|e| {
            CoreError::from(ValidationError::InvalidShape {
                context,
                reason: e.to_string(),
            })
        });
    }

    if let Some(error) = map.get("error") {
        let field = |name: &str| {
            error
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        return Err(ValidationError::Remote {
            code: field("errorCode"),
            message: field("errorMessage"),
        }
        .into());
    }

    Err(ValidationError::MissingResult { context }.into())
}

/// Deserialize a body that is not wrapped in `result`, failing with `message`.
pub fn parse_bare<T: DeserializeOwned>(
    body: ResponseBody,
    context: &'static str,
    message: &str,
) -> Result<T> {
    let value = body.into_json(context)?;
    serde_json::from_value(value).map_err(|_| CoreError::Failure(message.to_string()))
}
