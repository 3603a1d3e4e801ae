//! Authorization header selection
//!
//! An API token (`X-API-TOKEN`) always wins over a bearer token. With
//! neither, header construction fails before any network I/O happens.

use crate::error::{CoreError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use tracing::trace;

/// Header carrying a Qualtrics API token
pub const API_TOKEN_HEADER: &str = "x-api-token";

const MISSING_CREDENTIALS: &str =
    "Unable to authorize request. Bearer Token or Api Token required.";

/// Build request headers from whichever credential is available.
///
/// Empty strings count as absent.
pub fn auth_headers(api_token: Option<&str>, bearer_token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(token) = api_token.filter(|t| !t.is_empty()) {
        trace!("Authorizing with API token");
        headers.insert(
            HeaderName::from_static(API_TOKEN_HEADER),
            header_value(token)?,
        );
        return Ok(headers);
    }

    if let Some(token) = bearer_token.filter(|t| !t.is_empty()) {
        trace!("Authorizing with bearer token");
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
        return Ok(headers);
    }

    Err(CoreError::Config(MISSING_CREDENTIALS.to_string()))
}

/// Basic authorization for the OAuth client-credentials exchange
pub fn basic_auth_headers(client_id: &str, client_secret: &str) -> Result<HeaderMap> {
    let encoded = STANDARD.encode(format!("{client_id}:{client_secret}"));
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, header_value(&format!("Basic {encoded}"))?);
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| CoreError::Config("Credential contains invalid header characters".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_token_takes_precedence() {
        let headers = auth_headers(Some("api-key"), Some("bearer")).unwrap();
        assert_eq!(headers.get(API_TOKEN_HEADER).unwrap(), "api-key");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_bearer_token_fallback() {
        let headers = auth_headers(None, Some("abc")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(headers.get(API_TOKEN_HEADER).is_none());
    }

    #[test]
    fn test_empty_api_token_is_absent() {
        let headers = auth_headers(Some(""), Some("abc")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn test_no_credentials_is_config_error() {
        let err = auth_headers(None, None).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("Bearer Token or Api Token required"));
    }

    #[test]
    fn test_basic_auth() {
        let headers = basic_auth_headers("client", "secret").unwrap();
        // base64("client:secret")
        assert_eq!(
            headers.get(AUTHORIZATION).unwrap(),
            "Basic Y2xpZW50OnNlY3JldA=="
        );
    }

    #[test]
    fn test_invalid_header_characters() {
        let err = auth_headers(Some("bad\ntoken"), None).unwrap_err();
        assert!(err.is_config());
    }
}
