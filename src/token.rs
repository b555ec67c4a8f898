//! Integration token decoding.
//!
//! A collector token is an opaque string handed to the application by the
//! collector UI: base64 over a small JSON object. Decoding it yields the
//! structured identity used to derive the collector endpoint. Decoding
//! happens exactly once, at agent initialization, and any failure there
//! is fatal to initialization.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use thiserror::Error;

/// Identity decoded from an integration token.
///
/// Immutable for the process lifetime once the agent commits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Integration identifier; selects the collector endpoint subdomain.
    pub integration_id: String,
    /// Optional shared secret carried by some tokens.
    pub secret: Option<String>,
}

/// Errors produced while decoding an integration token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded token is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("decoded token is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("token is missing a non-empty integrationId")]
    MissingIntegrationId,
}

/// Wire shape of the decoded token JSON.
#[derive(Debug, Deserialize)]
struct TokenPayload {
    #[serde(rename = "integrationId", default)]
    integration_id: Option<String>,
    #[serde(default)]
    secret: Option<String>,
}

/// Decodes an integration token into a [`Credential`].
///
/// The token must be standard-alphabet base64 over a JSON object with a
/// non-empty `integrationId` string field. `secret` is optional.
///
/// # Example
///
/// ```
/// use base64::{engine::general_purpose::STANDARD, Engine};
///
/// let token = STANDARD.encode(r#"{"integrationId":"abc123"}"#);
/// let credential = talon::decode_token(&token).unwrap();
/// assert_eq!(credential.integration_id, "abc123");
/// ```
pub fn decode_token(token: &str) -> Result<Credential, TokenError> {
    let decoded = BASE64.decode(token.trim())?;
    let json = String::from_utf8(decoded)?;
    let payload: TokenPayload = serde_json::from_str(&json)?;

    let integration_id = match payload.integration_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(TokenError::MissingIntegrationId),
    };

    Ok(Credential {
        integration_id,
        secret: payload.secret,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        BASE64.encode(json)
    }

    #[test]
    fn decodes_integration_id() {
        let credential = decode_token(&encode(r#"{"integrationId":"abc123"}"#)).unwrap();

        assert_eq!(credential.integration_id, "abc123");
        assert_eq!(credential.secret, None);
    }

    #[test]
    fn decodes_optional_secret() {
        let credential =
            decode_token(&encode(r#"{"integrationId":"abc123","secret":"s3cr3t"}"#)).unwrap();

        assert_eq!(credential.secret.as_deref(), Some("s3cr3t"));
    }

    #[test]
    fn ignores_unknown_fields() {
        let credential =
            decode_token(&encode(r#"{"integrationId":"abc123","plan":"free"}"#)).unwrap();

        assert_eq!(credential.integration_id, "abc123");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            decode_token("not base64!!!"),
            Err(TokenError::Base64(_))
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            decode_token(&encode("this is not json")),
            Err(TokenError::Json(_))
        ));
    }

    #[test]
    fn rejects_missing_integration_id() {
        assert!(matches!(
            decode_token(&encode(r#"{"secret":"s"}"#)),
            Err(TokenError::MissingIntegrationId)
        ));
    }

    #[test]
    fn rejects_empty_integration_id() {
        assert!(matches!(
            decode_token(&encode(r#"{"integrationId":""}"#)),
            Err(TokenError::MissingIntegrationId)
        ));
    }
}
