//! Claims decoding for locally stored bearer tokens.
//!
//! Reads the payload segment of a compact JWT without verifying the
//! signature or expiry; the backend remains the authority on token
//! validity and re-checks it on every API call.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// The claims the backend embeds in its tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity (the account email)
    pub sub: String,
    /// Expiry as a Unix timestamp; informational only on this side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Any further claim members, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Decode the claims segment of `token` without any network call.
///
/// Accepts both padded and unpadded base64url payloads.
pub fn decode_claims(token: &str) -> Result<Claims, DecodeError> {
    let payload = token.split('.').nth(1).ok_or(DecodeError::MissingPayload)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims = serde_json::from_slice(&bytes)?;
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let segment = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("eyJhbGciOiJIUzI1NiJ9.{segment}.c2lnbmF0dXJl")
    }

    #[test]
    fn decodes_subject_and_expiry() {
        let token = token_with_payload(&serde_json::json!({
            "sub": "ada@example.com",
            "exp": 1_900_000_000i64
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "ada@example.com");
        assert_eq!(claims.exp, Some(1_900_000_000));
    }

    #[test]
    fn preserves_unknown_claim_members() {
        let token = token_with_payload(&serde_json::json!({
            "sub": "ada@example.com",
            "role": "admin"
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.extra["role"], "admin");
    }

    #[test]
    fn token_without_segments_is_missing_payload() {
        assert!(matches!(
            decode_claims("not-a-jwt"),
            Err(DecodeError::MissingPayload)
        ));
    }

    #[test]
    fn invalid_base64_payload_fails() {
        assert!(matches!(
            decode_claims("header.%%%.sig"),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn non_json_payload_fails() {
        let segment = URL_SAFE_NO_PAD.encode(b"plain text");
        let token = format!("header.{segment}.sig");
        assert!(matches!(decode_claims(&token), Err(DecodeError::Json(_))));
    }

    #[test]
    fn padded_payload_is_accepted() {
        use base64::engine::general_purpose::URL_SAFE;
        let segment = URL_SAFE.encode(serde_json::to_vec(&serde_json::json!({"sub": "x"})).unwrap());
        let token = format!("header.{segment}.sig");
        assert_eq!(decode_claims(&token).unwrap().sub, "x");
    }
}
