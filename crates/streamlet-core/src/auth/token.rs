//! Best-effort decoding of the bearer token payload.
//!
//! When the user lookup after sign-in fails, the only identity hint left is
//! the token itself. The service issues JWT-shaped tokens whose middle
//! segment is base64url JSON with a `sub` claim. The claim usually holds
//! the username rather than the numeric user id, so decoding is strictly a
//! fallback and a non-numeric subject yields nothing.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
}

/// Decode the `sub` claim of a JWT-shaped token as a numeric user id.
/// Returns `None` for anything that is not a dotted token with a parseable
/// payload and a numeric subject.
pub fn subject_id(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    let sub = claims.sub?;
    match sub.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            debug!(sub = %sub, "Token subject is not a numeric id");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_token(claims: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS512"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims);
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn numeric_subject_decodes() {
        let token = fake_token(r#"{"sub":"42","iat":1700000000}"#);
        assert_eq!(subject_id(&token), Some(42));
    }

    #[test]
    fn username_subject_is_rejected() {
        let token = fake_token(r#"{"sub":"ada"}"#);
        assert_eq!(subject_id(&token), None);
    }

    #[test]
    fn missing_subject_and_garbage_yield_none() {
        assert_eq!(subject_id(&fake_token("{}")), None);
        assert_eq!(subject_id("not-a-jwt"), None);
        assert_eq!(subject_id("a.!!!.c"), None);
        assert_eq!(subject_id(""), None);
    }
}
