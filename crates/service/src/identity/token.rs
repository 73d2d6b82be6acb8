use std::collections::HashMap;

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use models::user::Role;
use serde_json::Value;

use crate::errors::ServiceError;

/// Claims the service reads from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub email: String,
    /// Present only when the token carries a recognised `role` string.
    pub role: Option<Role>,
}

/// Clock skew tolerated on `exp` and `nbf`, in seconds.
pub const CLOCK_SKEW_LEEWAY_SECS: u64 = 30;

fn unauthorized(msg: &str) -> ServiceError {
    ServiceError::Unauthorized(msg.to_string())
}

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, ServiceError> {
    let raw = header.ok_or_else(|| unauthorized("authorization header required"))?;
    let parts: Vec<&str> = raw.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(token),
        _ => Err(unauthorized("invalid authorization header format")),
    }
}

/// Verify `token` against `keys` and pull out its identity claims.
///
/// Only asymmetric algorithms are accepted. The key is chosen by `kid` when
/// the header names one; otherwise each compatible key is tried in turn.
/// `exp` is required, `nbf` is checked when present, audience is not checked.
pub fn verify(token: &str, keys: &JwkSet) -> Result<VerifiedClaims, ServiceError> {
    let header = decode_header(token).map_err(|_| unauthorized("invalid token"))?;
    if !is_asymmetric(header.alg) {
        return Err(unauthorized("invalid token"));
    }

    let candidates: Vec<&Jwk> = match header.kid.as_deref() {
        Some(kid) => keys.find(kid).into_iter().collect(),
        None => keys.keys.iter().collect(),
    };

    let mut validation = Validation::new(header.alg);
    validation.validate_aud = false;
    validation.validate_nbf = true;
    validation.leeway = CLOCK_SKEW_LEEWAY_SECS;

    for jwk in candidates.into_iter().filter(|k| compatible(k, header.alg)) {
        let Ok(key) = DecodingKey::from_jwk(jwk) else { continue };
        if let Ok(data) = decode::<HashMap<String, Value>>(token, &key, &validation) {
            return claims_from(data.claims);
        }
    }
    Err(unauthorized("invalid token"))
}

fn claims_from(claims: HashMap<String, Value>) -> Result<VerifiedClaims, ServiceError> {
    let email = match claims.get("email") {
        None => return Err(unauthorized("email claim not found in token")),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(_) => return Err(unauthorized("invalid email claim type")),
    };
    let role = match claims.get("role") {
        Some(Value::String(s)) => Role::parse(s),
        _ => None,
    };
    Ok(VerifiedClaims { email, role })
}

fn is_asymmetric(alg: Algorithm) -> bool {
    !matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn compatible(jwk: &Jwk, alg: Algorithm) -> bool {
    use Algorithm::*;
    let family = match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => matches!(alg, RS256 | RS384 | RS512 | PS256 | PS384 | PS512),
        AlgorithmParameters::EllipticCurve(_) => matches!(alg, ES256 | ES384),
        AlgorithmParameters::OctetKeyPair(_) => alg == EdDSA,
        _ => false,
    };
    // a key that pins its algorithm only verifies that algorithm
    let pinned = jwk
        .common
        .key_algorithm
        .as_ref()
        .map_or(true, |ka| format!("{ka:?}") == format!("{alg:?}"));
    family && pinned
}


#[cfg(test)]
mod tests {
    use super::test_keys::*;
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    #[test]
    fn bearer_header_shapes() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        for bad in [None, Some(""), Some("Bearer"), Some("bearer abc"), Some("Bearer a b"), Some("Basic abc"), Some("Bearer ")] {
            assert_eq!(bearer_token(bad).unwrap_err().code(), "UNAUTHORIZED", "{bad:?}");
        }
    }

    #[test]
    fn valid_token_by_kid() {
        let token = sign(&json!({"email": "amy@example.com", "exp": exp_in(600)}), Some(KID));
        let claims = verify(&token, &jwks()).unwrap();
        assert_eq!(claims, VerifiedClaims { email: "amy@example.com".into(), role: None });
    }

    #[test]
    fn token_without_kid_tries_compatible_keys() {
        let token = sign(&json!({"email": "amy@example.com", "role": "admin", "exp": exp_in(600)}), None);
        assert_eq!(verify(&token, &jwks()).unwrap().role, Some(Role::Admin));
    }

    #[test]
    fn unknown_kid_is_rejected() {
        let token = sign(&json!({"email": "amy@example.com", "exp": exp_in(600)}), Some("other"));
        assert_eq!(verify(&token, &jwks()).unwrap_err().code(), "UNAUTHORIZED");
    }

    #[test]
    fn expired_or_future_tokens_are_rejected() {
        let expired = sign(&json!({"email": "a@x.io", "exp": exp_in(-3600)}), Some(KID));
        assert!(verify(&expired, &jwks()).is_err());
        let early = sign(&json!({"email": "a@x.io", "exp": exp_in(7200), "nbf": exp_in(3600)}), Some(KID));
        assert!(verify(&early, &jwks()).is_err());
        let no_exp = sign(&json!({"email": "a@x.io"}), Some(KID));
        assert!(verify(&no_exp, &jwks()).is_err());
    }

    #[test]
    fn expiry_honours_the_skew_leeway() {
        let leeway = CLOCK_SKEW_LEEWAY_SECS as i64;
        let within = sign(&json!({"email": "a@x.io", "exp": exp_in(-(leeway - 20))}), Some(KID));
        assert!(verify(&within, &jwks()).is_ok());
        let past = sign(&json!({"email": "a@x.io", "exp": exp_in(-(leeway + 20))}), Some(KID));
        assert_eq!(verify(&past, &jwks()).unwrap_err().code(), "UNAUTHORIZED");
    }

    #[test]
    fn audience_is_not_checked() {
        let token = sign(&json!({"email": "a@x.io", "aud": "someone-else", "exp": exp_in(600)}), Some(KID));
        assert!(verify(&token, &jwks()).is_ok());
    }

    #[test]
    fn email_claim_required_and_typed() {
        let missing = sign(&json!({"sub": "1", "exp": exp_in(600)}), Some(KID));
        assert!(verify(&missing, &jwks()).unwrap_err().to_string().contains("email claim not found"));
        let typed = sign(&json!({"email": 42, "exp": exp_in(600)}), Some(KID));
        assert!(verify(&typed, &jwks()).unwrap_err().to_string().contains("claim type"));
    }

    #[test]
    fn non_string_or_unknown_role_is_ignored() {
        let token = sign(&json!({"email": "a@x.io", "role": 1, "exp": exp_in(600)}), Some(KID));
        assert_eq!(verify(&token, &jwks()).unwrap().role, None);
        let token = sign(&json!({"email": "a@x.io", "role": "owner", "exp": exp_in(600)}), Some(KID));
        assert_eq!(verify(&token, &jwks()).unwrap().role, None);
    }

    #[test]
    fn symmetric_tokens_are_refused() {
        let token = encode(
            &Header::default(),
            &json!({"email": "a@x.io", "exp": exp_in(600)}),
            &EncodingKey::from_secret(b"shared"),
        )
        .unwrap();
        assert_eq!(verify(&token, &jwks()).unwrap_err().code(), "UNAUTHORIZED");
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let token = sign(&json!({"email": "a@x.io", "exp": exp_in(600)}), Some(KID));
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = sign(&json!({"email": "root@x.io", "exp": exp_in(600)}), Some(KID));
        parts[1] = forged.split('.').nth(1).unwrap().to_string();
        assert!(verify(&parts.join("."), &jwks()).is_err());
    }
}
