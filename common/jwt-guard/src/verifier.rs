use axum::http::HeaderValue;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::debug;

use crate::claims::{ClaimSet, Claims, EXPIRES_AT, NOT_BEFORE};
use crate::config::ALGORITHM;
use crate::error::Rejection;
use crate::guard::Guard;

/// A pre-handler check over the inbound `Authorization` header.
pub trait RequestGate {
    fn check(&self, authorization: Option<&HeaderValue>) -> Result<Claims, Rejection>;
}

impl RequestGate for Guard {
    fn check(&self, authorization: Option<&HeaderValue>) -> Result<Claims, Rejection> {
        Guard::check(self, authorization)
    }
}

impl Guard {
    /// Validate the presented `Authorization` header value against the current configuration.
    pub fn check(&self, authorization: Option<&HeaderValue>) -> Result<Claims, Rejection> {
        let value = authorization.ok_or(Rejection::MissingCredential)?;
        let token = parse_bearer(value)?;
        self.verify(token)
    }

    /// Validate a bare token, without the `Bearer` scheme.
    pub fn verify(&self, token: &str) -> Result<Claims, Rejection> {
        let (key, leeway) = {
            let config = self.read();
            (DecodingKey::from_secret(&config.secret), config.leeway_seconds)
        };

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = leeway;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        // exp and nbf are checked when present; tokens may legitimately omit both.
        validation.required_spec_claims.clear();

        let claims = decode::<ClaimSet>(token, &key, &validation)
            .map_err(|err| {
                debug!(error = %err, "token failed verification");
                classify(token, &key, &validation, err.kind())
            })?
            .claims;

        // The decoder skips temporal claims it cannot parse as timestamps.
        if [EXPIRES_AT, NOT_BEFORE]
            .iter()
            .any(|name| claims.get(*name).is_some_and(|value| !value.is_u64()))
        {
            debug!("token carries a non-numeric temporal claim");
            return Err(Rejection::InvalidToken);
        }

        debug!(claims = claims.len(), "accepted token");
        Ok(Claims::from(claims))
    }
}

/// Expired is reported only when `exp` is the sole reason for failure; an
/// expired token that is also not yet valid is invalid.
fn classify(token: &str, key: &DecodingKey, validation: &Validation, kind: &ErrorKind) -> Rejection {
    match kind {
        ErrorKind::ExpiredSignature => {
            let mut without_exp = validation.clone();
            without_exp.validate_exp = false;
            match decode::<ClaimSet>(token, key, &without_exp) {
                Err(err) if matches!(err.kind(), ErrorKind::ImmatureSignature) => {
                    Rejection::InvalidToken
                }
                _ => Rejection::ExpiredToken,
            }
        }
        _ => Rejection::InvalidToken,
    }
}

/// Extracts the token from `Bearer <token>`. The keyword is case-sensitive and
/// followed by exactly one space.
pub(crate) fn parse_bearer(value: &HeaderValue) -> Result<&str, Rejection> {
    let raw = value.to_str().map_err(|_| Rejection::MalformedHeader)?;
    let token = raw
        .strip_prefix("Bearer ")
        .ok_or(Rejection::MalformedHeader)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(Rejection::MalformedHeader);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::TokenOptions;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header value")
    }

    fn user_claims() -> ClaimSet {
        json!({"user": 7802}).as_object().cloned().unwrap()
    }

    #[test]
    fn parse_bearer_accepts_valid_token() {
        let header = HeaderValue::from_static("Bearer abc.def.ghi");
        assert_eq!(parse_bearer(&header), Ok("abc.def.ghi"));
    }

    #[test]
    fn parse_bearer_rejects_wrong_scheme() {
        for raw in ["Boss abc.def.ghi", "bearer abc.def.ghi", "abc.def.ghi", "Basic credentials"] {
            let header = HeaderValue::from_str(raw).unwrap();
            assert_eq!(parse_bearer(&header), Err(Rejection::MalformedHeader), "{raw}");
        }
    }

    #[test]
    fn parse_bearer_rejects_empty_or_padded_token() {
        for raw in ["Bearer ", "Bearer    ", "Bearer  abc", "Bearer abc def"] {
            let header = HeaderValue::from_str(raw).unwrap();
            assert_eq!(parse_bearer(&header), Err(Rejection::MalformedHeader), "{raw}");
        }
    }

    #[test]
    fn missing_header_is_missing_credential() {
        let guard = Guard::new("TEST");
        assert_eq!(guard.check(None), Err(Rejection::MissingCredential));
    }

    #[test]
    fn garbage_token_is_invalid() {
        let guard = Guard::new("TEST");
        let header = bearer("43gfj30nc3fn340dfnehello!");
        assert_eq!(guard.check(Some(&header)), Err(Rejection::InvalidToken));
    }

    fn issue(guard: &Guard, options: TokenOptions) -> HeaderValue {
        bearer(&guard.generate(user_claims(), &options).unwrap())
    }

    #[test]
    fn leeway_boundary_is_inclusive() {
        let guard = Guard::new("TEST").with_leeway(30);
        let at_edge = issue(&guard, TokenOptions::new().expires_in(Duration::seconds(-30)));
        let past_edge = issue(&guard, TokenOptions::new().expires_in(Duration::seconds(-31)));

        let claims = guard.check(Some(&at_edge)).expect("within leeway");
        assert!(claims.contains("user"));
        assert!(claims.contains("exp"));
        assert_eq!(guard.check(Some(&past_edge)), Err(Rejection::ExpiredToken));
    }

    #[test]
    fn expiry_is_rejected_after_lifetime_plus_leeway() {
        let guard = Guard::new("TEST").with_leeway(5);
        let options = TokenOptions::new().expires_in(Duration::seconds(60));
        let fresh = issue(&guard, options.clone());
        // Issued in the past so that exp lands 2s and 10s behind the clock.
        let within = guard
            .generate_at(user_claims(), &options, Utc::now() - Duration::seconds(62))
            .unwrap();
        let beyond = guard
            .generate_at(user_claims(), &options, Utc::now() - Duration::seconds(70))
            .unwrap();

        assert!(guard.check(Some(&fresh)).is_ok());
        assert!(guard.check(Some(&bearer(&within))).is_ok());
        assert_eq!(guard.check(Some(&bearer(&beyond))), Err(Rejection::ExpiredToken));
    }

    #[test]
    fn not_before_is_invalid_until_start_minus_leeway() {
        let guard = Guard::new("TEST").with_leeway(10);
        let options = TokenOptions::new().starts_in(Duration::seconds(120));
        // nbf lands 120s, 15s and 5s ahead of the clock.
        let future = issue(&guard, options.clone());
        let outside = guard
            .generate_at(user_claims(), &options, Utc::now() - Duration::seconds(105))
            .unwrap();
        let inside = guard
            .generate_at(user_claims(), &options, Utc::now() - Duration::seconds(115))
            .unwrap();

        assert_eq!(guard.check(Some(&future)), Err(Rejection::InvalidToken));
        assert_eq!(guard.check(Some(&bearer(&outside))), Err(Rejection::InvalidToken));
        assert!(guard.check(Some(&bearer(&inside))).is_ok());
    }

    #[test]
    fn expired_and_not_yet_valid_is_invalid_not_expired() {
        let guard = Guard::new("TEST");
        let both = issue(
            &guard,
            TokenOptions::new()
                .expires_in(Duration::seconds(-60))
                .starts_in(Duration::seconds(120)),
        );
        let only_expired = issue(&guard, TokenOptions::new().expires_in(Duration::seconds(-60)));

        assert_eq!(guard.check(Some(&both)), Err(Rejection::InvalidToken));
        assert_eq!(guard.check(Some(&only_expired)), Err(Rejection::ExpiredToken));
    }

    #[test]
    fn non_numeric_exp_is_invalid() {
        let payload = json!({"user": 7802, "exp": "soon"});
        let token = encode(
            &Header::new(ALGORITHM),
            &payload,
            &EncodingKey::from_secret(b"TEST"),
        )
        .unwrap();
        assert_eq!(Guard::new("TEST").verify(&token), Err(Rejection::InvalidToken));
    }

    #[test]
    fn never_expiring_token_passes_without_temporal_claims() {
        let guard = Guard::new("TEST");
        let token = issue(&guard, TokenOptions::new().never_expires());
        let claims = guard.check(Some(&token)).expect("no exp required");
        assert!(!claims.contains("exp"));
    }

    #[test]
    fn leeway_change_applies_to_next_check() {
        let guard = Guard::new("TEST").with_leeway(30);
        let header = issue(&guard, TokenOptions::new().expires_in(Duration::seconds(-20)));

        assert!(guard.check(Some(&header)).is_ok());
        guard.set_leeway(0);
        assert_eq!(guard.check(Some(&header)), Err(Rejection::ExpiredToken));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let issuer = Guard::new("one");
        let verifier = Guard::new("two");
        let token = issuer.generate(user_claims(), &TokenOptions::new()).unwrap();
        assert_eq!(verifier.verify(&token), Err(Rejection::InvalidToken));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;

        let guard = Guard::new("TEST");
        let token = guard.generate(user_claims(), &TokenOptions::new()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(br#"{"user":1,"admin":true}"#);
        parts[1] = &forged;

        assert_eq!(guard.verify(&parts.join(".")), Err(Rejection::InvalidToken));
    }

    #[test]
    fn rotated_secret_invalidates_existing_tokens() {
        let guard = Guard::new("one");
        let token = guard.generate(user_claims(), &TokenOptions::new()).unwrap();
        assert!(guard.verify(&token).is_ok());
        guard.set_secret("two");
        assert_eq!(guard.verify(&token), Err(Rejection::InvalidToken));
    }

    #[test]
    fn issuer_is_informational_only() {
        let guard = Guard::new("TEST").with_issuer("voltron");
        let token = guard.generate(user_claims(), &TokenOptions::new()).unwrap();
        guard.set_issuer(Some("someone-else".into()));
        let claims = guard.verify(&token).expect("issuer mismatch is not enforced");
        assert_eq!(claims.issuer(), Some("voltron"));
    }

    #[test]
    fn gate_trait_delegates_to_guard() {
        fn run(gate: &dyn RequestGate, header: Option<&HeaderValue>) -> Result<Claims, Rejection> {
            gate.check(header)
        }
        let guard = Guard::new("TEST");
        let token = guard.generate(user_claims(), &TokenOptions::new()).unwrap();
        let claims = run(&guard, Some(&bearer(&token))).expect("accepted");
        assert_eq!(claims.get("user"), Some(&json!(7802)));
    }
}
