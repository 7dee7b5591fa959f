use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tracing::debug;

use crate::claims::{is_reserved, ClaimSet, EXPIRES_AT, ISSUED_AT, ISSUER, NOT_BEFORE};
use crate::config::ALGORITHM;
use crate::error::{IssueError, IssueResult};
use crate::guard::Guard;

/// How long an issued token stays valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Expiry {
    /// Use the guard's configured default lifetime.
    #[default]
    Default,
    /// Relative to issuance. Negative values produce already-expired tokens.
    In(Duration),
    /// Omit `exp` entirely.
    Never,
}

/// Temporal options for [`Guard::generate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenOptions {
    pub expires: Expiry,
    /// Sets `nbf` relative to issuance. `None` leaves the token valid immediately.
    pub starts: Option<Duration>,
    /// Stamp `iat` with the issuance instant.
    pub issued: bool,
}

impl TokenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expires_in(mut self, lifetime: Duration) -> Self {
        self.expires = Expiry::In(lifetime);
        self
    }

    pub fn never_expires(mut self) -> Self {
        self.expires = Expiry::Never;
        self
    }

    pub fn starts_in(mut self, delay: Duration) -> Self {
        self.starts = Some(delay);
        self
    }

    pub fn with_issued_at(mut self) -> Self {
        self.issued = true;
        self
    }
}

impl Guard {
    /// Sign `claims` plus the standard claims requested by `options`.
    ///
    /// `exp`, `nbf`, `iat` and `iss` are always computed here; caller-supplied
    /// values under those names are dropped.
    pub fn generate(&self, claims: ClaimSet, options: &TokenOptions) -> IssueResult<String> {
        self.generate_at(claims, options, Utc::now())
    }

    /// Same as [`Guard::generate`] with an explicit issuance instant.
    pub fn generate_at(
        &self,
        claims: ClaimSet,
        options: &TokenOptions,
        now: DateTime<Utc>,
    ) -> IssueResult<String> {
        let (key, issuer, default_expiry) = {
            let config = self.read();
            if config.secret.is_empty() {
                return Err(IssueError::EmptySecret);
            }
            (
                EncodingKey::from_secret(&config.secret),
                config.issuer.clone(),
                config.default_expiry,
            )
        };

        let mut payload: ClaimSet = claims
            .into_iter()
            .filter(|(name, _)| {
                let reserved = is_reserved(name);
                if reserved {
                    debug!(claim = %name, "dropping caller-supplied standard claim");
                }
                !reserved
            })
            .collect();

        let issued_at = now.timestamp();
        let lifetime = match options.expires {
            Expiry::Default => default_expiry,
            Expiry::In(lifetime) => Some(lifetime),
            Expiry::Never => None,
        };
        if let Some(lifetime) = lifetime {
            payload.insert(
                EXPIRES_AT.to_owned(),
                Value::from(issued_at.saturating_add(lifetime.num_seconds())),
            );
        }
        if let Some(delay) = options.starts {
            payload.insert(
                NOT_BEFORE.to_owned(),
                Value::from(issued_at.saturating_add(delay.num_seconds())),
            );
        }
        if options.issued {
            payload.insert(ISSUED_AT.to_owned(), Value::from(issued_at));
        }
        if let Some(issuer) = issuer {
            payload.insert(ISSUER.to_owned(), Value::from(issuer));
        }

        let token = encode(&Header::new(ALGORITHM), &payload, &key)?;
        debug!(claims = payload.len(), "issued token");
        Ok(token)
    }
}
