use std::fmt;

use chrono::Duration;
use jsonwebtoken::Algorithm;

/// The only algorithm tokens are signed and verified with.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Lifetime applied to tokens issued with `Expiry::Default` unless overridden.
pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Runtime configuration shared by the issuer and the verifier.
#[derive(Clone)]
pub struct GuardConfig {
    /// HMAC secret.
    pub secret: Vec<u8>,
    /// Allowable clock skew in seconds when validating exp/nbf.
    pub leeway_seconds: u64,
    /// Stamped into `iss` on every issued token when set. Not checked on verify.
    pub issuer: Option<String>,
    /// Lifetime of tokens issued without an explicit expiry. `None` means no `exp`.
    pub default_expiry: Option<Duration>,
}

impl GuardConfig {
    /// Construct config with zero leeway, no issuer and a 24 hour default expiry.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            leeway_seconds: 0,
            issuer: None,
            default_expiry: Some(Duration::hours(DEFAULT_EXPIRY_HOURS)),
        }
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_default_expiry(mut self, expiry: Option<Duration>) -> Self {
        self.default_expiry = expiry;
        self
    }
}

impl fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardConfig")
            .field("secret", &"<redacted>")
            .field("leeway_seconds", &self.leeway_seconds)
            .field("issuer", &self.issuer)
            .field("default_expiry", &self.default_expiry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GuardConfig::new("TEST");
        assert_eq!(config.leeway_seconds, 0);
        assert!(config.issuer.is_none());
        assert_eq!(config.default_expiry, Some(Duration::hours(24)));
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = GuardConfig::new("super-secret").with_issuer("voltron");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("voltron"));
    }
}
