use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered claim name to value mapping carried in a token payload.
pub type ClaimSet = Map<String, Value>;

pub const EXPIRES_AT: &str = "exp";
pub const NOT_BEFORE: &str = "nbf";
pub const ISSUED_AT: &str = "iat";
pub const ISSUER: &str = "iss";

/// Claim names computed by the issuer. Caller-supplied values under these names are dropped.
pub const RESERVED: &[&str] = &[EXPIRES_AT, NOT_BEFORE, ISSUED_AT, ISSUER];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Verified claims, exposed to handlers exactly as they were signed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(ClaimSet);

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get(ISSUER).and_then(Value::as_str)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(EXPIRES_AT)
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.timestamp(NOT_BEFORE)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(ISSUED_AT)
    }

    pub fn as_map(&self) -> &ClaimSet {
        &self.0
    }

    pub fn into_inner(self) -> ClaimSet {
        self.0
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        let seconds = self.get(name)?.as_i64()?;
        Utc.timestamp_opt(seconds, 0).single()
    }
}

impl From<ClaimSet> for Claims {
    fn from(value: ClaimSet) -> Self {
        Self(value)
    }
}
