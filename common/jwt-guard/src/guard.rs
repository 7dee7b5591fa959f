use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Duration;

use crate::config::GuardConfig;

/// Shared handle over the process-wide [`GuardConfig`].
///
/// Clones share the same configuration. Setters are visible to every check
/// that starts after them; a check already running keeps the values it read.
/// There is no cross-field transaction, so concurrent writers and readers are
/// only eventually consistent across requests.
#[derive(Debug, Clone)]
pub struct Guard {
    config: Arc<RwLock<GuardConfig>>,
}

impl Guard {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self::from_config(GuardConfig::new(secret))
    }

    pub fn from_config(config: GuardConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub fn with_leeway(self, seconds: u64) -> Self {
        self.set_leeway(seconds);
        self
    }

    pub fn with_issuer(self, issuer: impl Into<String>) -> Self {
        self.set_issuer(Some(issuer.into()));
        self
    }

    pub fn with_default_expiry(self, expiry: Option<Duration>) -> Self {
        self.write().default_expiry = expiry;
        self
    }

    /// Point-in-time copy of the configuration.
    pub fn config(&self) -> GuardConfig {
        self.read().clone()
    }

    pub fn leeway(&self) -> u64 {
        self.read().leeway_seconds
    }

    pub fn set_leeway(&self, seconds: u64) {
        self.write().leeway_seconds = seconds;
    }

    pub fn issuer(&self) -> Option<String> {
        self.read().issuer.clone()
    }

    pub fn set_issuer(&self, issuer: Option<String>) {
        self.write().issuer = issuer;
    }

    pub fn set_secret(&self, secret: impl Into<Vec<u8>>) {
        self.write().secret = secret.into();
    }

    // Every write is a single field store, so a poisoned lock still holds a usable config.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, GuardConfig> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GuardConfig> {
        self.config.write().unwrap_or_else(PoisonError::into_inner)
    }
}
