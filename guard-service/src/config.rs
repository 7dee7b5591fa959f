use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use jwt_guard::{Guard, GuardConfig, DEFAULT_EXPIRY_HOURS};
use std::env;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone)]
pub struct GuardSettings {
    pub guard: GuardConfig,
    pub listen_addr: SocketAddr,
}

impl GuardSettings {
    pub fn into_guard(self) -> Guard {
        Guard::from_config(self.guard)
    }
}

pub fn load_guard_settings() -> Result<GuardSettings> {
    settings_from(|key| env::var(key).ok())
}

/// Builds settings from any key lookup; the process environment in production.
pub fn settings_from<F>(lookup: F) -> Result<GuardSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let secret = lookup("JWT_GUARD_SECRET")
        .and_then(|value| normalize_optional(&value))
        .ok_or_else(|| anyhow!("JWT_GUARD_SECRET must be set"))?;

    let leeway_seconds = lookup("JWT_GUARD_LEEWAY_SECONDS")
        .map(|value| value.trim().parse::<u64>())
        .transpose()
        .context("Failed to parse JWT_GUARD_LEEWAY_SECONDS")?
        .unwrap_or(0);

    let issuer = lookup("JWT_GUARD_ISSUER").and_then(|value| normalize_optional(&value));

    let default_expiry = match lookup("JWT_GUARD_DEFAULT_TTL_SECONDS") {
        Some(value) => parse_ttl(&value).context("Failed to parse JWT_GUARD_DEFAULT_TTL_SECONDS")?,
        None => Some(Duration::hours(DEFAULT_EXPIRY_HOURS)),
    };

    let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
    let port = lookup("PORT")
        .map(|value| value.trim().parse::<u16>())
        .transpose()
        .context("Failed to parse PORT")?
        .unwrap_or(8080);
    let ip = host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid HOST '{host}'"))?;

    let mut guard = GuardConfig::new(secret)
        .with_leeway(leeway_seconds)
        .with_default_expiry(default_expiry);
    if let Some(issuer) = issuer {
        guard = guard.with_issuer(issuer);
    }

    Ok(GuardSettings {
        guard,
        listen_addr: SocketAddr::from((ip, port)),
    })
}

fn parse_ttl(value: &str) -> Result<Option<Duration>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "none" | "never" => Ok(None),
        other => {
            let seconds: i64 = other
                .parse()
                .map_err(|err| anyhow!("Invalid TTL '{other}': {err}"))?;
            if seconds < 0 {
                return Err(anyhow!("TTL must not be negative, got {seconds}"));
            }
            duration_from_seconds(seconds).map(Some)
        }
    }
}

/// Converts a second count into a `Duration`, rejecting values outside its range.
pub fn duration_from_seconds(seconds: i64) -> Result<Duration> {
    Duration::try_seconds(seconds).ok_or_else(|| anyhow!("{seconds} seconds is out of range"))
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
