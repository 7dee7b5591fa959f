use anyhow::{anyhow, Context, Result};
use clap::Parser;
use guard_service::config::{duration_from_seconds, load_guard_settings};
use jwt_guard::{ClaimSet, TokenOptions};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(about = "Issue a signed token using the guard-service configuration", long_about = None)]
struct Options {
    /// Claim to embed as key=value; the value is parsed as JSON, falling back to a string (repeatable)
    #[arg(long = "claim", value_name = "KEY=VALUE", value_parser = parse_claim)]
    claims: Vec<(String, Value)>,

    /// Lifetime in seconds; negative values produce an already-expired token
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true, conflicts_with = "no_expiry")]
    expires_in: Option<i64>,

    /// Omit the exp claim
    #[arg(long)]
    no_expiry: bool,

    /// Seconds until the token becomes valid (sets nbf)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    starts_in: Option<i64>,

    /// Stamp iat with the current time
    #[arg(long)]
    issued: bool,
}

fn parse_claim(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("claim name must not be empty"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn main() -> Result<()> {
    let opts = Options::parse();
    let guard = load_guard_settings()?.into_guard();

    let mut options = TokenOptions::new();
    if opts.no_expiry {
        options = options.never_expires();
    } else if let Some(seconds) = opts.expires_in {
        options = options.expires_in(duration_from_seconds(seconds).context("Invalid --expires-in")?);
    }
    if let Some(seconds) = opts.starts_in {
        options = options.starts_in(duration_from_seconds(seconds).context("Invalid --starts-in")?);
    }
    if opts.issued {
        options = options.with_issued_at();
    }

    let claims: ClaimSet = opts.claims.into_iter().collect();
    let token = guard
        .generate(claims, &options)
        .context("Failed to issue token")?;
    println!("{token}");

    Ok(())
}
