use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};

/// The default session lifetime in days.
pub const DEFAULT_SESSION_DURATION_DAYS: i64 = 14;

/// Longest session lifetime accepted, in days.
pub const MAX_SESSION_DURATION_DAYS: i64 = 3650;

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The duration of a session in days.
    pub session_duration_days: i64,
    /// Whether session cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
    /// Interval of the expired-session sweep. `None` leaves expiry to lazy purging only.
    pub sweep_interval_secs: Option<u64>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a `Config` from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .context("Invalid BIND_ADDR")?;

        let session_duration_days: i64 = match lookup("SESSION_DURATION_DAYS") {
            Some(raw) => raw.parse().context("Invalid SESSION_DURATION_DAYS")?,
            None => DEFAULT_SESSION_DURATION_DAYS,
        };

        if !(1..=MAX_SESSION_DURATION_DAYS).contains(&session_duration_days) {
            anyhow::bail!(
                "SESSION_DURATION_DAYS must be between 1 and {} days",
                MAX_SESSION_DURATION_DAYS
            );
        }

        let cookie_secure = match lookup("SESSION_COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).context("Invalid SESSION_COOKIE_SECURE")?,
            None => true,
        };

        let sweep_interval_secs = match lookup("SESSION_SWEEP_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().context("Invalid SESSION_SWEEP_INTERVAL_SECS")?;
                if secs == 0 {
                    anyhow::bail!("SESSION_SWEEP_INTERVAL_SECS must be greater than zero");
                }
                Some(secs)
            }
            None => None,
        };

        Ok(Self {
            bind_addr,
            session_duration_days,
            cookie_secure,
            sweep_interval_secs,
        })
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {:?}", other),
    }
}
