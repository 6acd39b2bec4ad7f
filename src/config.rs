//! Application configuration parsed from environment variables.
//!
//! `main` loads `.env` through `dotenvy` first, then calls
//! [`AppConfig::from_env`]. Parsing goes through a lookup closure so tests
//! can feed a map instead of mutating the process environment.

use axum_extra::extract::cookie::SameSite;

use crate::api::config::ApiConfig;
use crate::gate::{GateMode, GatePolicy};
use crate::session::CookiePolicy;

pub const DEFAULT_PORT: u16 = 3000;

/// Errors produced while reading configuration values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub api: ApiConfig,
    pub gate: GatePolicy,
    pub cookie: CookiePolicy,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `GATE_MODE`: `open` (default) or `protect`
    /// - `GATE_PUBLIC_PATHS`: comma-separated paths reachable without a session
    /// - `SESSION_COOKIE_HTTP_ONLY`, `SESSION_COOKIE_SECURE`: booleans, default off
    /// - `SESSION_COOKIE_SAME_SITE`: `lax`, `strict` or `none`; unset by default
    ///
    /// Backend variables are documented on [`ApiConfig::from_lookup`].
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let api = ApiConfig::from_lookup(&lookup)?;
        let gate = parse_gate(&lookup)?;
        let cookie = CookiePolicy {
            http_only: parse_flag(&lookup, "SESSION_COOKIE_HTTP_ONLY")?.unwrap_or(false),
            secure: parse_flag(&lookup, "SESSION_COOKIE_SECURE")?.unwrap_or(false),
            same_site: parse_same_site(lookup("SESSION_COOKIE_SAME_SITE"))?,
        };

        Ok(Self { port, api, gate, cookie })
    }
}

/// Parse a boolean env value. Accepts `1/true/yes/on` and `0/false/no/off`,
/// case-insensitive and trimmed.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<bool>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => parse_bool(&raw)
            .map(Some)
            .ok_or(ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_same_site(raw: Option<String>) -> Result<Option<SameSite>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "lax" => Ok(Some(SameSite::Lax)),
        "strict" => Ok(Some(SameSite::Strict)),
        "none" => Ok(Some(SameSite::None)),
        _ => Err(ConfigError::Invalid { key: "SESSION_COOKIE_SAME_SITE", value: raw }),
    }
}

fn parse_gate(lookup: &impl Fn(&str) -> Option<String>) -> Result<GatePolicy, ConfigError> {
    let mode = match lookup("GATE_MODE") {
        None => GateMode::Open,
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "" | "open" => GateMode::Open,
            "protect" => GateMode::Protect,
            _ => return Err(ConfigError::Invalid { key: "GATE_MODE", value: raw }),
        },
    };

    let mut policy = GatePolicy::new(mode);
    if let Some(raw) = lookup("GATE_PUBLIC_PATHS") {
        policy = policy.with_public_paths(
            raw.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned),
        );
    }
    Ok(policy)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
