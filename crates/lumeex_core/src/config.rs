//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_PREVIEW_PORT, DEFAULT_SERVER_URL};
use std::env;
use std::time::Duration;
use tracing::warn;

/// Runtime configuration for Lumeex admin clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_url: String,
    /// `None` means requests may hang indefinitely.
    pub request_timeout: Option<Duration>,
    pub preview_port: u16,
    pub filter: FilterOptions,
}

/// Behavior of the public gallery filter when it is seeded from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    pub scroll_on_initial_load: bool,
    pub reorder_on_initial_load: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            scroll_on_initial_load: true,
            reorder_on_initial_load: true,
        }
    }
}

/// Reads an on/off flag such as `LUMEEX_FILTER_SCROLL_ON_LOAD`.
///
/// Accepts `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off` (or an empty
/// value), in any case and with surrounding whitespace. Anything else is
/// `None` so the caller keeps its default.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn flag_or(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> bool {
    let Some(value) = lookup(name) else {
        return default;
    };
    parse_env_flag(&value).unwrap_or_else(|| {
        warn!(name, %value, default, "unrecognized flag value, using default");
        default
    })
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let server_url = lookup("LUMEEX_SERVER")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let request_timeout = lookup("LUMEEX_REQUEST_TIMEOUT_SECS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let preview_port = match lookup("PREVIEW_PORT") {
            Some(value) => value.trim().parse::<u16>().unwrap_or_else(|_| {
                warn!(%value, "invalid PREVIEW_PORT, using default");
                DEFAULT_PREVIEW_PORT
            }),
            None => DEFAULT_PREVIEW_PORT,
        };
        let defaults = FilterOptions::default();
        let filter = FilterOptions {
            scroll_on_initial_load: flag_or(
                &lookup,
                "LUMEEX_FILTER_SCROLL_ON_LOAD",
                defaults.scroll_on_initial_load,
            ),
            reorder_on_initial_load: flag_or(
                &lookup,
                "LUMEEX_FILTER_REORDER_ON_LOAD",
                defaults.reorder_on_initial_load,
            ),
        };
        Self {
            server_url,
            request_timeout,
            preview_port,
            filter,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
