//! Configuration loading and representation.
//!
//! Everything has a working default; environment variables override it.
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `NEWSROOM_PERMISSION_CACHE` | enable the summary cache (`1`/`true`/`yes`/`on`) | off |
//! | `NEWSROOM_PERMISSION_CACHE_TTL_SECS` | cache entry lifetime in seconds | `30` |

use serde::{Deserialize, Serialize};

pub const CACHE_ENABLED_VAR: &str = "NEWSROOM_PERMISSION_CACHE";
pub const CACHE_TTL_VAR: &str = "NEWSROOM_PERMISSION_CACHE_TTL_SECS";

const DEFAULT_TTL_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Caching is opt-in; without it every request resolves fresh.
    pub enabled: bool,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionConfig {
    pub cache: CacheConfig,
}

impl PermissionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values fall back to
    /// the default and are logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(CACHE_ENABLED_VAR) {
            match parse_flag(&raw) {
                Some(enabled) => config.cache.enabled = enabled,
                None => {
                    tracing::warn!(var = CACHE_ENABLED_VAR, value = %raw, "ignoring invalid flag")
                }
            }
        }

        if let Some(raw) = lookup(CACHE_TTL_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(ttl) => config.cache.ttl_secs = ttl,
                Err(e) => {
                    tracing::warn!(var = CACHE_TTL_VAR, value = %raw, error = %e, "ignoring invalid ttl")
                }
            }
        }

        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
