// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub templates_glob: String,
    pub session_ttl_hours: i64,
    /// Adds `Secure` to the session cookie; off by default for local use.
    pub cookie_secure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_path: PathBuf::from("kopi.sqlite3"),
            templates_glob: "templates/**/*.html".to_string(),
            session_ttl_hours: 24 * 14,
            cookie_secure: false,
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_string("KOPI_BIND_ADDR", &defaults.bind_addr),
            database_path: PathBuf::from(env_string(
                "KOPI_DATABASE_PATH",
                &defaults.database_path.to_string_lossy(),
            )),
            templates_glob: env_string("KOPI_TEMPLATES_GLOB", &defaults.templates_glob),
            session_ttl_hours: env_i64("KOPI_SESSION_TTL_HOURS", defaults.session_ttl_hours),
            cookie_secure: env_bool("KOPI_COOKIE_SECURE", defaults.cookie_secure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.session_ttl_hours, 336);
        assert!(!config.cookie_secure);
    }
}
