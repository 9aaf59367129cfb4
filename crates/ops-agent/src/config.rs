//! # Agent Configuration
//!
//! Environment-based configuration for the operations desk service.
//! Unparseable values are logged and replaced by their defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use ops_domain::Severity;
use ops_engine::SeverityPolicy;

const DEFAULT_DATA_FILE: &str = "data/roster.json";

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// Logging level used when `RUST_LOG` is unset
    pub log_level: String,

    /// JSON roster document backing the row store
    pub data_file: PathBuf,

    /// CORS allowed origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Severity of the configurable conflict kinds
    pub severity: SeverityPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = SeverityPolicy::default();

        Self {
            server_addr: parsed_var("SERVER_ADDR").unwrap_or_else(default_addr),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            data_file: env::var("OPS_DATA_FILE")
                .map_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE), PathBuf::from),

            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),

            severity: SeverityPolicy {
                skill_mismatch: severity_var("SEVERITY_SKILL_MISMATCH", defaults.skill_mismatch),
                weather_mismatch: severity_var(
                    "SEVERITY_WEATHER_MISMATCH",
                    defaults.weather_mismatch,
                ),
                budget_overrun: severity_var("SEVERITY_BUDGET_OVERRUN", defaults.budget_overrun),
                location_mismatch: severity_var(
                    "SEVERITY_LOCATION_MISMATCH",
                    defaults.location_mismatch,
                ),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Parsed value of `key`, or `None` (with a warning when set but invalid)
fn parsed_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "Ignoring invalid configuration value");
    }
    parsed
}

fn severity_var(key: &str, default: Severity) -> Severity {
    env::var(key).map_or(default, |raw| parse_severity(key, &raw, default))
}

fn parse_severity(key: &str, raw: &str, default: Severity) -> Severity {
    Severity::parse(raw).unwrap_or_else(|| {
        tracing::warn!(
            key,
            value = raw,
            "Unknown severity, expected 'critical' or 'informational'"
        );
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addr() {
        assert_eq!(default_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_severity_values() {
        let fallback = Severity::Informational;
        assert_eq!(parse_severity("K", "Critical", fallback), Severity::Critical);
        assert_eq!(parse_severity("K", " informational ", Severity::Critical), fallback);
        assert_eq!(parse_severity("K", "urgent", fallback), fallback);
    }
}
