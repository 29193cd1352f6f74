//! Shared configuration types for quill services
//!
//! Every binary in the workspace reads its database and environment settings
//! through this crate so that defaults and parsing rules stay in one place.

mod database;
mod error;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ConfigResult};

use std::env;

/// Settings common to every quill process
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// PostgreSQL connection settings
    pub database: DatabaseConfig,

    /// Deployment mode (development, staging, production)
    pub environment: Environment,

    /// Log filter directive from RUST_LOG or LOG_LEVEL, if either is set
    pub log_level: Option<String>,
}

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to development.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            _ => Self::Development,
        })
    }
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        };
        f.write_str(name)
    }
}

impl CommonConfig {
    /// Read the shared settings from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            environment: get_env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env::var("RUST_LOG").or_else(|_| env::var("LOG_LEVEL")).ok(),
        })
    }
}

/// Read a variable that has no sensible default
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Read a variable, falling back to `default` when it is unset
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse a variable into `T`, falling back to `default` when it is unset
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

/// Parse a boolean flag (`1/0`, `true/false`, `yes/no`, `on/off`)
pub fn parse_bool_env(name: &str, default: bool) -> ConfigResult<bool> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("expected a boolean, got '{}'", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            " PROD ".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "stage".parse::<Environment>().unwrap(),
            Environment::Staging
        );
        assert_eq!(
            "whatever".parse::<Environment>().unwrap(),
            Environment::Development
        );
    }

    #[test]
    fn test_environment_display_round_trips() {
        for env in [
            Environment::Development,
            Environment::Staging,
            Environment::Production,
        ] {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        temp_env::with_var_unset("QUILL_TEST_PARSE_UNSET", || {
            assert_eq!(parse_env("QUILL_TEST_PARSE_UNSET", 7u32).unwrap(), 7);
        });
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        temp_env::with_var("QUILL_TEST_PARSE_BAD", Some("seven"), || {
            let err = parse_env::<u32>("QUILL_TEST_PARSE_BAD", 7).unwrap_err();
            assert!(err.to_string().contains("QUILL_TEST_PARSE_BAD"));
        });
    }

    #[test]
    fn test_parse_bool_env_variants() {
        temp_env::with_var("QUILL_TEST_FLAG", Some("On"), || {
            assert!(parse_bool_env("QUILL_TEST_FLAG", false).unwrap());
        });
        temp_env::with_var("QUILL_TEST_FLAG", Some("0"), || {
            assert!(!parse_bool_env("QUILL_TEST_FLAG", true).unwrap());
        });
        temp_env::with_var("QUILL_TEST_FLAG", Some("maybe"), || {
            assert!(parse_bool_env("QUILL_TEST_FLAG", true).is_err());
        });
    }

    #[test]
    fn test_required_env_reports_missing_variable() {
        temp_env::with_var_unset("QUILL_TEST_REQUIRED", || {
            let err = get_required_env("QUILL_TEST_REQUIRED").unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "QUILL_TEST_REQUIRED"));
        });
        temp_env::with_var("QUILL_TEST_REQUIRED", Some("set"), || {
            assert_eq!(get_required_env("QUILL_TEST_REQUIRED").unwrap(), "set");
        });
    }

    #[test]
    fn test_common_config_reads_log_level_fallback() {
        temp_env::with_vars(
            [
                ("RUST_LOG", None),
                ("LOG_LEVEL", Some("warn")),
                ("ENVIRONMENT", Some("staging")),
            ],
            || {
                let config = CommonConfig::from_env().unwrap();
                assert_eq!(config.log_level.as_deref(), Some("warn"));
                assert_eq!(config.environment, Environment::Staging);
            },
        );
    }
}
