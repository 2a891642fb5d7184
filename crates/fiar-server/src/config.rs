//! Server configuration

use fiar_core::{FiarError, Result};

/// Environment variable holding the random seed for starting players
pub const SEED_ENV: &str = "FIAR_SEED";
/// Environment variable holding the default log filter
pub const LOG_ENV: &str = "FIAR_LOG";

/// Configuration for the four-in-a-row server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server name reported during `initialize`
    pub name: String,
    /// Server version reported during `initialize`
    pub version: String,
    /// Log filter used when `RUST_LOG` is not set
    pub default_log_level: String,
    /// Seed for the starting-player RNG; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "fiar".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            default_log_level: "info".to_string(),
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `FIAR_SEED` and `FIAR_LOG`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(seed) = std::env::var(SEED_ENV) {
            config.seed = Some(parse_seed(&seed)?);
        }
        if let Ok(level) = std::env::var(LOG_ENV) {
            config.default_log_level = level;
        }
        Ok(config)
    }

    /// Apply `--seed <u64>` and `--log <filter>` overrides
    pub fn apply_args<I, S>(mut self, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "--seed" => {
                    let value = args
                        .next()
                        .ok_or_else(|| FiarError::Config("--seed requires a value".into()))?;
                    self.seed = Some(parse_seed(value.as_ref())?);
                }
                "--log" => {
                    let value = args
                        .next()
                        .ok_or_else(|| FiarError::Config("--log requires a value".into()))?;
                    self.default_log_level = value.as_ref().to_string();
                }
                other => {
                    return Err(FiarError::Config(format!("Unknown argument: {}", other)));
                }
            }
        }
        Ok(self)
    }
}

fn parse_seed(raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|e| FiarError::Config(format!("Invalid seed {:?}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.name, "fiar");
        assert_eq!(config.default_log_level, "info");
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_args_override() {
        let config = ServerConfig::default()
            .apply_args(["--seed", "42", "--log", "debug"])
            .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.default_log_level, "debug");
    }

    #[test]
    fn test_bad_args() {
        for args in [vec!["--seed"], vec!["--seed", "x"], vec!["--verbose"], vec!["--log"]] {
            match ServerConfig::default().apply_args(args.clone()) {
                Err(FiarError::Config(_)) => {}
                other => panic!("Expected Config error for {:?}, got {:?}", args, other),
            }
        }
    }
}
