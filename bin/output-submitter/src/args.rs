use std::path::PathBuf;

use argh::FromArgs;
use toml::value::Table;

use crate::errors::ConfigError;

#[derive(Debug, Clone, FromArgs)]
#[argh(description = "Proposes rollup outputs to the L1 output oracle")]
pub struct Args {
    // Config non-overriding args
    #[argh(option, short = 'c', description = "path to configuration")]
    pub config: PathBuf,

    // Config overriding args
    /// L1 LCD url that will override the one in the config toml.
    #[argh(option, description = "L1 LCD endpoint")]
    pub lcd_url: Option<String>,

    /// Executor url that will override the one in the config toml.
    #[argh(option, description = "executor endpoint")]
    pub executor_url: Option<String>,

    /// Other generic overrides to the config toml.
    /// Will be used, for example, as `-o submitter.poll_interval_ms=500 -o signer.url=http://signer`
    #[argh(option, short = 'o', description = "generic config overrides")]
    pub overrides: Vec<String>,
}

impl Args {
    /// Get strings of overrides gathered from args.
    pub fn get_overrides(&self) -> Vec<String> {
        let mut overrides = self.overrides.clone();
        overrides.extend(self.get_direct_overrides());
        overrides
    }

    /// Overrides passed directly as args and not as overrides.
    fn get_direct_overrides(&self) -> Vec<String> {
        let mut overrides = Vec::new();
        if let Some(lcd_url) = &self.lcd_url {
            overrides.push(format!("l1.lcd_url={lcd_url}"));
        }
        if let Some(executor_url) = &self.executor_url {
            overrides.push(format!("executor.url={executor_url}"));
        }
        overrides
    }
}

type Override = (String, toml::Value);

/// Parses an override. This first splits the string by '=' to get key and value and then splits
/// the key by '.' which is the update path.
pub fn parse_override(override_str: &str) -> Result<Override, ConfigError> {
    let (key, value_str) = override_str
        .split_once("=")
        .ok_or(ConfigError::InvalidOverride(override_str.to_string()))?;
    Ok((key.to_string(), parse_value(value_str)))
}

/// Apply override to config.
pub fn apply_override(
    path: &str,
    value: toml::Value,
    table: &mut Table,
) -> Result<(), ConfigError> {
    match path.split_once(".") {
        None => {
            table.insert(path.to_string(), value);
            Ok(())
        }
        Some((key, rest)) => {
            if let Some(t) = table.get_mut(key).and_then(|v| v.as_table_mut()) {
                apply_override(rest, value, t)
            } else if table.contains_key(key) {
                Err(ConfigError::TraverseNonTableAt(key.to_string()))
            } else {
                Err(ConfigError::MissingKey(key.to_string()))
            }
        }
    }
}

/// Parses a string into a toml value. First tries as `i64`, then as `bool` and then defaults to
/// `String`.
fn parse_value(str_value: &str) -> toml::Value {
    str_value
        .parse::<i64>()
        .map(toml::Value::Integer)
        .or_else(|_| str_value.parse::<bool>().map(toml::Value::Boolean))
        .unwrap_or_else(|_| toml::Value::String(str_value.to_string()))
}

#[cfg(test)]
mod test {
    use opinit_config::{Config, ExecutorConfig, L1Config, SignerConfig, SubmitterConfig};

    use super::*;

    fn get_config() -> Config {
        Config {
            l1: L1Config {
                lcd_url: "http://localhost:1317".to_string(),
                rollup_type_tag: "0x1::rollup::Rollup".to_string(),
                submitter_address: "init1submitter".to_string(),
                request_timeout_ms: 10_000,
            },
            signer: SignerConfig {
                url: "http://localhost:8090".to_string(),
                request_timeout_ms: 10_000,
            },
            executor: ExecutorConfig {
                url: "http://localhost:3000".to_string(),
                request_timeout_ms: 10_000,
            },
            submitter: SubmitterConfig::default(),
        }
    }

    fn args(overrides: Vec<String>) -> Args {
        Args {
            config: "config_path".into(),
            lcd_url: Some("http://lcd:1317".to_string()),
            executor_url: None,
            overrides,
        }
    }

    #[test]
    fn test_apply_override() {
        let config = get_config();
        let mut toml = toml::Value::try_from(&config).unwrap();
        let table = toml.as_table_mut().unwrap();
        let args = args(vec![
            "submitter.poll_interval_ms=50".to_string(),
            "submitter.inclusion_timeout_ms=30000".to_string(),
            "signer.url=http://signer:8090".to_string(),
            "executor.url=http://executor".to_string(),
        ]);

        let overrides = args
            .get_overrides()
            .into_iter()
            .map(|x| parse_override(&x).unwrap());

        for (path, val) in overrides {
            apply_override(&path, val, table).unwrap();
        }

        let new_config: Config = toml.try_into().unwrap();

        assert_eq!(new_config.submitter.poll_interval_ms, 50);
        assert_eq!(new_config.submitter.inclusion_timeout_ms, 30_000);
        assert_eq!(&new_config.signer.url, "http://signer:8090");
        assert_eq!(&new_config.executor.url, "http://executor");
        assert_eq!(&new_config.l1.lcd_url, "http://lcd:1317");
    }

    #[test]
    fn test_bad_overrides() {
        assert!(matches!(
            parse_override("no_equals_sign"),
            Err(ConfigError::InvalidOverride(_))
        ));

        let mut toml = toml::Value::try_from(get_config()).unwrap();
        let table = toml.as_table_mut().unwrap();

        let err = apply_override("nope.url", toml::Value::Integer(1), table).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(k) if k == "nope"));

        let err = apply_override("l1.lcd_url.x", toml::Value::Integer(1), table).unwrap_err();
        assert!(matches!(err, ConfigError::TraverseNonTableAt(k) if k == "lcd_url"));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("12"), toml::Value::Integer(12));
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(
            parse_value("http://x:1"),
            toml::Value::String("http://x:1".to_string())
        );
    }
}
