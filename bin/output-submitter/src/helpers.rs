use std::{fs, sync::Arc};

use format_serde_error::SerdeError;
use opinit_config::Config;
use opinit_executor_client::HttpExecutorClient;
use opinit_l1client::{L1Gateway, LcdClient, RemoteSigner};
use tracing::*;

use crate::{
    args::{apply_override, parse_override, Args},
    errors::{ConfigError, InitError},
};

pub type Gateway = L1Gateway<LcdClient, RemoteSigner>;

/// Loads the config file and applies the overrides from `args` on top of it.
pub fn get_config(args: &Args) -> Result<Config, InitError> {
    let config_str = fs::read_to_string(&args.config)?;
    load_configuration(config_str, &args.get_overrides())
}

fn load_configuration(config_str: String, overrides: &[String]) -> Result<Config, InitError> {
    let mut value = toml::from_str::<toml::Value>(&config_str)
        .map_err(|err| SerdeError::new(config_str.clone(), err))?;

    let table = value.as_table_mut().ok_or(ConfigError::NotATable)?;
    for ov in overrides {
        let (path, val) = parse_override(ov)?;
        apply_override(&path, val, table)?;
    }

    let conf = value
        .try_into::<Config>()
        .map_err(|err| SerdeError::new(config_str, err))?;
    Ok(conf)
}

pub fn create_gateway(config: &Config) -> Result<Arc<Gateway>, InitError> {
    let lcd = LcdClient::new(&config.l1)?;
    let signer = RemoteSigner::new(&config.signer, config.l1.submitter_address.clone())?;

    debug!(lcd_url = %config.l1.lcd_url, signer_url = %config.signer.url, "created L1 gateway");
    Ok(Arc::new(L1Gateway::new(
        lcd,
        signer,
        config.l1.rollup_type_tag.clone(),
        config.submitter.inclusion_poll_interval(),
    )))
}

pub fn create_executor_client(config: &Config) -> Result<Arc<HttpExecutorClient>, InitError> {
    let client = HttpExecutorClient::new(&config.executor)?;
    debug!(url = %config.executor.url, "created executor client");
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        [l1]
        lcd_url = "http://localhost:1317"
        rollup_type_tag = "0x1::rollup::Rollup"
        submitter_address = "init1submitter"

        [signer]
        url = "http://localhost:8090"

        [executor]
        url = "http://localhost:3000"
    "#;

    #[test]
    fn test_load_configuration_with_overrides() {
        let config = load_configuration(
            CONFIG.to_string(),
            &["l1.lcd_url=http://other:1317".to_string()],
        )
        .unwrap();
        assert_eq!(config.l1.lcd_url, "http://other:1317");
        assert_eq!(config.submitter.poll_interval_ms, 1_000);
    }

    #[test]
    fn test_load_configuration_errors() {
        let err = load_configuration("[l1]\nlcd_url = 1".to_string(), &[]).unwrap_err();
        assert!(matches!(err, InitError::MalformedConfig(_)));

        let err =
            load_configuration(CONFIG.to_string(), &["missing.key=1".to_string()]).unwrap_err();
        assert!(matches!(err, InitError::Config(ConfigError::MissingKey(_))));
    }

    #[test]
    fn test_create_clients() {
        let config = load_configuration(CONFIG.to_string(), &[]).unwrap();
        let gateway = create_gateway(&config).unwrap();
        assert_eq!(gateway.rollup_type_tag(), "0x1::rollup::Rollup");
        assert!(create_executor_client(&config).is_ok());
    }
}
