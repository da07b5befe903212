use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::session::SessionConfig;
use crate::providers::ProviderConfig;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "ROUTEGUARD_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: listener, logging, session signing and credential providers.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    pub logging: LoggingConfig,
    pub jwt: JWTConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub providers: Vec<ProviderConfig>,
}

/// Signing parameters for session tokens.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct JWTConfig {
    pub iss: String,
    pub aud: Option<String>,
    /// Token lifetime in seconds.
    pub exp: i64,
    pub secret: String,
}

/// Builds the figment used at startup: the YAML file first, then
/// `ROUTEGUARD_`-prefixed environment variables (`__` separates nested keys).
pub fn config_figment() -> Figment {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed("ROUTEGUARD_").split("__"))
}

/// Extract a versioned config from any figment and unwrap it to the current version.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from the YAML file and environment, exiting on failure.
pub fn load_config() -> ConfigV1 {
    match extract_config(&config_figment()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
