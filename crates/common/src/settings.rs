use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub port: u16,
    pub base_path: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            port: 8080,
            base_path: "/api".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_validity_in_minutes: i64,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            jwt_secret: "insecure-development-secret".into(),
            // Matches the mobile clients' 7-day login window.
            token_validity_in_minutes: 7 * 24 * 60,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Logger {
    pub level: String,
}

impl Default for Logger {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Database {
    pub uri: String,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            uri: "postgres://localhost/foodline".into(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config_dir("config")
    }

    pub fn with_config_dir(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
            .add_source(File::with_name(&format!("{config_dir}/{run_mode}")).required(false))
            .add_source(File::with_name(&format!("{config_dir}/local")).required(false))
            .add_source(Environment::default().separator("__"));

        builder.build()?.try_deserialize()
    }
}
