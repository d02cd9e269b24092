use std::env;
use std::net::SocketAddr;

use anyhow::Context as _;
use config::{Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub bind: SocketAddr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClashConfig {
    pub base_url: String,
    /// Falls back to `CR_API_KEY` when unset.
    #[serde(default)]
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Ranking size used when a form does not supply one.
    pub default_limit: u32,
}

impl ClashConfig {
    /// The configured API token, ignoring blank values.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub level: String,
    pub api: ApiConfig,
    pub clash: ClashConfig,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let environment = env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let config_file = match environment.as_str() {
            "production" => "prod",
            _ => "dev",
        };

        let mut config: Self = config::Config::builder()
            .set_default("level", "info")?
            .set_default("api.bind", "0.0.0.0:8080")?
            .set_default("clash.base_url", "https://api.clashroyale.com/v1")?
            .set_default("clash.timeout_secs", 15_i64)?
            .set_default("clash.user_agent", "MyClashApp/2.0")?
            .set_default("clash.default_limit", 10_i64)?
            .add_source(File::with_name("config/default.yaml").required(false))
            .add_source(File::with_name(&format!("config/{config_file}.yaml")).required(false))
            .add_source(File::with_name("config/local.yaml").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()
            .context("building config")?
            .try_deserialize()
            .context("deserializing config")?;

        if config.clash.token().is_none() {
            config.clash.token = env::var("CR_API_KEY").ok();
        }

        Ok(config)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(token: Option<&str>) -> Self {
        Self {
            level: "debug".into(),
            api: ApiConfig {
                bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            },
            clash: ClashConfig {
                base_url: "http://127.0.0.1:9/v1".into(),
                token: token.map(Into::into),
                timeout_secs: 15,
                user_agent: "MyClashApp/2.0".into(),
                default_limit: 10,
            },
        }
    }
}
