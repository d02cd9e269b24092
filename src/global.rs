use std::sync::Arc;

use crate::clash::HttpConnector;
use crate::config::Config;

pub struct Global {
    pub config: Config,
    pub connector: HttpConnector,
    pub started_at: std::time::Instant,
}

impl Global {
    pub fn init(config: Config) -> Arc<Self> {
        let connector = HttpConnector::new(&config.clash);

        if config.clash.token().is_none() {
            tracing::warn!("no clash api token configured, lookups will fail until CR_API_KEY is set");
        }

        Arc::new(Self {
            config,
            connector,
            started_at: std::time::Instant::now(),
        })
    }
}
