use crate::config::Config;
use crate::sanity::SanityClient;
use reqwest::Client;
use tracing::{debug, info};

pub struct AppState {
    pub sanity: SanityClient,
}

impl AppState {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let timeout = std::time::Duration::from_secs(cfg.timeout_secs.unwrap_or(30));
        let mut builder = Client::builder().timeout(timeout);
        if let Some(secs) = cfg.connect_timeout_secs {
            builder = builder.connect_timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build()?;
        debug!("HTTP client created with timeout: {:?}", timeout);

        let sanity = SanityClient::from_config(cfg, client)?;
        info!(
            "Querying project '{}' dataset '{}' at {}",
            cfg.project_id,
            cfg.dataset,
            sanity.endpoint()
        );

        Ok(AppState { sanity })
    }
}
