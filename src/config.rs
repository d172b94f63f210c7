use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::engine::config::EngineConfig;
use crate::protocol::DEFAULT_MAX_FRAME_SIZE;

pub const DEFAULT_CONFIG_FILE: &str = "huffvizd.toml";
pub const HUFFVIZ_PORT: u16 = 24180;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    /// `/metrics` and `/health` endpoint; disabled when absent.
    pub metrics_address: Option<String>,
    pub max_frame_size: usize,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: format!("127.0.0.1:{}", HUFFVIZ_PORT),
            metrics_address: Some(format!("127.0.0.1:{}", HUFFVIZ_PORT + 1)),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load the config file, or fall back to defaults when it does not exist.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config_file = config_path.unwrap_or(DEFAULT_CONFIG_FILE);

        if std::path::Path::new(config_file).exists() {
            let content = std::fs::read_to_string(config_file)?;
            let config: ServerConfig = toml::from_str(&content)?;
            tracing::debug!("Loaded configuration from {}", config_file);
            Ok(config)
        } else {
            tracing::debug!("No configuration at {}, using defaults", config_file);
            Ok(Self::default())
        }
    }

    pub fn save(&self, config_path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }
}
