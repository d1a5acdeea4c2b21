use config::{Config, ConfigError, Environment, File};
use infrastructure::{HttpServerConfig, MonitoringConfig};
use serde::Deserialize;

use crate::core::reading::{SensorType, TimeFrame};

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub building: BuildingSettings,
    pub defaults: DefaultsSettings,
    pub backend: BackendSettings,
    pub content: ContentSettings,
    pub http_server: HttpServerConfig,
    pub monitoring: MonitoringConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config.toml"))
            .add_source(Environment::default().separator("_").list_separator(","));

        let s = builder.build()?;
        s.try_deserialize()
    }
}

/// The monitored building: its id at the sensor backend and its floors,
/// lowest first.
#[derive(Debug, Deserialize, Clone)]
pub struct BuildingSettings {
    pub id: String,
    pub floors: Vec<FloorSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FloorSettings {
    pub label: String,
    pub asset: String,
}

/// What the dashboard shows before anyone touches it.
#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsSettings {
    pub floor: usize,
    pub sensor: SensorType,
    pub time_frame: TimeFrame,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub bearer_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentSettings {
    pub base_url: String,
}
