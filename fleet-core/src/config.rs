//! Configuration for the fleet core

use crate::capacity::CapacityPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Minimum days between placing an order and its delivery date
pub const MIN_DELIVERY_LEAD_DAYS: i64 = 2;

/// Fleet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Data directory for the record snapshots
    pub data_dir: PathBuf,

    /// Capacity ceilings per vehicle type
    pub capacity: CapacityPolicy,

    /// Minimum delivery lead time in days
    pub min_delivery_lead_days: i64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/fleet"),
            capacity: CapacityPolicy::default(),
            min_delivery_lead_days: MIN_DELIVERY_LEAD_DAYS,
        }
    }
}

impl FleetConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FleetConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Self {
        let mut config = FleetConfig::default();

        if let Ok(data_dir) = std::env::var("FLEET_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        config
    }
}
