//! Configuration for the migration

use crate::error::{Error, Result};
use ledger_client::{U128, MAX_BATCH};
use serde::{Deserialize, Serialize};

/// Migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cluster history is exported from
    pub source: ClusterConfig,

    /// Cluster history is replayed into
    pub destination: ClusterConfig,

    /// Pagination and batching configuration
    pub batch: BatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: ClusterConfig {
                cluster_id: "0".to_string(),
                addresses: vec!["3000".to_string()],
            },
            destination: ClusterConfig {
                cluster_id: "0".to_string(),
                addresses: vec!["3001".to_string()],
            },
            batch: BatchConfig::default(),
        }
    }
}

/// Addressing for one cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster id (decimal, up to 128 bits)
    pub cluster_id: String,

    /// Replica addresses
    pub addresses: Vec<String>,
}

impl ClusterConfig {
    /// Parse the configured cluster id.
    pub fn id(&self) -> Result<U128> {
        self.cluster_id
            .parse()
            .map_err(|_| Error::Config(format!("invalid cluster id: {}", self.cluster_id)))
    }
}

/// Batch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Records per exported page and per create call
    pub limit: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            limit: MAX_BATCH as u32,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(id) = std::env::var("MIGRATE_SOURCE_CLUSTER") {
            config.source.cluster_id = id;
        }
        if let Ok(addresses) = std::env::var("MIGRATE_SOURCE_ADDRESSES") {
            config.source.addresses = split_addresses(&addresses);
        }
        if let Ok(id) = std::env::var("MIGRATE_DESTINATION_CLUSTER") {
            config.destination.cluster_id = id;
        }
        if let Ok(addresses) = std::env::var("MIGRATE_DESTINATION_ADDRESSES") {
            config.destination.addresses = split_addresses(&addresses);
        }
        if let Ok(limit) = std::env::var("MIGRATE_BATCH_LIMIT") {
            config.batch.limit = limit
                .parse()
                .map_err(|_| Error::Config(format!("invalid batch limit: {}", limit)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the clusters would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if self.batch.limit == 0 || self.batch.limit as usize > MAX_BATCH {
            return Err(Error::Config(format!(
                "batch limit must be between 1 and {}, got {}",
                MAX_BATCH, self.batch.limit
            )));
        }
        for cluster in [&self.source, &self.destination] {
            if cluster.addresses.is_empty() {
                return Err(Error::Config("cluster has no replica addresses".to_string()));
            }
            cluster.id()?;
        }
        Ok(())
    }
}

fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|address| address.trim().to_string())
        .filter(|address| !address.is_empty())
        .collect()
}
