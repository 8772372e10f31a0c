//! Configuration management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use bench_engine::{PriorityLevel, DEFAULT_ITERATIONS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Well-known path the client connects to.
    pub socket_path: PathBuf,
    /// Iterations per measurement phase.
    pub iterations: u64,
    /// Nice value the write phase raises to.
    pub elevated_nice: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/run/priobench.sock"),
            iterations: DEFAULT_ITERATIONS,
            elevated_nice: PriorityLevel::ELEVATED.nice(),
        }
    }
}

impl ServerConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
