//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use remasc_core::{ConfigError, Network, RemascConfig};

use crate::sim::SimParams;

/// Simulate a chain and run REMASC on every block.
#[derive(Parser, Debug, Clone)]
#[command(name = "remasc-sim")]
#[command(about = "Deterministic chain simulator for the REMASC fee engine")]
#[command(version)]
pub struct Cli {
    /// Network preset (mainnet, testnet, regtest).
    #[arg(long, default_value = "regtest")]
    pub network: Network,

    /// JSON configuration file; overrides the network preset.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of blocks to mine.
    #[arg(long, default_value_t = 200)]
    pub blocks: u64,

    /// Seed for the chain generator.
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Probability that a block references uncles.
    #[arg(long, default_value_t = 0.25)]
    pub uncle_rate: f64,

    /// Number of federation members.
    #[arg(long, default_value_t = 3)]
    pub federators: usize,

    /// RocksDB directory; state is kept in memory when absent.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Load the configuration file if given, else the network preset.
    pub fn remasc_config(&self) -> Result<RemascConfig, ConfigError> {
        match &self.config {
            Some(path) => RemascConfig::from_json_file(path),
            None => Ok(RemascConfig::for_network(self.network)),
        }
    }

    /// Simulation parameters.
    pub fn params(&self) -> SimParams {
        SimParams {
            blocks: self.blocks,
            seed: self.seed,
            uncle_rate: self.uncle_rate,
            federators: self.federators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cli = Cli::parse_from(["remasc-sim"]);
        assert_eq!(cli.network, Network::Regtest);
        assert_eq!(cli.blocks, 200);
        assert_eq!(cli.federators, 3);
        assert!(cli.data_dir.is_none());
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.remasc_config().unwrap(), RemascConfig::regtest());
    }

    #[test]
    fn test_network_flag() {
        let cli = Cli::parse_from(["remasc-sim", "--network", "testnet", "--seed", "9"]);
        assert_eq!(cli.network, Network::Testnet);
        assert_eq!(cli.params().seed, 9);
        assert!(Cli::try_parse_from(["remasc-sim", "--network", "moon"]).is_err());
    }

    #[test]
    fn test_config_file_overrides_network() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("remasc.json");
        let custom = RemascConfig {
            maturity: 12,
            ..RemascConfig::regtest()
        };
        std::fs::write(&path, custom.to_json_pretty().unwrap()).unwrap();

        let cli = Cli::parse_from(["remasc-sim", "--network", "mainnet", "--config", path.to_str().unwrap()]);
        assert_eq!(cli.remasc_config().unwrap().maturity, 12);
    }
}
