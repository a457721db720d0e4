//! Per-network REMASC configuration.
//!
//! The parameters are consensus constants: every node on a network must use
//! the same values. Presets exist for mainnet, testnet and regtest; any of
//! them can be replaced by a JSON document for experiments.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{hex_address, Address};

/// Networks with a built-in preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    Mainnet,
    /// Public test network.
    Testnet,
    /// Local development network.
    Regtest,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Regtest => write!(f, "regtest"),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(ConfigError::Parse(format!("unknown network: {}", other))),
        }
    }
}

/// Block numbers at which consensus upgrades touching REMASC take effect.
///
/// `None` means the upgrade never activates on this network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationHeights {
    /// From this block on, payouts below a gas-cost floor are deferred.
    pub gas_floor: Option<u64>,
    /// From this block on, the treasury cut goes to the alternate address.
    pub alt_treasury: Option<u64>,
}

impl ActivationHeights {
    /// Every upgrade active from genesis.
    pub const ALL_FROM_GENESIS: Self = Self {
        gas_floor: Some(0),
        alt_treasury: Some(0),
    };

    /// Whether the gas-floor gate applies to a block.
    pub fn gas_floor_active(&self, block_number: u64) -> bool {
        self.gas_floor.is_some_and(|height| block_number >= height)
    }

    /// Whether the alternate treasury address applies to a block.
    pub fn alt_treasury_active(&self, block_number: u64) -> bool {
        self.alt_treasury.is_some_and(|height| block_number >= height)
    }
}

/// REMASC consensus parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemascConfig {
    /// Blocks that must elapse before a block's fees are processed.
    pub maturity: u64,
    /// Blocks over which the reward pool is amortized.
    pub synthetic_span: u64,
    /// How many generations after a block its uncles may still be referenced.
    pub uncle_generation_limit: u64,
    /// Share of a payout reserved for publishers of siblings (1/n).
    pub publishers_divisor: u64,
    /// Treasury cut of each payout (1/n).
    pub rsk_labs_divisor: u64,
    /// Federation cut of each payout after the treasury cut (1/n).
    pub federation_divisor: u64,
    /// Punishment for a broken selection rule (1/n of a miner share).
    pub punishment_divisor: u64,
    /// Per-block-late punishment for siblings (1/n of a miner share per block).
    pub late_uncle_inclusion_punishment_divisor: u64,
    /// Gas units a payout must be worth before it is released.
    pub minimum_payable_gas: u64,
    /// Gas units each federator share must be worth before it is paid.
    pub federator_minimum_payable_gas: u64,
    /// Treasury address before the alternate treasury activates.
    #[serde(with = "hex_address")]
    pub rsk_labs_address: Address,
    /// Treasury address once the alternate treasury activates.
    #[serde(with = "hex_address")]
    pub rsk_labs_address_alt: Address,
    /// Upgrade activation heights.
    #[serde(default)]
    pub activations: ActivationHeights,
}

const TREASURY: Address = [
    0x14, 0xd3, 0x06, 0x5c, 0x8e, 0xb8, 0x98, 0x95, 0xf4, 0xdf, 0x12, 0x45, 0x0e, 0xc6, 0xb1, 0x30, 0x04, 0x9f,
    0x80, 0x34,
];

const TREASURY_ALT: Address = [
    0xdc, 0xb1, 0x21, 0x79, 0xba, 0x46, 0x97, 0x35, 0x0f, 0x66, 0x22, 0x4c, 0x95, 0x9b, 0xdd, 0x9c, 0x28, 0x28,
    0x18, 0xdf,
];

impl RemascConfig {
    /// Preset for a network.
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    /// Mainnet preset.
    pub fn mainnet() -> Self {
        Self {
            maturity: 4000,
            synthetic_span: 2000,
            uncle_generation_limit: 7,
            publishers_divisor: 10,
            rsk_labs_divisor: 5,
            federation_divisor: 100,
            punishment_divisor: 10,
            late_uncle_inclusion_punishment_divisor: 10,
            minimum_payable_gas: 21_000,
            federator_minimum_payable_gas: 21_000,
            rsk_labs_address: TREASURY,
            rsk_labs_address_alt: TREASURY_ALT,
            activations: ActivationHeights {
                gas_floor: Some(729_000),
                alt_treasury: Some(3_589_500),
            },
        }
    }

    /// Testnet preset.
    pub fn testnet() -> Self {
        Self {
            maturity: 60,
            synthetic_span: 20,
            activations: ActivationHeights {
                gas_floor: Some(0),
                alt_treasury: Some(1_576_000),
            },
            ..Self::mainnet()
        }
    }

    /// Regtest preset.
    pub fn regtest() -> Self {
        Self {
            maturity: 10,
            synthetic_span: 20,
            minimum_payable_gas: 0,
            federator_minimum_payable_gas: 0,
            activations: ActivationHeights::ALL_FROM_GENESIS,
            ..Self::mainnet()
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Render as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject parameter sets the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("maturity", self.maturity),
            ("synthetic_span", self.synthetic_span),
            ("publishers_divisor", self.publishers_divisor),
            ("rsk_labs_divisor", self.rsk_labs_divisor),
            ("federation_divisor", self.federation_divisor),
            ("punishment_divisor", self.punishment_divisor),
            (
                "late_uncle_inclusion_punishment_divisor",
                self.late_uncle_inclusion_punishment_divisor,
            ),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::ZeroParameter { field });
            }
        }
        // The ancestor walk starts `maturity - 1 - uncle_generation_limit` blocks back.
        if self.maturity <= self.uncle_generation_limit {
            return Err(ConfigError::MaturityTooSmall {
                maturity: self.maturity,
                uncle_generation_limit: self.uncle_generation_limit,
            });
        }
        // A sibling can be published up to `uncle_generation_limit - 1` blocks
        // late; its penalty must never exceed the miner share it is cut from.
        let max_blocks_late = self.uncle_generation_limit.saturating_sub(1);
        if max_blocks_late > self.late_uncle_inclusion_punishment_divisor {
            return Err(ConfigError::LatePenaltyExceedsShare {
                uncle_generation_limit: self.uncle_generation_limit,
                late_uncle_inclusion_punishment_divisor: self.late_uncle_inclusion_punishment_divisor,
            });
        }
        Ok(())
    }

    /// Treasury address in effect for a block.
    pub fn treasury_address(&self, block_number: u64) -> Address {
        if self.activations.alt_treasury_active(block_number) {
            self.rsk_labs_address_alt
        } else {
            self.rsk_labs_address
        }
    }

    /// Whether the gas-floor gate applies to a block.
    pub fn gas_floor_active(&self, block_number: u64) -> bool {
        self.activations.gas_floor_active(block_number)
    }
}

impl Default for RemascConfig {
    fn default() -> Self {
        Self::regtest()
    }
}
