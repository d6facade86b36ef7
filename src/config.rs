//! Ledger configuration

use crate::core::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::mining::Miner;
use crate::storage::StorageConfig;

/// Settings fixed for the lifetime of a ledger
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Required leading zero hex characters per mined block
    pub difficulty: u32,
    /// Give up mining after this many nonces, unbounded when `None`
    pub max_mining_attempts: Option<u64>,
    /// Where the snapshot lives
    pub storage: StorageConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_mining_attempts: None,
            storage: StorageConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Difficulty actually enforced: the configured value capped at the
    /// length of a hex digest
    pub fn effective_difficulty(&self) -> u32 {
        self.difficulty.min(MAX_DIFFICULTY)
    }

    /// Miner matching this configuration
    pub fn miner(&self) -> Miner {
        Miner::new(self.effective_difficulty()).with_max_attempts(self.max_mining_attempts)
    }
}
