//! Mining engine for the ledger
//!
//! Wraps the proof-of-work search with an optional attempt bound and a
//! cancellation token, and reports timing statistics.

use crate::core::Block;
use log::info;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// How many nonces are tried between cancellation checks
pub const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// Reasons a mining run stops without a valid hash
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MiningError {
    #[error("Mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },
    #[error("Mining gave up after {attempts} attempts")]
    AttemptsExhausted { attempts: u64 },
}

/// Mining statistics
#[derive(Debug, Clone)]
pub struct MiningStats {
    /// Number of hash attempts
    pub hash_attempts: u64,
    /// Time taken in milliseconds
    pub time_ms: u128,
    /// Hash rate (hashes per second)
    pub hash_rate: f64,
}

/// Miner for sealing new blocks
#[derive(Debug, Clone)]
pub struct Miner {
    /// Required leading zero hex characters
    pub difficulty: u32,
    /// Upper bound on nonces tried, unbounded when `None`
    pub max_attempts: Option<u64>,
}

impl Miner {
    /// Create a new unbounded miner
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Mine `block` in place.
    ///
    /// On error the block keeps whatever nonce was reached and must not be
    /// appended.
    pub fn mine(
        &self,
        block: &mut Block,
        cancel: &CancellationToken,
    ) -> Result<MiningStats, MiningError> {
        let start = Instant::now();
        let mut attempts = 0u64;

        while !block.meets_difficulty(self.difficulty) {
            if attempts % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(MiningError::Cancelled { attempts });
            }
            if self.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(MiningError::AttemptsExhausted { attempts });
            }

            block.nonce += 1;
            block.hash = block.compute_hash();
            attempts += 1;
        }

        let elapsed = start.elapsed().as_millis();
        let hash_rate = if elapsed > 0 {
            (attempts as f64) / (elapsed as f64 / 1000.0)
        } else {
            attempts as f64
        };

        info!(
            "Block mined: {} in {}ms ({} attempts, {:.2} H/s)",
            block.hash, elapsed, attempts, hash_rate
        );

        Ok(MiningStats {
            hash_attempts: attempts,
            time_ms: elapsed,
            hash_rate,
        })
    }

    /// Build and mine a block without touching any chain.
    ///
    /// The caller takes a snapshot of the tip hash, runs this off the async
    /// runtime, and appends the result under its own lock.
    pub fn mine_block_detached(
        &self,
        previous_hash: String,
        data: Value,
        cancel: &CancellationToken,
    ) -> Result<(Block, MiningStats), MiningError> {
        let mut block = Block::now(data, previous_hash);

        info!("Mining block with difficulty {}...", self.difficulty);

        let stats = self.mine(&mut block, cancel)?;
        Ok((block, stats))
    }
}
