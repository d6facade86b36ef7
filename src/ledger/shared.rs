//! Async handle over a [`Ledger`]
//!
//! Appends are serialized: the lock is held from reading the tip until the
//! mined block is persisted, so two appends can never mine against the same
//! previous hash. The proof-of-work search itself runs on the blocking pool.

use crate::config::LedgerConfig;
use crate::core::{Block, ChainError, ChainStats, MedicalRecord};
use crate::ledger::{Ledger, LedgerError, Result};
use crate::mining::MiningStats;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Cloneable, single-writer ledger handle
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Open a ledger (see [`Ledger::open`]) behind a shared handle
    pub fn open(config: LedgerConfig) -> Self {
        Self::new(Ledger::open(config))
    }

    /// Mine `data` onto the tip and persist it.
    ///
    /// Cancelling `cancel` stops the search and appends nothing. Dropping the
    /// returned future also appends nothing, but the search keeps running on
    /// its worker until it finishes or `cancel` fires.
    pub async fn add_block(
        &self,
        data: Value,
        cancel: CancellationToken,
    ) -> Result<(Block, MiningStats)> {
        let mut ledger = self.inner.lock().await;

        let previous_hash = ledger.latest_block().hash.clone();
        let miner = ledger.miner().clone();

        let (block, stats) = tokio::task::spawn_blocking(move || {
            miner.mine_block_detached(previous_hash, data, &cancel)
        })
        .await
        .map_err(|e| LedgerError::Worker(e.to_string()))??;

        ledger.append_mined(block.clone())?;
        Ok((block, stats))
    }

    /// Append a medical record as a new block
    pub async fn add_record(
        &self,
        record: &MedicalRecord,
        cancel: CancellationToken,
    ) -> Result<(Block, MiningStats)> {
        self.add_block(record.to_payload()?, cancel).await
    }

    pub async fn latest_block(&self) -> Block {
        self.inner.lock().await.latest_block().clone()
    }

    /// Snapshot of all blocks in chain order
    pub async fn blocks(&self) -> Vec<Block> {
        self.inner.lock().await.blocks().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn stats(&self) -> ChainStats {
        self.inner.lock().await.stats()
    }

    pub async fn validate(&self) -> std::result::Result<(), ChainError> {
        self.inner.lock().await.validate()
    }

    pub async fn is_valid(&self) -> bool {
        self.inner.lock().await.is_valid()
    }
}
