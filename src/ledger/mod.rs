//! The persistent ledger
//!
//! [`Ledger`] owns a [`Blockchain`], the [`Storage`] it is snapshotted to and
//! the [`Miner`] that seals new blocks. Callers hold it explicitly; there is
//! no process-wide chain. [`SharedLedger`] wraps it for concurrent async use
//! with a single writer.

pub mod shared;

pub use shared::SharedLedger;

use crate::config::LedgerConfig;
use crate::core::{Block, Blockchain, ChainError, ChainStats, MedicalRecord};
use crate::mining::{Miner, MiningError, MiningStats};
use crate::storage::{Storage, StorageError};
use log::{error, info, warn};
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Ledger-level errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Mining error: {0}")]
    Mining(#[from] MiningError),
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Mining worker failed: {0}")]
    Worker(String),
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// An append-only, proof-of-work, snapshot-persisted chain
#[derive(Debug)]
pub struct Ledger {
    chain: Blockchain,
    storage: Storage,
    miner: Miner,
}

impl Ledger {
    /// Create the ledger and restore any persisted snapshot.
    ///
    /// A fresh genesis block is built first. A readable, non-empty snapshot
    /// then replaces the whole chain. An unreadable snapshot is logged and
    /// the genesis-only chain is kept. Opening never fails; storage problems
    /// surface on the first write.
    pub fn open(config: LedgerConfig) -> Self {
        let mut ledger = Self {
            chain: Blockchain::new(config.effective_difficulty()),
            storage: Storage::new(config.storage.clone()),
            miner: config.miner(),
        };
        ledger.restore();
        ledger
    }

    fn restore(&mut self) {
        match self.storage.load() {
            Ok(Some(blocks)) => match Blockchain::from_blocks(blocks, self.chain.difficulty()) {
                Ok(chain) => {
                    info!(
                        "Loaded {} blocks from {:?}",
                        chain.len(),
                        self.storage.chain_path()
                    );
                    self.chain = chain;
                }
                Err(e) => error!("Error loading chain: {}", e),
            },
            Ok(None) => warn!(
                "No snapshot at {:?}, starting from genesis",
                self.storage.chain_path()
            ),
            Err(e) => error!("Error loading chain: {}", e),
        }
    }

    /// Get the latest block
    pub fn latest_block(&self) -> &Block {
        self.chain.latest_block()
    }

    /// Get a block by index
    pub fn get_block(&self, index: usize) -> Option<&Block> {
        self.chain.get_block(index)
    }

    pub fn blocks(&self) -> &[Block] {
        self.chain.blocks()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.chain.difficulty()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn miner(&self) -> &Miner {
        &self.miner
    }

    pub fn stats(&self) -> ChainStats {
        self.chain.stats()
    }

    /// Mine `data` onto the tip, append it and persist the chain
    pub fn add_block(&mut self, data: Value) -> Result<Block> {
        let (block, _) = self.add_block_with(data, &CancellationToken::new())?;
        Ok(block)
    }

    /// Like [`Ledger::add_block`], but cancellable and with mining stats
    pub fn add_block_with(
        &mut self,
        data: Value,
        cancel: &CancellationToken,
    ) -> Result<(Block, MiningStats)> {
        let previous_hash = self.latest_block().hash.clone();
        let (block, stats) = self
            .miner
            .mine_block_detached(previous_hash, data, cancel)?;
        self.append_mined(block.clone())?;
        Ok((block, stats))
    }

    /// Append a medical record as a new block
    pub fn add_record(&mut self, record: &MedicalRecord) -> Result<Block> {
        self.add_block(record.to_payload()?)
    }

    /// Append an already mined block and persist.
    ///
    /// If the snapshot cannot be written the block is dropped again, so
    /// memory never runs ahead of storage.
    pub(crate) fn append_mined(&mut self, block: Block) -> Result<()> {
        self.chain.push(block)?;

        if let Err(e) = self.storage.save(self.chain.blocks()) {
            self.chain.pop();
            return Err(e.into());
        }

        Ok(())
    }

    /// Write the current chain to storage
    pub fn save(&self) -> Result<()> {
        self.storage.save(self.chain.blocks())?;
        Ok(())
    }

    /// Replace the whole chain with `blocks` after validating them, then persist
    pub fn replace_chain(&mut self, blocks: Vec<Block>) -> Result<()> {
        let chain = Blockchain::from_blocks(blocks, self.chain.difficulty())?;
        chain.validate()?;
        self.storage.save(chain.blocks())?;
        self.chain = chain;
        Ok(())
    }

    /// Validate the chain, reporting the first invalid block
    pub fn validate(&self) -> std::result::Result<(), ChainError> {
        self.chain.validate()
    }

    /// Validate the chain
    pub fn is_valid(&self) -> bool {
        self.chain.is_valid()
    }

    /// Hand the ledger over to an async single-writer handle
    pub fn into_shared(self) -> SharedLedger {
        SharedLedger::new(self)
    }

    #[cfg(test)]
    pub(crate) fn chain_mut(&mut self) -> &mut Blockchain {
        &mut self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageConfig;
    use serde_json::json;
    use std::fs;

    fn config_in(dir: &std::path::Path) -> LedgerConfig {
        LedgerConfig {
            difficulty: 2,
            max_mining_attempts: None,
            storage: StorageConfig {
                data_dir: dir.to_path_buf(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_fresh_ledger_is_genesis_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(config_in(temp_dir.path()));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.latest_block().previous_hash, "0");
        assert!(ledger.is_valid());
        // Opening alone does not write a snapshot
        assert!(!ledger.storage().exists());
    }

    #[test]
    fn test_two_blocks_at_difficulty_two() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::open(config_in(temp_dir.path()));

        let a = ledger.add_block(json!({"msg": "a"})).unwrap();
        let b = ledger.add_block(json!({"msg": "b"})).unwrap();

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.get_block(2).unwrap().previous_hash, ledger.get_block(1).unwrap().hash);
        assert!(a.hash.starts_with("00"));
        assert!(b.hash.starts_with("00"));
        assert_eq!(ledger.latest_block(), &b);
        assert!(ledger.is_valid());
    }

    #[test]
    fn test_reopen_restores_chain() {
        let temp_dir = tempfile::tempdir().unwrap();
        let before = {
            let mut ledger = Ledger::open(config_in(temp_dir.path()));
            ledger.add_block(json!({"msg": "a"})).unwrap();
            ledger.add_block(json!({"msg": "b"})).unwrap();
            ledger.blocks().to_vec()
        };

        let ledger = Ledger::open(config_in(temp_dir.path()));
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.blocks(), before.as_slice());
        assert!(ledger.is_valid());
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_genesis() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let mut ledger = Ledger::open(config_in(temp_dir.path()));
            ledger.add_block(json!({"msg": "a"})).unwrap();
        }
        let path = temp_dir.path().join("chain.json");
        fs::write(&path, "[{ this is not json").unwrap();

        let ledger = Ledger::open(config_in(temp_dir.path()));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.latest_block().previous_hash, "0");
    }

    #[test]
    fn test_loaded_chain_is_trusted_not_verified() {
        let temp_dir = tempfile::tempdir().unwrap();
        let snapshot = r#"[{
            "timestamp": 1700000000000,
            "data": "Genesis Block",
            "previousHash": "0",
            "hash": "deadbeef",
            "nonce": 0
        }]"#;
        fs::write(temp_dir.path().join("chain.json"), snapshot).unwrap();

        let ledger = Ledger::open(config_in(temp_dir.path()));
        assert_eq!(ledger.latest_block().hash, "deadbeef");
        assert_eq!(ledger.validate(), Err(ChainError::InvalidGenesis));
    }

    #[test]
    fn test_tamper_detection() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::open(config_in(temp_dir.path()));
        ledger.add_block(json!({"msg": "a"})).unwrap();
        ledger.add_block(json!({"msg": "b"})).unwrap();
        assert!(ledger.is_valid());

        ledger.chain_mut().blocks_mut()[1].data = json!({"msg": "forged"});
        assert!(!ledger.is_valid());
        assert_eq!(ledger.validate().unwrap_err().index(), 1);
    }

    #[test]
    fn test_write_failure_keeps_chain_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().join("ledger");
        let mut ledger = Ledger::open(config_in(&data_dir));
        ledger.add_block(json!({"msg": "a"})).unwrap();

        fs::remove_dir_all(&data_dir).unwrap();

        let result = ledger.add_block(json!({"msg": "lost"}));
        assert!(matches!(result, Err(LedgerError::Storage(_))));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_bounded_mining_appends_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig {
            difficulty: 64,
            max_mining_attempts: Some(50),
            ..config_in(temp_dir.path())
        };
        let mut ledger = Ledger::open(config);

        let result = ledger.add_block(json!("too hard"));
        assert!(matches!(
            result,
            Err(LedgerError::Mining(MiningError::AttemptsExhausted { attempts: 50 }))
        ));
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.storage().exists());
    }

    #[test]
    fn test_cancelled_mining_appends_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig {
            difficulty: 64,
            ..config_in(temp_dir.path())
        };
        let mut ledger = Ledger::open(config);
        let token = CancellationToken::new();
        token.cancel();

        let result = ledger.add_block_with(json!("stop"), &token);
        assert!(matches!(
            result,
            Err(LedgerError::Mining(MiningError::Cancelled { .. }))
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_add_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::open(config_in(temp_dir.path()));
        let record = MedicalRecord::new("P-100", "Migraine", "Ibuprofen").with_notes("Hydrate");

        let block = ledger.add_record(&record).unwrap();
        assert_eq!(MedicalRecord::from_block(&block), Some(record));
    }

    #[test]
    fn test_replace_chain_rejects_invalid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::open(config_in(temp_dir.path()));
        ledger.add_block(json!({"msg": "a"})).unwrap();

        let mut forged = ledger.blocks().to_vec();
        forged[1].data = json!({"msg": "forged"});

        assert!(matches!(
            ledger.replace_chain(forged),
            Err(LedgerError::Chain(ChainError::HashMismatch { index: 1 }))
        ));
        assert_eq!(ledger.get_block(1).unwrap().data, json!({"msg": "a"}));
    }

    #[test]
    fn test_replace_chain_persists() {
        let source_dir = tempfile::tempdir().unwrap();
        let mut source = Ledger::open(config_in(source_dir.path()));
        source.add_block(json!({"msg": "a"})).unwrap();

        let target_dir = tempfile::tempdir().unwrap();
        let mut target = Ledger::open(config_in(target_dir.path()));
        target.replace_chain(source.blocks().to_vec()).unwrap();

        let reopened = Ledger::open(config_in(target_dir.path()));
        assert_eq!(reopened.blocks(), source.blocks());
    }

    #[test]
    fn test_open_with_unusable_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let not_a_dir = temp_dir.path().join("ledger");
        fs::write(&not_a_dir, "plain file").unwrap();

        let mut ledger = Ledger::open(config_in(&not_a_dir));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.latest_block().previous_hash, "0");

        // The problem shows up on the first write instead
        assert!(matches!(
            ledger.add_block(json!({"msg": "a"})),
            Err(LedgerError::Storage(_))
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_deleted_snapshot_reopens_as_genesis() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let mut ledger = Ledger::open(config_in(temp_dir.path()));
            ledger.add_block(json!({"msg": "a"})).unwrap();
            ledger.storage().delete().unwrap();
        }

        let ledger = Ledger::open(config_in(temp_dir.path()));
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.storage().exists());
    }

    #[tokio::test]
    async fn test_into_shared_keeps_chain() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::open(config_in(temp_dir.path()));
        ledger.add_block(json!({"msg": "a"})).unwrap();
        let before = ledger.blocks().to_vec();

        let shared = ledger.into_shared();
        assert_eq!(shared.blocks().await, before);

        shared
            .add_block(json!({"msg": "b"}), CancellationToken::new())
            .await
            .unwrap();
        let reopened = Ledger::open(config_in(temp_dir.path()));
        assert_eq!(reopened.len(), 3);
        assert_eq!(&reopened.blocks()[..2], before.as_slice());
    }
}
