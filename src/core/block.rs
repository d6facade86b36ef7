//! Block implementation for the ledger
//!
//! A block binds an opaque JSON payload to its position in the chain through
//! the hash of its predecessor.

use crate::crypto::{meets_difficulty, sha256_hex};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Previous-hash sentinel carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Payload marker stored in the genesis block
pub const GENESIS_DATA: &str = "Genesis Block";

/// A block in the ledger.
///
/// Serialized with camelCase keys, which is also the snapshot format:
/// `timestamp`, `data`, `previousHash`, `hash`, `nonce`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Caller-supplied payload, never interpreted by the ledger
    pub data: Value,
    /// Hash of the previous block, `"0"` for genesis
    pub previous_hash: String,
    /// Hex SHA-256 over the other four fields
    pub hash: String,
    /// Nonce used for proof of work
    pub nonce: u64,
}

impl Block {
    /// Create a new block (unmined)
    pub fn new(timestamp: i64, data: Value, previous_hash: impl Into<String>) -> Self {
        let mut block = Self {
            timestamp,
            data,
            previous_hash: previous_hash.into(),
            hash: String::new(),
            nonce: 0,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Create a new block stamped with the current time
    pub fn now(data: Value, previous_hash: impl Into<String>) -> Self {
        Self::new(Utc::now().timestamp_millis(), data, previous_hash)
    }

    /// Create the genesis block. It is never mined.
    pub fn genesis() -> Self {
        Self::now(Value::String(GENESIS_DATA.to_string()), GENESIS_PREVIOUS_HASH)
    }

    /// Calculate the hash of the block from its current fields.
    ///
    /// Preimage is `previous_hash ‖ timestamp ‖ json(data) ‖ nonce`, with both
    /// integers in decimal.
    pub fn compute_hash(&self) -> String {
        let preimage = format!(
            "{}{}{}{}",
            self.previous_hash, self.timestamp, self.data, self.nonce
        );
        sha256_hex(preimage.as_bytes())
    }

    /// Mine the block (find a valid nonce).
    ///
    /// Runs until the hash has `difficulty` leading zero hex characters and
    /// returns the number of nonces tried. There is no upper bound; see
    /// [`crate::mining::Miner`] for a cancellable variant.
    pub fn mine(&mut self, difficulty: u32) -> u64 {
        let mut attempts = 0u64;

        while !self.meets_difficulty(difficulty) {
            self.nonce += 1;
            self.hash = self.compute_hash();
            attempts += 1;
        }

        attempts
    }

    /// Check if the stored hash satisfies `difficulty`
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        meets_difficulty(&self.hash, difficulty)
    }

    /// Verify the stored hash against a fresh computation
    pub fn verify_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Whether this block has the genesis shape
    pub fn is_genesis(&self) -> bool {
        self.previous_hash == GENESIS_PREVIOUS_HASH
    }
}
