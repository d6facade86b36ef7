//! Blockchain implementation
//!
//! The in-memory chain of blocks: genesis handling, tip access, guarded
//! appends and recomputation-based validation.

use crate::core::block::Block;
use serde_json::Value;
use thiserror::Error;

/// Default mining difficulty (number of leading zero hex characters)
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Largest meaningful difficulty: every character of a SHA-256 hex digest
pub const MAX_DIFFICULTY: u32 = 64;

/// Chain validation errors. Indices point at the first offending block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Chain has no blocks")]
    EmptyChain,
    #[error("Invalid genesis block")]
    InvalidGenesis,
    #[error("Broken link at block {index}: previous hash does not match")]
    BrokenLink { index: usize },
    #[error("Hash mismatch at block {index}: stored hash is not the computed hash")]
    HashMismatch { index: usize },
    #[error("Insufficient work at block {index}: fewer than {difficulty} leading zeros")]
    InsufficientWork { index: usize, difficulty: u32 },
}

impl ChainError {
    /// Index of the first invalid block
    pub fn index(&self) -> usize {
        match self {
            ChainError::EmptyChain | ChainError::InvalidGenesis => 0,
            ChainError::BrokenLink { index }
            | ChainError::HashMismatch { index }
            | ChainError::InsufficientWork { index, .. } => *index,
        }
    }
}

/// The main blockchain structure
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks, never empty
    blocks: Vec<Block>,
    /// Mining difficulty, fixed at construction
    difficulty: u32,
}

impl Blockchain {
    /// Create a blockchain holding only a fresh genesis block
    pub fn new(difficulty: u32) -> Self {
        Self {
            blocks: vec![Block::genesis()],
            difficulty: difficulty.min(MAX_DIFFICULTY),
        }
    }

    /// Adopt an existing block sequence as-is.
    ///
    /// Stored hashes and nonces are trusted; call [`Blockchain::validate`] to
    /// check them.
    pub fn from_blocks(blocks: Vec<Block>, difficulty: u32) -> Result<Self, ChainError> {
        if blocks.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        Ok(Self {
            blocks,
            difficulty: difficulty.min(MAX_DIFFICULTY),
        })
    }

    /// Get the latest block
    pub fn latest_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("Blockchain should have at least genesis block")
    }

    /// Get a block by index
    pub fn get_block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// All blocks in chain order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks including genesis
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Build the next (unmined) block on top of the current tip
    pub fn next_block(&self, data: Value) -> Block {
        Block::now(data, self.latest_block().hash.clone())
    }

    /// Append a mined block after checking it against the tip
    pub fn push(&mut self, block: Block) -> Result<(), ChainError> {
        let index = self.blocks.len();

        if block.previous_hash != self.latest_block().hash {
            return Err(ChainError::BrokenLink { index });
        }
        if !block.verify_hash() {
            return Err(ChainError::HashMismatch { index });
        }
        if !block.meets_difficulty(self.difficulty) {
            return Err(ChainError::InsufficientWork {
                index,
                difficulty: self.difficulty,
            });
        }

        self.blocks.push(block);
        Ok(())
    }

    /// Remove the tip again. Genesis is never removed.
    pub(crate) fn pop(&mut self) -> Option<Block> {
        if self.blocks.len() > 1 {
            self.blocks.pop()
        } else {
            None
        }
    }

    #[cfg(test)]
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    /// Validate the entire chain, reporting the first invalid block.
    ///
    /// Every block's hash is recomputed. Non-genesis blocks must also link to
    /// their predecessor and meet the difficulty.
    pub fn validate(&self) -> Result<(), ChainError> {
        let genesis = self.blocks.first().ok_or(ChainError::EmptyChain)?;
        if !genesis.is_genesis() || !genesis.verify_hash() {
            return Err(ChainError::InvalidGenesis);
        }

        for (index, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = index + 1;

            // Check previous hash link
            if current.previous_hash != previous.hash {
                return Err(ChainError::BrokenLink { index });
            }

            // Verify block hash
            if !current.verify_hash() {
                return Err(ChainError::HashMismatch { index });
            }

            // Check proof of work
            if !current.meets_difficulty(self.difficulty) {
                return Err(ChainError::InsufficientWork {
                    index,
                    difficulty: self.difficulty,
                });
            }
        }

        Ok(())
    }

    /// Validate the entire chain
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get chain statistics
    pub fn stats(&self) -> ChainStats {
        let latest = self.latest_block();
        ChainStats {
            total_blocks: self.blocks.len(),
            difficulty: self.difficulty,
            latest_hash: latest.hash.clone(),
            latest_timestamp: latest.timestamp,
        }
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

/// Chain statistics
#[derive(Debug, Clone)]
pub struct ChainStats {
    pub total_blocks: usize,
    pub difficulty: u32,
    pub latest_hash: String,
    pub latest_timestamp: i64,
}
