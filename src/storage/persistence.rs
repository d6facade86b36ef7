//! Ledger persistence layer
//!
//! The whole chain is written as one JSON array snapshot on every save;
//! there is no incremental log.

use crate::core::Block;
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub chain_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".ledger_data"),
            chain_file: "chain.json".to_string(),
        }
    }
}

/// Snapshot storage for a block sequence
#[derive(Debug)]
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager.
    ///
    /// Touches nothing on disk; the data directory is created on first save.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Path of the snapshot file
    pub fn chain_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.chain_file)
    }

    fn temp_path(&self) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.tmp", self.config.chain_file))
    }

    /// Save the full block sequence, replacing any previous snapshot
    pub fn save(&self, blocks: &[Block]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.config.data_dir)?;

        // Write to temporary file first, then atomic rename
        let temp_path = self.temp_path();
        let result = write_snapshot(blocks, &temp_path)
            .and_then(|()| fs::rename(&temp_path, self.chain_path()).map_err(StorageError::from));

        if result.is_err() && temp_path.exists() {
            // Best effort; the original error is what gets reported
            let _ = fs::remove_file(&temp_path);
        }

        result
    }

    /// Load the persisted block sequence.
    ///
    /// Returns `Ok(None)` when there is no snapshot or it holds no blocks.
    /// Hashes and nonces come back exactly as stored.
    pub fn load(&self) -> Result<Option<Vec<Block>>, StorageError> {
        let path = self.chain_path();

        if !path.exists() {
            return Ok(None);
        }

        let blocks = load_from_file(&path)?;
        Ok(if blocks.is_empty() { None } else { Some(blocks) })
    }

    /// Check if a saved snapshot exists
    pub fn exists(&self) -> bool {
        self.chain_path().exists()
    }

    /// Delete the saved snapshot
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.chain_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.chain_path();

        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        Ok(StorageStats {
            file_size,
            chain_path: path,
        })
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub chain_path: PathBuf,
}

fn write_snapshot(blocks: &[Block], path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, blocks)?;
    writer.flush()?;
    Ok(())
}

/// Save a block sequence to a specific file path
pub fn save_to_file(blocks: &[Block], path: &Path) -> Result<(), StorageError> {
    write_snapshot(blocks, path)
}

/// Load a block sequence from a specific file path
pub fn load_from_file(path: &Path) -> Result<Vec<Block>, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let blocks: Vec<Block> = serde_json::from_reader(reader)?;
    Ok(blocks)
}
