//! Record Ledger: a hash-chained proof-of-work ledger
//!
//! This crate provides:
//! - SHA-256 sealed blocks carrying opaque JSON payloads
//! - Proof of work measured in leading zero hex characters
//! - Recomputation-based chain validation
//! - Full-snapshot JSON persistence
//! - Cancellable, single-writer async appends
//!
//! # Example
//!
//! ```rust,no_run
//! use record_ledger::config::LedgerConfig;
//! use record_ledger::core::MedicalRecord;
//! use record_ledger::ledger::Ledger;
//!
//! // Open (or create) the ledger
//! let mut ledger = Ledger::open(LedgerConfig::default());
//!
//! // Mine a record into a new block
//! let record = MedicalRecord::new("P-001", "Influenza", "Rest");
//! let block = ledger.add_record(&record).unwrap();
//! println!("Mined block {}", block.hash);
//!
//! assert!(ledger.is_valid());
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod ledger;
pub mod mining;
pub mod storage;

// Re-export commonly used types
pub use config::LedgerConfig;
pub use core::{Block, Blockchain, ChainError, MedicalRecord, DEFAULT_DIFFICULTY};
pub use ledger::{Ledger, LedgerError, SharedLedger};
pub use mining::{Miner, MiningError, MiningStats};
pub use storage::{Storage, StorageConfig, StorageError};
