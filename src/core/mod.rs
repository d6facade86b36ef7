//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Blocks (hash sealing and proof of work)
//! - Blockchain (genesis, guarded appends, validation)
//! - Medical record payloads

pub mod block;
pub mod blockchain;
pub mod record;

pub use block::{Block, GENESIS_DATA, GENESIS_PREVIOUS_HASH};
pub use blockchain::{Blockchain, ChainError, ChainStats, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
pub use record::{MedicalRecord, DEFAULT_DOCTOR};
