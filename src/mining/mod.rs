//! Mining module for proof-of-work block sealing

pub mod miner;

pub use miner::{Miner, MiningError, MiningStats, CANCEL_CHECK_INTERVAL};
