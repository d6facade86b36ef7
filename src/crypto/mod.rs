//! Cryptographic utilities for the ledger
//!
//! This module provides SHA-256 hashing and the hex-prefix difficulty check
//! used by proof of work.

pub mod hash;

pub use hash::{leading_hex_zeros, meets_difficulty, sha256, sha256_hex, HASH_HEX_LEN};
