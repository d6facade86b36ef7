//! CLI commands for the ledger
//!
//! Implements all command handlers for the CLI interface.

use crate::config::LedgerConfig;
use crate::core::{Block, MedicalRecord};
use crate::ledger::{Ledger, SharedLedger};
use crate::storage::{load_from_file, save_to_file};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Initialize the snapshot with a genesis-only chain
pub fn cmd_init(config: &LedgerConfig) -> CliResult<()> {
    let ledger = Ledger::open(config.clone());

    if ledger.storage().exists() {
        println!(
            "⚠️  Ledger already exists at {:?}",
            ledger.storage().chain_path()
        );
        return Ok(());
    }

    ledger.save()?;

    println!("✅ Ledger initialized!");
    println!("   📁 Snapshot: {:?}", ledger.storage().chain_path());
    println!("   🔧 Difficulty: {}", ledger.difficulty());
    println!("   🧱 Genesis block hash: {}", ledger.latest_block().hash);

    Ok(())
}

/// Mine an arbitrary JSON payload into a new block
pub fn cmd_add(config: &LedgerConfig, data: &str) -> CliResult<()> {
    let payload: Value = serde_json::from_str(data)?;
    mine_payload(config, payload)
}

/// Mine a medical record into a new block
pub fn cmd_record(config: &LedgerConfig, record: &MedicalRecord) -> CliResult<()> {
    println!("🩺 Recording entry for patient {}", record.patient_id);
    mine_payload(config, record.to_payload()?)
}

/// Mine on the blocking pool; Ctrl+C cancels the search
fn mine_payload(config: &LedgerConfig, payload: Value) -> CliResult<()> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let ledger = SharedLedger::open(config.clone());
        let cancel = CancellationToken::new();

        // Handle Ctrl+C
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("\n📴 Cancelling mining...");
                interrupt.cancel();
            }
        });

        println!("⛏️  Mining at difficulty {}...", config.difficulty);

        let (block, stats) = ledger.add_block(payload, cancel).await?;
        let height = ledger.len().await - 1;

        println!("\n   Block {} mined!", height);
        println!("   ├─ Hash: {}", block.hash);
        println!("   ├─ Previous: {}", block.previous_hash);
        println!("   ├─ Nonce: {}", block.nonce);
        println!("   ├─ Time: {}ms", stats.time_ms);
        println!("   └─ Hash rate: {:.2} H/s", stats.hash_rate);

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Display ledger info
pub fn cmd_chain_info(ledger: &Ledger) -> CliResult<()> {
    let stats = ledger.stats();
    let storage = ledger.storage().stats()?;

    println!("⛓️  Ledger Info");
    println!("   ├─ Total blocks: {}", stats.total_blocks);
    println!("   ├─ Difficulty: {}", stats.difficulty);
    println!("   ├─ Snapshot: {:?} ({} bytes)", storage.chain_path, storage.file_size);
    println!("   ├─ Latest block: {}", format_millis(stats.latest_timestamp));
    println!("   └─ Latest hash: {}", stats.latest_hash);

    Ok(())
}

/// List recent blocks
pub fn cmd_chain_blocks(ledger: &Ledger, count: usize) -> CliResult<()> {
    let start = ledger.len().saturating_sub(count);

    println!("🧱 Recent blocks:");
    for (index, block) in ledger.blocks().iter().enumerate().skip(start).rev() {
        println!(
            "   #{} | {} | nonce {} | {}",
            index,
            short_hash(&block.hash),
            block.nonce,
            format_millis(block.timestamp)
        );
    }

    Ok(())
}

/// List the records of one patient by scanning the chain
pub fn cmd_records(ledger: &Ledger, patient_id: &str) -> CliResult<()> {
    let records: Vec<(usize, &Block, MedicalRecord)> = ledger
        .blocks()
        .iter()
        .enumerate()
        .filter_map(|(index, block)| {
            MedicalRecord::from_block(block)
                .filter(|r| r.patient_id == patient_id)
                .map(|r| (index, block, r))
        })
        .collect();

    if records.is_empty() {
        println!("📭 No records found for patient {}", patient_id);
        return Ok(());
    }

    println!("📋 Records for patient {}:", patient_id);
    for (index, block, record) in &records {
        println!(
            "   #{} | {} | {} | {} → {}",
            index,
            format_millis(block.timestamp),
            record.doctor,
            record.diagnosis,
            record.treatment
        );
        if let Some(notes) = &record.notes {
            println!("   └─ {}", notes);
        }
    }

    Ok(())
}

/// Validate the ledger
pub fn cmd_validate(ledger: &Ledger) -> CliResult<()> {
    println!("🔍 Validating ledger...");

    match ledger.validate() {
        Ok(()) => {
            println!("✅ Ledger is valid!");
            println!("   {} blocks verified", ledger.len());
        }
        Err(e) => {
            println!("❌ Ledger validation FAILED at block {}!", e.index());
            println!("   {}", e);
        }
    }

    Ok(())
}

/// Export the chain to a file
pub fn cmd_export(ledger: &Ledger, path: &Path) -> CliResult<()> {
    save_to_file(ledger.blocks(), path)?;
    println!("📦 Ledger exported to {:?}", path);
    Ok(())
}

/// Import a chain from a file, replacing the current one
pub fn cmd_import(ledger: &mut Ledger, path: &Path) -> CliResult<()> {
    let blocks = load_from_file(path)?;

    if let Err(e) = ledger.replace_chain(blocks) {
        println!("❌ Imported ledger is invalid: {}", e);
        return Ok(());
    }

    println!("📥 Ledger imported from {:?}", path);
    println!("   Blocks: {}", ledger.len());

    Ok(())
}

fn short_hash(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}

fn format_millis(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}
