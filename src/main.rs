//! Record Ledger CLI Application
//!
//! A command-line interface for the proof-of-work record ledger.

use clap::{Parser, Subcommand};
use record_ledger::cli;
use record_ledger::config::LedgerConfig;
use record_ledger::core::{MedicalRecord, DEFAULT_DIFFICULTY, DEFAULT_DOCTOR};
use record_ledger::ledger::Ledger;
use record_ledger::storage::StorageConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "record-ledger")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A hash-chained proof-of-work ledger for medical records", long_about = None)]
struct Cli {
    /// Data directory for the chain snapshot
    #[arg(short, long, default_value = ".ledger_data")]
    data_dir: PathBuf,

    /// Snapshot file name inside the data directory
    #[arg(long, default_value = "chain.json")]
    file: String,

    /// Mining difficulty (number of leading zero hex characters)
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: u32,

    /// Give up mining after this many attempts
    #[arg(long)]
    max_attempts: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a genesis-only snapshot
    Init,

    /// Mine a block holding an arbitrary JSON payload
    Add {
        /// JSON payload
        #[arg(long)]
        data: String,
    },

    /// Mine a block holding a medical record
    Record {
        #[arg(short, long)]
        patient_id: String,

        #[arg(long, default_value = DEFAULT_DOCTOR)]
        doctor: String,

        #[arg(long)]
        diagnosis: String,

        #[arg(short, long)]
        treatment: String,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Display chain information
    Chain {
        #[command(subcommand)]
        action: Option<ChainCommands>,
    },

    /// List the records of a patient
    Records {
        #[arg(short, long)]
        patient_id: String,
    },

    /// Validate the chain
    Validate,

    /// Export the chain to a file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a chain from a file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Subcommand)]
enum ChainCommands {
    /// Show detailed info
    Info,

    /// List recent blocks
    Blocks {
        /// Number of blocks to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = LedgerConfig {
        difficulty: cli.difficulty,
        max_mining_attempts: cli.max_attempts,
        storage: StorageConfig {
            data_dir: cli.data_dir.clone(),
            chain_file: cli.file.clone(),
        },
    };

    match cli.command {
        Commands::Init => cli::cmd_init(&config)?,

        // Mining commands run on their own runtime
        Commands::Add { data } => cli::cmd_add(&config, &data)?,
        Commands::Record {
            patient_id,
            doctor,
            diagnosis,
            treatment,
            notes,
        } => {
            let mut record =
                MedicalRecord::new(patient_id, diagnosis, treatment).with_doctor(doctor);
            record.notes = notes;
            cli::cmd_record(&config, &record)?;
        }

        Commands::Chain { action } => {
            let ledger = Ledger::open(config);
            match action {
                None | Some(ChainCommands::Info) => cli::cmd_chain_info(&ledger)?,
                Some(ChainCommands::Blocks { count }) => cli::cmd_chain_blocks(&ledger, count)?,
            }
        }

        Commands::Records { patient_id } => {
            cli::cmd_records(&Ledger::open(config), &patient_id)?;
        }

        Commands::Validate => cli::cmd_validate(&Ledger::open(config))?,

        Commands::Export { output } => cli::cmd_export(&Ledger::open(config), &output)?,

        Commands::Import { input } => {
            let mut ledger = Ledger::open(config);
            cli::cmd_import(&mut ledger, &input)?;
        }
    }

    Ok(())
}
