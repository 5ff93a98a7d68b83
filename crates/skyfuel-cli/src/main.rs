use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use time::Date;
use tracing_subscriber::EnvFilter;

use skyfuel_store::Store;
use skyfuel_types::{BatteryStatus, BatteryType};

mod commands;
mod config;
mod format;
mod util;

#[derive(Parser)]
#[command(name = "skyfuel")]
#[command(author, version, about = "Drone battery inventory and health tracker", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the battery database (overrides config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a battery to the inventory
    Add {
        /// Manufacturer name
        #[arg(short, long)]
        brand: String,

        /// Model name
        #[arg(short, long)]
        model: String,

        /// Serial number (unique per battery)
        #[arg(short, long)]
        serial: String,

        /// Chemistry (lipo, li-ion, nimh, life, other)
        #[arg(short = 't', long, value_parser = util::parse_battery_type, default_value = "lipo")]
        battery_type: BatteryType,

        /// Cell count
        #[arg(short, long)]
        cells: u8,

        /// Capacity in mAh
        #[arg(long)]
        capacity: u32,

        /// Purchase date (YYYY-MM-DD, defaults to today)
        #[arg(short, long, value_parser = util::parse_date)]
        purchase_date: Option<Date>,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List batteries in the inventory
    List {
        /// Filter by status (charged, discharged, storage, out-of-service)
        #[arg(short, long, value_parser = util::parse_status)]
        status: Option<BatteryStatus>,

        /// Filter by chemistry (lipo, li-ion, nimh, life, other)
        #[arg(short = 't', long, value_parser = util::parse_battery_type)]
        battery_type: Option<BatteryType>,

        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Show one battery with alerts and status history
    Show {
        /// Battery id
        id: i64,

        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Change a battery's status
    SetStatus {
        /// Battery id
        id: i64,

        /// New status (charged, discharged, storage, out-of-service)
        #[arg(value_parser = util::parse_status)]
        status: BatteryStatus,
    },

    /// Report health percentages
    Health {
        /// Battery id (omit for all batteries)
        id: Option<i64>,
    },

    /// Evaluate alert rules across the inventory
    Alerts {
        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Generate and decode QR payloads
    #[command(subcommand)]
    Qr(QrCommand),

    /// Export the inventory to JSON or CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format (json, csv; inferred from file extension when omitted)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Import batteries from JSON or CSV, merging on serial number
    Import {
        /// Input file
        input: PathBuf,

        /// Format (json, csv; inferred from file extension when omitted)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Remove a battery and its status history
    Delete {
        /// Battery id
        id: i64,
    },

    /// Show or update the configuration file
    Config {
        /// Set the default database path
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Set the default output format (text, json)
        #[arg(long)]
        set_format: Option<String>,

        /// Enable or disable colored output (true, false)
        #[arg(long)]
        no_color: Option<bool>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum QrCommand {
    /// Print the identification payload for a battery label
    Encode {
        /// Battery id
        id: i64,
    },

    /// Print the full share payload for transferring a battery
    Share {
        /// Battery id
        id: i64,
    },

    /// Decode a scanned payload
    Decode {
        /// The scanned text
        code: String,

        /// Import the battery when the payload is a complete share
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "skyfuel", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = config::Config::load()?;

    if let Commands::Config {
        db_path,
        set_format,
        no_color,
    } = &cli.command
    {
        if db_path.is_none() && set_format.is_none() && no_color.is_none() {
            print!("{}", toml::to_string_pretty(&config)?);
            return Ok(());
        }
        if let Some(path) = db_path {
            config.db_path = Some(path.clone());
        }
        if let Some(format) = set_format {
            config.format = Some(format.clone());
        }
        if let Some(no_color) = no_color {
            config.no_color = *no_color;
        }
        config.save()?;
        println!("Wrote {}", config::Config::path().display());
        return Ok(());
    }

    let color = !cli.quiet && !config.no_color;
    let output = |flag: Option<String>| {
        flag.or_else(|| config.format.clone())
            .unwrap_or_else(|| "text".to_string())
    };

    let db_path = match cli.db.or_else(|| config.db_path.clone()) {
        Some(path) => path,
        None => skyfuel_store::default_db_path(),
    };
    tracing::debug!("Using database at {}", db_path.display());
    let store = Store::open(&db_path)?;

    match cli.command {
        Commands::Add {
            brand,
            model,
            serial,
            battery_type,
            cells,
            capacity,
            purchase_date,
            notes,
        } => commands::add(
            &store,
            brand,
            model,
            serial,
            battery_type,
            cells,
            capacity,
            purchase_date,
            notes,
        ),
        Commands::List {
            status,
            battery_type,
            format,
        } => commands::list(&store, status, battery_type, &output(format)),
        Commands::Show { id, format } => commands::show(&store, id, &output(format), color),
        Commands::SetStatus { id, status } => commands::set_status(&store, id, status),
        Commands::Health { id } => commands::health(&store, id),
        Commands::Alerts { format } => commands::alerts(&store, &output(format), color),
        Commands::Qr(QrCommand::Encode { id }) => commands::qr_encode(&store, id),
        Commands::Qr(QrCommand::Share { id }) => commands::qr_share(&store, id),
        Commands::Qr(QrCommand::Decode { code, save }) => {
            commands::qr_decode(&store, &code, save)
        }
        Commands::Export { output, format } => {
            commands::export(&store, output, format.as_deref())
        }
        Commands::Import { input, format } => {
            commands::import(&store, &input, format.as_deref())
        }
        Commands::Delete { id } => commands::delete(&store, id),
        Commands::Config { .. } | Commands::Completions { .. } => {
            unreachable!("handled before the store is opened")
        }
    }
}
