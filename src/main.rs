//! # MLentory CLI (`mlentory`)
//!
//! Entry point for the identity, provenance, collection, and retention
//! tooling of the MLentory pipeline.
//!
//! ## Usage
//!
//! ```bash
//! mlentory --config ./config/mlentory.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mlentory id <TYPE> <ID>` | Print the identifier for an entity |
//! | `mlentory wrap` | Attach provenance to every field of extracted records |
//! | `mlentory collect` | Deduplicate keywords or licenses across records |
//! | `mlentory list` | List execution folders for a platform |
//! | `mlentory purge` | Delete execution folders older than a date |
//!
//! ## Exit codes
//!
//! `0` on success (including a declined confirmation), `1` when any
//! folder failed to delete or when the arguments are invalid.

use clap::{Parser, Subcommand};
use mlentory::{collect_cmd, config, logging, retention_cmd};
use mlentory_core::identity::make_id;
use mlentory_core::models::EntityKind;
use std::path::PathBuf;
use std::process::ExitCode;

/// MLentory: identity, provenance, and retention for ML metadata.
#[derive(Parser)]
#[command(
    name = "mlentory",
    about = "MLentory: identity, provenance, tag collection, and retention for ML metadata",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "./config/mlentory.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the content-addressed identifier for an entity.
    Id {
        /// Entity type tag, e.g. `Keyword`, `License`, `Dataset`.
        entity_type: String,
        /// Platform-local identifier or name.
        entity_id: String,
        /// Owning platform; `generic` when omitted.
        #[arg(long)]
        platform: Option<String>,
    },

    /// Wrap every field of a JSON array of records with provenance.
    ///
    /// All records share one extraction timestamp taken at start.
    Wrap {
        /// JSON file holding an array of flat records.
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        platform: String,
        /// Extraction method tag recorded on every claim.
        #[arg(long, default_value = "API fetch")]
        method: String,
        /// Confidence in [0, 1].
        #[arg(long, default_value_t = 1.0)]
        confidence: f64,
        /// Write to this file instead of stdout.
        #[arg(long, conflicts_with = "persist")]
        output: Option<PathBuf>,
        /// Write into a new `1_raw/<platform>` execution folder.
        #[arg(long)]
        persist: bool,
        /// Data root override for `--persist`.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Collect deduplicated keyword or license entities from records.
    Collect {
        /// JSON file holding an array of source records.
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        platform: String,
        /// `keyword` or `license`.
        #[arg(long, default_value = "keyword")]
        kind: EntityKind,
        /// Precomputed keywords, collected before any record field.
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,
        /// Curated definitions CSV; overrides the config.
        #[arg(long)]
        curated: Option<PathBuf>,
        /// Write to this file instead of stdout.
        #[arg(long, conflicts_with = "persist")]
        output: Option<PathBuf>,
        /// Write into a new `2_normalized/<platform>` execution folder.
        #[arg(long)]
        persist: bool,
        /// Data root override for `--persist`.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// List execution folders for a platform.
    List {
        #[arg(long)]
        platform: String,
        /// `raw`, `normalized`, `rdf`, or `all`.
        #[arg(long, default_value = "all")]
        stage: String,
        /// Data root override.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Delete execution folders dated strictly before `--date`.
    ///
    /// Prints every folder it intends to delete, with sizes, before
    /// asking for confirmation.
    Purge {
        #[arg(long)]
        platform: String,
        /// Exclusive threshold date, `YYYY-MM-DD`.
        #[arg(long)]
        date: String,
        /// `raw`, `normalized`, `rdf`, or `all`.
        #[arg(long)]
        stage: String,
        /// Skip the interactive confirmation.
        #[arg(long)]
        no_confirm: bool,
        /// Data root override.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn output_target(
    output: Option<PathBuf>,
    persist: bool,
    data_root: PathBuf,
) -> collect_cmd::OutputTarget {
    match (output, persist) {
        (_, true) => collect_cmd::OutputTarget::Persist(data_root),
        (Some(path), false) => collect_cmd::OutputTarget::File(path),
        (None, false) => collect_cmd::OutputTarget::Stdout,
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let cfg = config::load_config(&cli.config)?;
    logging::init(&cfg.logging);

    let data_root =
        |override_dir: Option<PathBuf>| override_dir.unwrap_or_else(|| cfg.data.root.clone());

    match cli.command {
        Commands::Id {
            entity_type,
            entity_id,
            platform,
        } => {
            println!("{}", make_id(&entity_type, &entity_id, platform.as_deref()));
        }
        Commands::Wrap {
            input,
            platform,
            method,
            confidence,
            output,
            persist,
            data_dir,
        } => {
            collect_cmd::run_wrap(collect_cmd::WrapArgs {
                input,
                platform,
                method,
                confidence,
                output: output_target(output, persist, data_root(data_dir)),
            })?;
        }
        Commands::Collect {
            input,
            platform,
            kind,
            keywords,
            curated,
            output,
            persist,
            data_dir,
        } => {
            let target = output_target(output, persist, data_root(data_dir));
            collect_cmd::run_collect(
                &cfg,
                collect_cmd::CollectArgs {
                    input,
                    kind,
                    platform,
                    keywords,
                    curated,
                    output: target,
                },
            )?;
        }
        Commands::List {
            platform,
            stage,
            data_dir,
        } => {
            retention_cmd::run_list(&data_root(data_dir), &platform, &stage)?;
        }
        Commands::Purge {
            platform,
            date,
            stage,
            no_confirm,
            data_dir,
        } => {
            return retention_cmd::run_purge(
                &data_root(data_dir),
                &platform,
                &stage,
                &date,
                no_confirm,
            );
        }
    }

    Ok(0)
}

fn main() -> ExitCode {
    // Usage errors exit 1 like every other invalid input, not clap's 2.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
