//! # MLentory
//!
//! Identity, provenance, tag collection, and staged-output retention for
//! the MLentory machine-learning metadata pipeline.
//!
//! Platform extractors (OpenML, Hugging Face, AI4Life, …) fetch raw
//! records elsewhere; this crate is what they all call into. Every entity
//! gets a content-addressed identifier, every extracted field carries
//! provenance, keywords and licenses are deduplicated across sources, and
//! the date-stamped execution folders each run leaves behind are retired
//! by a retention sweep.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌──────────────┐
//! │ Extractors │──▶│ Provenance │──▶│  Collect + │──▶│ Stage output │
//! │ (external) │   │  wrapping  │   │   dedup    │   │ 1_raw/2_/3_  │
//! └────────────┘   └────────────┘   └─────┬──────┘   └──────┬───────┘
//!                                         │                 │
//!                                  make_id() for       retention
//!                                  every entity          sweep
//! ```
//!
//! The pure pieces (identity, provenance, tag decoding, collection) live
//! in [`mlentory_core`], re-exported here. This crate adds
//! the filesystem side: configuration, curated CSV loading, stage layout,
//! and retention.
//!
//! ## Quick Start
//!
//! ```bash
//! mlentory id Keyword dog --platform OpenML
//! mlentory collect --input runs.json --platform OpenML --curated kw.csv
//! mlentory list --platform OpenML
//! mlentory purge --platform OpenML --date 2025-12-01 --stage all
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`curated`] | Curated definition CSV loading |
//! | [`stage`] | Stage directories and execution-folder creation |
//! | [`retention`] | Listing, selection, preview, and deletion of execution folders |
//! | [`retention_cmd`] | `purge` / `list` commands |
//! | [`collect_cmd`] | `wrap` / `collect` commands |

pub use mlentory_core;

pub mod collect_cmd;
pub mod config;
pub mod curated;
pub mod logging;
pub mod retention;
pub mod retention_cmd;
pub mod stage;
