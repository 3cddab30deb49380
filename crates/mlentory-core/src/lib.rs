//! # MLentory Core
//!
//! Pure, I/O-free logic shared by every MLentory extractor: entity
//! identity, per-field provenance, encoded tag decoding, cross-source
//! tag collection, and execution-folder naming.
//!
//! This crate performs no filesystem or network access. Loading curated
//! definitions and managing stage directories live in the `mlentory`
//! crate, which feeds plain values into the types defined here.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`identity`] | Content-addressed entity identifiers |
//! | [`provenance`] | Claims and provenance-wrapped records |
//! | [`tags`] | Decoding of scalar / encoded-list tag values |
//! | [`collect`] | Order-preserving tag collection and resolution |
//! | [`curated`] | Immutable curated-definition lookup table |
//! | [`execution`] | Execution-folder naming and parsing |
//! | [`models`] | Entity records and kinds |

pub mod collect;
pub mod curated;
pub mod error;
pub mod execution;
pub mod identity;
pub mod models;
pub mod provenance;
pub mod tags;

pub use error::CoreError;
