//! Batch normalization of game data JSON files: genre list reconciliation
//! and tag/score key canonicalization.

pub mod commands;
pub mod config;
pub mod error;
pub mod genres;
pub mod normalizer;
pub mod output;

pub use config::{AliasTable, DataPaths, GenrePolicy};
pub use error::NormalizeError;
