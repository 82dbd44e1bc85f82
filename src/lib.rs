//! cinedex - mirror IMDb's public non-commercial TSV datasets into SQLite
//! and search titles through an FTS5 index.
//!
//! The datasets are refreshed daily by IMDb; `import` downloads the files
//! that have gone stale, streams the gzipped TSVs into the database with
//! bulk upserts, and rebuilds the title search index. `export` writes the
//! database back out in IMDb's own layout.

pub mod cli;
pub mod config;
pub mod datasets;
pub mod db;
pub mod entities;
pub mod error;
pub mod export;
pub mod fetch;
pub mod import;
pub mod search;
