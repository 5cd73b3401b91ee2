//! SQL schema definitions for data warehouse tables.
//!
//! This crate holds the sea-query identifiers of the warehouse tables and the
//! set of file formats a warehouse table may declare. It supports SQLite, MySQL
//! and PostgreSQL through feature flags.
//!
//! # Features
//!
//! - **`sqlite`** - Enables SQLite database support
//! - **`mysql`** - Enables MySQL database support
//! - **`postgres`** - Enables PostgreSQL database support
//!
//! All features are enabled by default.
//!
//! # Formats
//!
//! The `format` column of `posthog_datawarehousetable` is a VARCHAR(128) restricted to:
//!
//! | Stored value | Label |
//! |--------------|-------|
//! | `CSV` | CSV |
//! | `CSVWithNames` | CSVWithNames |
//! | `Parquet` | Parquet |
//! | `JSONEachRow` | JSON |
//!
//! Use [`TableFormat`] to parse and render these values, and
//! [`nonconforming_formats`] to find rows that would violate the restriction.

mod format;
mod sql;

pub use format::*;
pub use sql::*;
