//! SQL database migrations for the data warehouse schema.
//!
//! This crate provides the schema migrations of the warehouse tables for
//! SQLite, MySQL, and PostgreSQL through feature flags. Migrations are applied
//! by [`sqlx_migrator`], which records applied migrations in its own table and
//! runs each migration inside a transaction.
//!
//! # Features
//!
//! - **`sqlite`** - Enables SQLite database support
//! - **`mysql`** - Enables MySQL database support
//! - **`postgres`** - Enables PostgreSQL database support
//!
//! All features are enabled by default.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlx_migrator::Plan;
//!
//! let mut conn = pool.acquire().await?;
//!
//! // Run all pending migrations, failures are classified as `MigrationError`
//! warehouse_sql_migrator::migrate::<sqlx::Sqlite>(&mut *conn, &Plan::apply_all()).await?;
//! ```
//!
//! [`new`] returns the bare [`Migrator`] for callers that drive `sqlx_migrator`
//! themselves.
//!
//! # Migrations
//!
//! All migrations belong to the `posthog` app:
//!
//! - [`InitMigration`] (`0001_initial_warehouse`) - Creates the data warehouse table
//!   and external data schema tables
//! - [`M0428`] (`0428_externaldataschema_sync_type`) - Adds `sync_type` to external
//!   data schemas
//! - [`M0429`] (`0429_alter_datawarehousetable_format`) - Restricts the data warehouse
//!   table `format` to `CSV`, `CSVWithNames`, `Parquet` and `JSONEachRow`

use sqlx_migrator::{Info, Migrate, Migrator, Plan};

mod error;
mod m0001;
mod m0428;
mod m0429;

pub use error::MigrationError;
pub use m0001::InitMigration;
pub use m0428::M0428;
pub use m0429::datawarehousetable::alter_format_column::Operation as AlterFormatColumn;
pub use m0429::M0429;

/// Creates a new [`Migrator`] instance with all warehouse migrations registered.
///
/// # Errors
///
/// Returns an error if migration registration fails.
pub fn new<DB: sqlx::Database>() -> Result<Migrator<DB>, sqlx_migrator::Error>
where
    InitMigration: sqlx_migrator::Migration<DB>,
    M0428: sqlx_migrator::Migration<DB>,
    M0429: sqlx_migrator::Migration<DB>,
{
    let mut migrator = Migrator::default();
    migrator.add_migration(Box::new(InitMigration))?;
    migrator.add_migration(Box::new(M0428))?;
    migrator.add_migration(Box::new(M0429))?;

    Ok(migrator)
}

/// Runs `plan` with the warehouse migrations on `connection`.
///
/// Migrations already recorded as applied are skipped, so running the same
/// plan twice is a no-op the second time. When a migration is rejected because
/// stored `format` values fall outside the permitted set, the returned
/// [`MigrationError::ConstraintViolation`] lists those values.
#[tracing::instrument(skip_all, fields(backend = DB::NAME))]
pub async fn migrate<DB>(
    connection: &mut DB::Connection,
    plan: &Plan,
) -> Result<(), MigrationError>
where
    DB: sqlx::Database,
    InitMigration: sqlx_migrator::Migration<DB>,
    M0428: sqlx_migrator::Migration<DB>,
    M0429: sqlx_migrator::Migration<DB>,
    Migrator<DB>: sqlx_migrator::migrator::DatabaseOperation<DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let migrator = new::<DB>()?;

    let Err(err) = migrator.run(&mut *connection, plan).await else {
        tracing::info!("migrations up to date");
        return Ok(());
    };

    let mut err = MigrationError::from(err);

    if let MigrationError::ConstraintViolation { values, .. } = &mut err {
        match warehouse_sql::nonconforming_formats::<DB>(connection).await {
            Ok(found) => *values = found,
            Err(e) => tracing::warn!(error = %e, "unable to list nonconforming formats"),
        }
    }

    tracing::error!(error = %err, "migration failed");

    Err(err)
}
