//! Migration recording how external data schemas are synced.

mod externaldataschema;

use sqlx_migrator::vec_box;

/// Migration that adds the `sync_type` column to the external data schema table.
///
/// ## Changes
///
/// - Adds `sync_type` (VARCHAR(128), NULL) to `posthog_externaldataschema`
///
/// ## Dependencies
///
/// This migration depends on [`InitMigration`](crate::InitMigration).
pub struct M0428;

#[cfg(feature = "sqlite")]
sqlx_migrator::sqlite_migration!(
    M0428,
    "posthog",
    "0428_externaldataschema_sync_type",
    vec_box![crate::InitMigration],
    vec_box![externaldataschema::add_column_sync_type::Operation]
);

#[cfg(feature = "mysql")]
sqlx_migrator::mysql_migration!(
    M0428,
    "posthog",
    "0428_externaldataschema_sync_type",
    vec_box![crate::InitMigration],
    vec_box![externaldataschema::add_column_sync_type::Operation]
);

#[cfg(feature = "postgres")]
sqlx_migrator::postgres_migration!(
    M0428,
    "posthog",
    "0428_externaldataschema_sync_type",
    vec_box![crate::InitMigration],
    vec_box![externaldataschema::add_column_sync_type::Operation]
);
