//! Initial warehouse schema.
//!
//! Creates the tables later migrations alter.

pub mod datawarehousetable;
mod externaldataschema;

use sqlx_migrator::vec_box;

/// Initial migration that creates the warehouse tables.
///
/// ## Data Warehouse Table
///
/// - `id` - Table identifier (VARCHAR(36), primary key)
/// - `name` - Table name (VARCHAR(128))
/// - `format` - File format (VARCHAR(128), unrestricted until [`M0429`](crate::M0429))
/// - `team_id` - Owning team
/// - `url_pattern` - Object location (VARCHAR(500))
/// - `columns` - Serialized column schema, nullable
/// - `row_count` - Last known row count, nullable
/// - `deleted` - Soft delete flag, defaults to false
/// - `created_at` - Creation timestamp
///
/// ## External Data Schema Table
///
/// - `id` - Schema identifier (VARCHAR(36), primary key)
/// - `name` - Source schema name (VARCHAR(400))
/// - `team_id` - Owning team
/// - `should_sync` - Whether the schema is synced, defaults to true
/// - `created_at` - Creation timestamp
pub struct InitMigration;

#[cfg(feature = "sqlite")]
sqlx_migrator::sqlite_migration!(
    InitMigration,
    "posthog",
    "0001_initial_warehouse",
    vec_box![],
    vec_box![
        datawarehousetable::create_table::Operation,
        externaldataschema::create_table::Operation,
    ]
);

#[cfg(feature = "mysql")]
sqlx_migrator::mysql_migration!(
    InitMigration,
    "posthog",
    "0001_initial_warehouse",
    vec_box![],
    vec_box![
        datawarehousetable::create_table::Operation,
        externaldataschema::create_table::Operation,
    ]
);

#[cfg(feature = "postgres")]
sqlx_migrator::postgres_migration!(
    InitMigration,
    "posthog",
    "0001_initial_warehouse",
    vec_box![],
    vec_box![
        datawarehousetable::create_table::Operation,
        externaldataschema::create_table::Operation,
    ]
);
