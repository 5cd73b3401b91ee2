//! Migration restricting the data warehouse table format.

pub mod datawarehousetable;

use sqlx_migrator::vec_box;

/// Migration that restricts `posthog_datawarehousetable.format` to the
/// [`TableFormat`](warehouse_sql::TableFormat) values.
///
/// ## Changes
///
/// `format` becomes a VARCHAR(128) accepting only `CSV`, `CSVWithNames`,
/// `Parquet` and `JSONEachRow`, enforced by the
/// `posthog_datawarehousetable_format_check` constraint. Applying fails without
/// changing anything if a stored value is outside that set.
///
/// ## Database-Specific Notes
///
/// - **SQLite**: The table is rebuilt with a column CHECK since SQLite supports
///   neither `ALTER COLUMN` nor `ADD CONSTRAINT`.
/// - **MySQL**: Uses `MODIFY COLUMN` followed by `ADD CONSTRAINT .. CHECK`.
/// - **PostgreSQL**: Uses `ALTER COLUMN` followed by `ADD CONSTRAINT .. CHECK`.
///
/// ## Dependencies
///
/// This migration depends on [`M0428`](crate::M0428).
pub struct M0429;

#[cfg(feature = "sqlite")]
sqlx_migrator::sqlite_migration!(
    M0429,
    "posthog",
    "0429_alter_datawarehousetable_format",
    vec_box![crate::M0428],
    vec_box![datawarehousetable::alter_format_column::Operation]
);

#[cfg(feature = "mysql")]
sqlx_migrator::mysql_migration!(
    M0429,
    "posthog",
    "0429_alter_datawarehousetable_format",
    vec_box![crate::M0428],
    vec_box![datawarehousetable::alter_format_column::Operation]
);

#[cfg(feature = "postgres")]
sqlx_migrator::postgres_migration!(
    M0429,
    "posthog",
    "0429_alter_datawarehousetable_format",
    vec_box![crate::M0428],
    vec_box![datawarehousetable::alter_format_column::Operation]
);
