//! Table identifiers and queries over the warehouse schema.

#[cfg(feature = "mysql")]
use sea_query::MysqlQueryBuilder;
#[cfg(feature = "postgres")]
use sea_query::PostgresQueryBuilder;
#[cfg(feature = "sqlite")]
use sea_query::SqliteQueryBuilder;
use sea_query::{Expr, ExprTrait, Iden, Order, Query, SelectStatement};
use sqlx::Database;

use crate::TableFormat;

/// Column identifiers for the `posthog_datawarehousetable` table.
///
/// # Columns
///
/// - `Id` - Table identifier (UUID, VARCHAR(36))
/// - `Name` - Table name as exposed to queries (VARCHAR(128))
/// - `Format` - File format of the underlying objects (VARCHAR(128), see [`TableFormat`])
/// - `TeamId` - Owning team
/// - `UrlPattern` - Location of the underlying objects (VARCHAR(500))
/// - `Columns` - Serialized column schema
/// - `RowCount` - Last known row count
/// - `Deleted` - Soft delete flag
/// - `CreatedAt` - Creation timestamp
#[derive(Iden, Clone, Copy)]
pub enum DataWarehouseTable {
    /// The table name: `posthog_datawarehousetable`
    #[iden = "posthog_datawarehousetable"]
    Table,
    /// Scratch table used while rebuilding the table on SQLite
    #[iden = "posthog_datawarehousetable__new"]
    Staging,
    Id,
    Name,
    Format,
    TeamId,
    UrlPattern,
    Columns,
    RowCount,
    Deleted,
    CreatedAt,
}

/// Column identifiers for the `posthog_externaldataschema` table.
#[derive(Iden, Clone, Copy)]
pub enum ExternalDataSchema {
    /// The table name: `posthog_externaldataschema`
    #[iden = "posthog_externaldataschema"]
    Table,
    Id,
    Name,
    TeamId,
    ShouldSync,
    SyncType,
    CreatedAt,
}

/// Name of the check constraint restricting `format` to [`TableFormat`] values.
pub const FORMAT_CHECK_CONSTRAINT: &str = "posthog_datawarehousetable_format_check";

/// Selects the distinct `format` values outside of [`TableFormat::values`].
pub fn nonconforming_formats_statement() -> SelectStatement {
    Query::select()
        .distinct()
        .column(DataWarehouseTable::Format)
        .from(DataWarehouseTable::Table)
        .and_where(Expr::col(DataWarehouseTable::Format).is_not_in(TableFormat::values()))
        .order_by(DataWarehouseTable::Format, Order::Asc)
        .to_owned()
}

/// Lists the distinct stored `format` values that are not permitted, sorted.
///
/// An empty result means every row already satisfies the format constraint.
pub async fn nonconforming_formats<DB>(
    connection: &mut DB::Connection,
) -> Result<Vec<String>, sqlx::Error>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let statement = nonconforming_formats_statement();
    let sql = match DB::NAME {
        #[cfg(feature = "sqlite")]
        "SQLite" => statement.to_string(SqliteQueryBuilder),
        #[cfg(feature = "mysql")]
        "MySQL" => statement.to_string(MysqlQueryBuilder),
        #[cfg(feature = "postgres")]
        "PostgreSQL" => statement.to_string(PostgresQueryBuilder),
        name => panic!("'{name}' not supported, consider using SQLite, PostgreSQL or MySQL"),
    };

    sqlx::query_scalar::<DB, String>(&sql)
        .fetch_all(&mut *connection)
        .await
}
