use sea_query::{ColumnDef, Expr, Table, TableCreateStatement, TableDropStatement};

use warehouse_sql::DataWarehouseTable;

pub struct Operation;

/// Full definition of the warehouse table, named `table`, with the given
/// `format` column.
///
/// Shared with the SQLite rebuild in [`M0429`](crate::M0429) so that both tables
/// keep the same column order.
pub(crate) fn table_statement(table: DataWarehouseTable, format: ColumnDef) -> TableCreateStatement {
    Table::create()
        .table(table)
        .col(
            ColumnDef::new(DataWarehouseTable::Id)
                .string()
                .string_len(36)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(DataWarehouseTable::Name)
                .string()
                .string_len(128)
                .not_null(),
        )
        .col(format)
        .col(ColumnDef::new(DataWarehouseTable::TeamId).integer().not_null())
        .col(
            ColumnDef::new(DataWarehouseTable::UrlPattern)
                .string()
                .string_len(500)
                .not_null(),
        )
        .col(ColumnDef::new(DataWarehouseTable::Columns).text().null())
        .col(ColumnDef::new(DataWarehouseTable::RowCount).big_integer().null())
        .col(
            ColumnDef::new(DataWarehouseTable::Deleted)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(DataWarehouseTable::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

/// `format` as first created: any string up to 128 characters.
pub(crate) fn unrestricted_format_column() -> ColumnDef {
    ColumnDef::new(DataWarehouseTable::Format)
        .string()
        .string_len(128)
        .not_null()
        .to_owned()
}

fn up_statement() -> TableCreateStatement {
    table_statement(DataWarehouseTable::Table, unrestricted_format_column())
        .if_not_exists()
        .to_owned()
}

fn down_statement() -> TableDropStatement {
    Table::drop().table(DataWarehouseTable::Table).to_owned()
}

#[cfg(feature = "sqlite")]
#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for Operation {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = up_statement().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = down_statement().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

#[cfg(feature = "mysql")]
#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::MySql> for Operation {
    async fn up(&self, connection: &mut sqlx::MySqlConnection) -> Result<(), sqlx_migrator::Error> {
        let statement = up_statement().to_string(sea_query::MysqlQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::MySqlConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = down_statement().to_string(sea_query::MysqlQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

#[cfg(feature = "postgres")]
#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Postgres> for Operation {
    async fn up(&self, connection: &mut sqlx::PgConnection) -> Result<(), sqlx_migrator::Error> {
        let statement = up_statement().to_string(sea_query::PostgresQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(&self, connection: &mut sqlx::PgConnection) -> Result<(), sqlx_migrator::Error> {
        let statement = down_statement().to_string(sea_query::PostgresQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
