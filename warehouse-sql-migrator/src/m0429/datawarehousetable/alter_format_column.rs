use sea_query::{ColumnDef, Iden, Table};
#[cfg(feature = "sqlite")]
use sea_query::{Expr, ExprTrait, TableCreateStatement, TableDropStatement, TableRenameStatement};
#[cfg(any(feature = "mysql", feature = "postgres"))]
use sea_query::TableAlterStatement;

use warehouse_sql::{DataWarehouseTable, TableFormat, FORMAT_CHECK_CONSTRAINT};

#[cfg(feature = "sqlite")]
use crate::m0001::datawarehousetable::create_table::table_statement;
use crate::m0001::datawarehousetable::create_table::unrestricted_format_column;

pub struct Operation;

#[cfg(any(feature = "mysql", feature = "postgres"))]
fn modify_statement() -> TableAlterStatement {
    Table::alter()
        .table(DataWarehouseTable::Table)
        .modify_column(unrestricted_format_column())
        .to_owned()
}

#[cfg(any(feature = "mysql", feature = "postgres"))]
fn add_check_constraint(quote: char) -> String {
    let table = Iden::to_string(&DataWarehouseTable::Table);
    let column = Iden::to_string(&DataWarehouseTable::Format);
    let values = TableFormat::values()
        .map(|value| format!("'{value}'"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "ALTER TABLE {quote}{table}{quote} ADD CONSTRAINT {quote}{FORMAT_CHECK_CONSTRAINT}{quote} CHECK ({quote}{column}{quote} IN ({values}))"
    )
}

// SQLite can neither alter a column nor add a constraint, the table is
// rebuilt instead. Rows copied into a table whose `format` has a CHECK
// constraint fail on the first nonconforming value.
#[cfg(feature = "sqlite")]
fn restricted_format_column() -> ColumnDef {
    unrestricted_format_column()
        .check(Expr::col(DataWarehouseTable::Format).is_in(TableFormat::values()))
        .to_owned()
}

#[cfg(feature = "sqlite")]
fn create_staging_statement(format: ColumnDef) -> TableCreateStatement {
    table_statement(DataWarehouseTable::Staging, format)
}

#[cfg(feature = "sqlite")]
fn copy_rows() -> String {
    let staging = Iden::to_string(&DataWarehouseTable::Staging);
    let table = Iden::to_string(&DataWarehouseTable::Table);

    format!(r#"INSERT INTO "{staging}" SELECT * FROM "{table}""#)
}

#[cfg(feature = "sqlite")]
fn drop_statement() -> TableDropStatement {
    Table::drop().table(DataWarehouseTable::Table).to_owned()
}

#[cfg(feature = "sqlite")]
fn rename_statement() -> TableRenameStatement {
    Table::rename()
        .table(DataWarehouseTable::Staging, DataWarehouseTable::Table)
        .to_owned()
}

/// Renders every statement up front, sea-query statements are not `Send`.
#[cfg(feature = "sqlite")]
fn rebuild_statements(format: ColumnDef) -> [String; 4] {
    [
        create_staging_statement(format).to_string(sea_query::SqliteQueryBuilder),
        copy_rows(),
        drop_statement().to_string(sea_query::SqliteQueryBuilder),
        rename_statement().to_string(sea_query::SqliteQueryBuilder),
    ]
}

#[cfg(feature = "sqlite")]
async fn rebuild_sqlite(
    connection: &mut sqlx::SqliteConnection,
    statements: [String; 4],
) -> Result<(), sqlx_migrator::Error> {
    for statement in statements {
        sqlx::query(&statement).execute(&mut *connection).await?;
    }

    Ok(())
}

#[cfg(feature = "sqlite")]
#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for Operation {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statements = rebuild_statements(restricted_format_column());
        rebuild_sqlite(connection, statements).await
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statements = rebuild_statements(unrestricted_format_column());
        rebuild_sqlite(connection, statements).await
    }
}

#[cfg(feature = "mysql")]
#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::MySql> for Operation {
    async fn up(&self, connection: &mut sqlx::MySqlConnection) -> Result<(), sqlx_migrator::Error> {
        let statement = modify_statement().to_string(sea_query::MysqlQueryBuilder);
        sqlx::query(&statement).execute(&mut *connection).await?;

        // MySQL 8.0.16+ validates existing rows when adding the constraint
        sqlx::query(&add_check_constraint('`'))
            .execute(connection)
            .await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::MySqlConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let table = Iden::to_string(&DataWarehouseTable::Table);
        let statement = format!("ALTER TABLE `{table}` DROP CHECK `{FORMAT_CHECK_CONSTRAINT}`");
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

#[cfg(feature = "postgres")]
#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Postgres> for Operation {
    async fn up(&self, connection: &mut sqlx::PgConnection) -> Result<(), sqlx_migrator::Error> {
        let statement = modify_statement().to_string(sea_query::PostgresQueryBuilder);
        sqlx::query(&statement).execute(&mut *connection).await?;

        sqlx::query(&add_check_constraint('"'))
            .execute(connection)
            .await?;

        Ok(())
    }

    async fn down(&self, connection: &mut sqlx::PgConnection) -> Result<(), sqlx_migrator::Error> {
        let table = Iden::to_string(&DataWarehouseTable::Table);
        let statement =
            format!(r#"ALTER TABLE "{table}" DROP CONSTRAINT "{FORMAT_CHECK_CONSTRAINT}""#);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
