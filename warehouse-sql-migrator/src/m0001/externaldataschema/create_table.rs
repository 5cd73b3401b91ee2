use sea_query::{ColumnDef, Expr, Table, TableCreateStatement, TableDropStatement};

use warehouse_sql::ExternalDataSchema;

pub struct Operation;

fn up_statement() -> TableCreateStatement {
    Table::create()
        .table(ExternalDataSchema::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(ExternalDataSchema::Id)
                .string()
                .string_len(36)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(ExternalDataSchema::Name)
                .string()
                .string_len(400)
                .not_null(),
        )
        .col(ColumnDef::new(ExternalDataSchema::TeamId).integer().not_null())
        .col(
            ColumnDef::new(ExternalDataSchema::ShouldSync)
                .boolean()
                .not_null()
                .default(true),
        )
        .col(
            ColumnDef::new(ExternalDataSchema::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

fn down_statement() -> TableDropStatement {
    Table::drop().table(ExternalDataSchema::Table).to_owned()
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
