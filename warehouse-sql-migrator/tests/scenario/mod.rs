use sqlx::Database;
use sqlx_migrator::{Info, Migrate, Migration, Migrator, Operation, Plan};
use warehouse_sql::TableFormat;
use warehouse_sql_migrator::{AlterFormatColumn, InitMigration, MigrationError, M0428, M0429};

/// Applies every migration preceding the format restriction.
pub async fn apply_before_format_restriction<DB>(conn: &mut DB::Connection) -> anyhow::Result<()>
where
    DB: Database,
    InitMigration: Migration<DB>,
    M0428: Migration<DB>,
    Migrator<DB>: sqlx_migrator::migrator::DatabaseOperation<DB>,
{
    let mut migrator = Migrator::<DB>::default();
    migrator.add_migration(Box::new(InitMigration))?;
    migrator.add_migration(Box::new(M0428))?;
    migrator.run(&mut *conn, &Plan::apply_all()).await?;

    Ok(())
}

async fn insert_table<DB>(
    conn: &mut DB::Connection,
    id: &str,
    format: &str,
) -> Result<(), sqlx::Error>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
{
    let sql = format!(
        "INSERT INTO posthog_datawarehousetable (id, name, format, team_id, url_pattern) VALUES ('{id}', 'table_{id}', '{format}', 1, 's3://bucket/{id}/*')"
    );

    sqlx::query::<DB>(&sql).execute(&mut *conn).await?;

    Ok(())
}

async fn stored_formats<DB>(conn: &mut DB::Connection) -> anyhow::Result<Vec<(String, String)>>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String, String): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let rows = sqlx::query_as::<DB, (String, String)>(
        "SELECT id, format FROM posthog_datawarehousetable ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

fn rows(values: &[(&str, &str)]) -> Vec<(String, String)> {
    values
        .iter()
        .map(|(id, format)| (id.to_string(), format.to_string()))
        .collect()
}

pub async fn apply_all_on_empty_database<DB>(conn: &mut DB::Connection) -> anyhow::Result<()>
where
    DB: Database,
    InitMigration: Migration<DB>,
    M0428: Migration<DB>,
    M0429: Migration<DB>,
    Migrator<DB>: sqlx_migrator::migrator::DatabaseOperation<DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String, String): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    warehouse_sql_migrator::migrate::<DB>(&mut *conn, &Plan::apply_all()).await?;

    for (i, format) in TableFormat::values().enumerate() {
        insert_table::<DB>(&mut *conn, &format!("t{i}"), format).await?;
    }

    assert_eq!(stored_formats::<DB>(&mut *conn).await?.len(), 4);
    assert!(insert_table::<DB>(&mut *conn, "xml", "XML").await.is_err());

    Ok(())
}

pub async fn conforming_values_are_retained<DB>(conn: &mut DB::Connection) -> anyhow::Result<()>
where
    DB: Database,
    InitMigration: Migration<DB>,
    M0428: Migration<DB>,
    M0429: Migration<DB>,
    Migrator<DB>: sqlx_migrator::migrator::DatabaseOperation<DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String, String): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    apply_before_format_restriction::<DB>(&mut *conn).await?;

    insert_table::<DB>(&mut *conn, "a", "Parquet").await?;
    insert_table::<DB>(&mut *conn, "b", "CSVWithNames").await?;
    insert_table::<DB>(&mut *conn, "c", "JSONEachRow").await?;

    warehouse_sql_migrator::migrate::<DB>(&mut *conn, &Plan::apply_all()).await?;

    let stored = stored_formats::<DB>(&mut *conn).await?;
    assert_eq!(
        stored,
        rows(&[("a", "Parquet"), ("b", "CSVWithNames"), ("c", "JSONEachRow")])
    );

    for (_, format) in stored {
        assert!(format.parse::<TableFormat>().is_ok());
    }

    Ok(())
}

pub async fn nonconforming_value_rejects_migration<DB>(
    conn: &mut DB::Connection,
) -> anyhow::Result<()>
where
    DB: Database,
    InitMigration: Migration<DB>,
    M0428: Migration<DB>,
    M0429: Migration<DB>,
    Migrator<DB>: sqlx_migrator::migrator::DatabaseOperation<DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String, String): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    apply_before_format_restriction::<DB>(&mut *conn).await?;

    insert_table::<DB>(&mut *conn, "a", "Parquet").await?;
    insert_table::<DB>(&mut *conn, "b", "XML").await?;
    insert_table::<DB>(&mut *conn, "c", "JSON").await?;

    let err = warehouse_sql_migrator::migrate::<DB>(&mut *conn, &Plan::apply_all())
        .await
        .expect_err("XML is not a permitted format");

    match err {
        MigrationError::ConstraintViolation { column, values } => {
            assert_eq!(column, "format");
            assert_eq!(values, vec!["JSON".to_owned(), "XML".to_owned()]);
        }
        other => panic!("expected a constraint violation, got {other:?}"),
    }

    assert_eq!(
        stored_formats::<DB>(&mut *conn).await?,
        rows(&[("a", "Parquet"), ("b", "XML"), ("c", "JSON")])
    );

    // No restriction is left behind by the failed migration
    insert_table::<DB>(&mut *conn, "d", "Avro").await?;

    Ok(())
}

pub async fn migration_applies_once_after_cleanup<DB>(
    conn: &mut DB::Connection,
) -> anyhow::Result<()>
where
    DB: Database,
    InitMigration: Migration<DB>,
    M0428: Migration<DB>,
    M0429: Migration<DB>,
    Migrator<DB>: sqlx_migrator::migrator::DatabaseOperation<DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String, String): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    apply_before_format_restriction::<DB>(&mut *conn).await?;

    insert_table::<DB>(&mut *conn, "a", "XML").await?;

    assert!(
        warehouse_sql_migrator::migrate::<DB>(&mut *conn, &Plan::apply_all())
            .await
            .is_err()
    );

    sqlx::query::<DB>("UPDATE posthog_datawarehousetable SET format = 'CSV' WHERE format = 'XML'")
        .execute(&mut *conn)
        .await?;

    warehouse_sql_migrator::migrate::<DB>(&mut *conn, &Plan::apply_all()).await?;

    assert_eq!(stored_formats::<DB>(&mut *conn).await?, rows(&[("a", "CSV")]));
    assert!(insert_table::<DB>(&mut *conn, "b", "XML").await.is_err());

    Ok(())
}

pub async fn second_run_is_noop<DB>(conn: &mut DB::Connection) -> anyhow::Result<()>
where
    DB: Database,
    InitMigration: Migration<DB>,
    M0428: Migration<DB>,
    M0429: Migration<DB>,
    Migrator<DB>: sqlx_migrator::migrator::DatabaseOperation<DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String, String): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    warehouse_sql_migrator::migrate::<DB>(&mut *conn, &Plan::apply_all()).await?;
    insert_table::<DB>(&mut *conn, "a", "CSV").await?;

    warehouse_sql_migrator::migrate::<DB>(&mut *conn, &Plan::apply_all()).await?;

    assert_eq!(stored_formats::<DB>(&mut *conn).await?, rows(&[("a", "CSV")]));
    assert!(insert_table::<DB>(&mut *conn, "b", "XML").await.is_err());

    Ok(())
}

/// Runs the alteration on a database where its prerequisites were never applied.
///
/// `Migrator::add_migration` registers a migration's parents along with it, so
/// through the runner the dependency is always applied first. The operation is
/// invoked directly to reach the schema a missing prerequisite leaves behind.
pub async fn missing_prerequisite<DB>(conn: &mut DB::Connection) -> anyhow::Result<()>
where
    DB: Database,
    AlterFormatColumn: Operation<DB>,
{
    let err = <AlterFormatColumn as Operation<DB>>::up(&AlterFormatColumn, &mut *conn)
        .await
        .expect_err("the warehouse table does not exist");

    let err = MigrationError::from(err);
    assert!(
        matches!(err, MigrationError::MissingPrerequisite(_)),
        "expected a missing prerequisite, got {err:?}"
    );

    Ok(())
}

pub async fn unrelated_check_is_not_a_format_violation<DB>(
    conn: &mut DB::Connection,
) -> anyhow::Result<()>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
{
    sqlx::query::<DB>("CREATE TABLE other_check (x INTEGER CHECK (x > 0))")
        .execute(&mut *conn)
        .await?;

    let Err(err) = sqlx::query::<DB>("INSERT INTO other_check (x) VALUES (-1)")
        .execute(&mut *conn)
        .await
    else {
        panic!("x must be positive");
    };

    let err = MigrationError::from(sqlx_migrator::Error::from(err));
    assert!(
        matches!(err, MigrationError::Migrator(_)),
        "expected a runner error, got {err:?}"
    );

    Ok(())
}

pub async fn rejects_values_over_max_length<DB>(conn: &mut DB::Connection) -> anyhow::Result<()>
where
    DB: Database,
    InitMigration: Migration<DB>,
    M0428: Migration<DB>,
    M0429: Migration<DB>,
    Migrator<DB>: sqlx_migrator::migrator::DatabaseOperation<DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    warehouse_sql_migrator::migrate::<DB>(&mut *conn, &Plan::apply_all()).await?;

    let value = "C".repeat(TableFormat::MAX_LENGTH + 1);
    assert!(insert_table::<DB>(&mut *conn, "a", &value).await.is_err());

    Ok(())
}

pub async fn revert_lifts_restriction<DB>(conn: &mut DB::Connection) -> anyhow::Result<()>
where
    DB: Database,
    InitMigration: Migration<DB>,
    M0428: Migration<DB>,
    M0429: Migration<DB>,
    AlterFormatColumn: Operation<DB>,
    Migrator<DB>: sqlx_migrator::migrator::DatabaseOperation<DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String, String): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    warehouse_sql_migrator::migrate::<DB>(&mut *conn, &Plan::apply_all()).await?;
    insert_table::<DB>(&mut *conn, "a", "Parquet").await?;

    <AlterFormatColumn as Operation<DB>>::down(&AlterFormatColumn, &mut *conn).await?;

    insert_table::<DB>(&mut *conn, "b", "XML").await?;

    assert_eq!(
        stored_formats::<DB>(&mut *conn).await?,
        rows(&[("a", "Parquet"), ("b", "XML")])
    );

    Ok(())
}
