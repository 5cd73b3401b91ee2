use sea_query::Iden;
use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;
use warehouse_sql::{DataWarehouseTable, FORMAT_CHECK_CONSTRAINT};

/// Failure of a migration run, classified by what the operator has to fix.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The schema a migration builds on is absent.
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// Stored rows hold values the altered column no longer accepts.
    #[error("constraint violation on `{column}`, nonconforming values: {values:?}")]
    ConstraintViolation {
        column: &'static str,
        values: Vec<String>,
    },

    /// The target column does not exist or has an incompatible definition.
    #[error("definition conflict: {0}")]
    DefinitionConflict(String),

    #[error(transparent)]
    Migrator(sqlx_migrator::Error),
}

impl From<sqlx_migrator::Error> for MigrationError {
    fn from(err: sqlx_migrator::Error) -> Self {
        let sqlx_migrator::Error::Sqlx(sqlx::Error::Database(db)) = &err else {
            return Self::Migrator(err);
        };

        if is_format_violation(db.as_ref()) {
            return Self::ConstraintViolation {
                column: "format",
                values: Vec::new(),
            };
        }

        if is_undefined_table(db.as_ref()) {
            return Self::MissingPrerequisite(db.message().to_owned());
        }

        if is_undefined_column(db.as_ref()) {
            return Self::DefinitionConflict(db.message().to_owned());
        }

        Self::Migrator(err)
    }
}

fn code(db: &dyn DatabaseError) -> String {
    db.code().map(|code| code.into_owned()).unwrap_or_default()
}

fn is_check_violation(db: &dyn DatabaseError) -> bool {
    let message = db.message();

    matches!(db.kind(), ErrorKind::CheckViolation)
        || code(db) == "23514"
        || message.starts_with("CHECK constraint failed")
        || (message.starts_with("Check constraint") && message.ends_with("is violated."))
}

/// Only the `format` check counts, other CHECK failures are left to the runner error.
fn is_format_violation(db: &dyn DatabaseError) -> bool {
    if !is_check_violation(db) {
        return false;
    }

    if let Some(constraint) = db.constraint() {
        return constraint == FORMAT_CHECK_CONSTRAINT;
    }

    let message = db.message();
    let column = Iden::to_string(&DataWarehouseTable::Format);
    let staging = Iden::to_string(&DataWarehouseTable::Staging);

    // MySQL names the constraint, SQLite prints the expression of an unnamed
    // column check, or the table name on older versions
    message.contains(FORMAT_CHECK_CONSTRAINT)
        || message.contains(&format!("\"{column}\" IN"))
        || message.contains(&format!("{column} IN"))
        || message.ends_with(&staging)
}

fn is_undefined_table(db: &dyn DatabaseError) -> bool {
    let message = db.message();

    matches!(code(db).as_str(), "42P01" | "42S02")
        || message.starts_with("no such table")
        || (message.starts_with("Table '") && message.ends_with("doesn't exist"))
}

fn is_undefined_column(db: &dyn DatabaseError) -> bool {
    matches!(code(db).as_str(), "42703" | "42S22") || db.message().starts_with("no such column")
}
