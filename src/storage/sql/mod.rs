//! Unified SQL storage implementations.
//!
//! This module provides shared implementations for SQL-based storage backends
//! (PostgreSQL, SQLite). The implementations are parameterized by database type
//! using the `SqlDatabase` trait.

mod query;
mod record_store;

use chrono::{DateTime, Utc};
use sea_query::{Query, SelectStatement};

use crate::interfaces::record_store::{Result, StorageError};
use crate::record::{ActivationRecord, RecordId};

use super::schema::ActivationRecords;

pub use query::SqlDatabase;
pub use record_store::SqlRecordStore;

#[cfg(feature = "postgres")]
pub mod postgres {
    //! PostgreSQL database backend.

    use sea_query::PostgresQueryBuilder;
    use sqlx::PgPool;

    use crate::storage::schema::POSTGRES_CREATE_ACTIVATION_RECORDS;

    /// PostgreSQL database marker type.
    pub struct Postgres;

    impl super::SqlDatabase for Postgres {
        type Pool = PgPool;

        const CREATE_ACTIVATION_RECORDS: &'static [&'static str] =
            POSTGRES_CREATE_ACTIVATION_RECORDS;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }
    }

    /// PostgreSQL record store.
    pub type PostgresRecordStore = super::SqlRecordStore<Postgres>;
}

#[cfg(feature = "sqlite")]
pub mod sqlite {
    //! SQLite database backend.

    use sea_query::SqliteQueryBuilder;
    use sqlx::SqlitePool;

    use crate::storage::schema::SQLITE_CREATE_ACTIVATION_RECORDS;

    /// SQLite database marker type.
    pub struct Sqlite;

    impl super::SqlDatabase for Sqlite {
        type Pool = SqlitePool;

        const CREATE_ACTIVATION_RECORDS: &'static [&'static str] =
            SQLITE_CREATE_ACTIVATION_RECORDS;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }
    }

    /// SQLite record store.
    pub type SqliteRecordStore = super::SqlRecordStore<Sqlite>;
}

/// Base SELECT over every record column, without filters.
fn select_records() -> SelectStatement {
    Query::select()
        .columns([
            ActivationRecords::Id,
            ActivationRecords::Iccid,
            ActivationRecords::CustomerEmail,
            ActivationRecords::Active,
            ActivationRecords::ActivationTimestamp,
            ActivationRecords::ActuatorResponse,
        ])
        .from(ActivationRecords::Table)
        .to_owned()
}

/// Build a record from raw column values.
fn assemble(
    id: i64,
    identifier: String,
    requester: String,
    outcome: bool,
    created_at: &str,
    diagnostic: String,
) -> Result<ActivationRecord> {
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .map_err(|e| StorageError::InvalidTimestamp(format!("{}: {}", created_at, e)))?
        .with_timezone(&Utc);

    Ok(ActivationRecord {
        id: RecordId(id),
        identifier,
        requester,
        outcome,
        created_at,
        diagnostic,
    })
}

/// Map an insert failure, turning unique-key violations into `Duplicate`.
fn classify_insert_error(err: sqlx::Error, identifier: &str) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Duplicate {
            identifier: identifier.to_string(),
        },
        _ => StorageError::Database(err),
    }
}
