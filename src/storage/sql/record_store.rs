//! Unified SQL RecordStore implementation.
//!
//! Uses a macro to generate implementations for each SQL backend,
//! eliminating code duplication while maintaining type safety.

use std::marker::PhantomData;

use super::SqlDatabase;

/// SQL-based implementation of RecordStore.
///
/// This generic implementation works with any SQL database that implements
/// the `SqlDatabase` trait (PostgreSQL, SQLite).
pub struct SqlRecordStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlRecordStore<DB> {
    /// Create a new SQL record store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

/// Macro to implement RecordStore for a specific SQL backend.
///
/// This eliminates duplication between PostgreSQL and SQLite implementations
/// while maintaining full type safety.
macro_rules! impl_record_store {
    ($db_type:ty, $row_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlRecordStore<$db_type> {
            /// Initialize the database schema.
            pub async fn init(&self) -> crate::interfaces::record_store::Result<()> {
                for ddl in <$db_type as SqlDatabase>::CREATE_ACTIVATION_RECORDS {
                    sqlx::query(ddl).execute(&self.pool).await?;
                }
                Ok(())
            }

            fn decode(
                row: &$row_type,
            ) -> crate::interfaces::record_store::Result<crate::record::ActivationRecord> {
                use sqlx::Row;

                let created_at: String = row.get("activation_timestamp");
                super::assemble(
                    row.get("id"),
                    row.get("iccid"),
                    row.get("customer_email"),
                    row.get("active"),
                    &created_at,
                    row.get("actuator_response"),
                )
            }

            async fn fetch_many(
                &self,
                sql: String,
            ) -> crate::interfaces::record_store::Result<Vec<crate::record::ActivationRecord>>
            {
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter().map(Self::decode).collect()
            }

            async fn fetch_one(
                &self,
                sql: String,
            ) -> crate::interfaces::record_store::Result<Option<crate::record::ActivationRecord>>
            {
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
                row.as_ref().map(Self::decode).transpose()
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::interfaces::RecordStore for SqlRecordStore<$db_type> {
            async fn exists(&self, identifier: &str) -> crate::interfaces::record_store::Result<bool> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::ActivationRecords;

                let stmt = Query::select()
                    .column(ActivationRecords::Id)
                    .from(ActivationRecords::Table)
                    .and_where(Expr::col(ActivationRecords::Iccid).eq(identifier))
                    .limit(1)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
                Ok(row.is_some())
            }

            async fn find_by_identifier(
                &self,
                identifier: &str,
            ) -> crate::interfaces::record_store::Result<Option<crate::record::ActivationRecord>>
            {
                use sea_query::Expr;

                use crate::storage::schema::ActivationRecords;

                let stmt = super::select_records()
                    .and_where(Expr::col(ActivationRecords::Iccid).eq(identifier))
                    .to_owned();
                let sql = <$db_type>::build_select(stmt);
                self.fetch_one(sql).await
            }

            async fn find_by_id(
                &self,
                id: crate::record::RecordId,
            ) -> crate::interfaces::record_store::Result<Option<crate::record::ActivationRecord>>
            {
                use sea_query::Expr;

                use crate::storage::schema::ActivationRecords;

                let stmt = super::select_records()
                    .and_where(Expr::col(ActivationRecords::Id).eq(id.0))
                    .to_owned();
                let sql = <$db_type>::build_select(stmt);
                self.fetch_one(sql).await
            }

            async fn find_by_requester(
                &self,
                requester: &str,
            ) -> crate::interfaces::record_store::Result<Vec<crate::record::ActivationRecord>> {
                use sea_query::{Expr, Order};

                use crate::storage::schema::ActivationRecords;

                let stmt = super::select_records()
                    .and_where(Expr::col(ActivationRecords::CustomerEmail).eq(requester))
                    .order_by(ActivationRecords::Id, Order::Asc)
                    .to_owned();
                let sql = <$db_type>::build_select(stmt);
                self.fetch_many(sql).await
            }

            async fn find_by_outcome(
                &self,
                outcome: bool,
            ) -> crate::interfaces::record_store::Result<Vec<crate::record::ActivationRecord>> {
                use sea_query::{Expr, Order};

                use crate::storage::schema::ActivationRecords;

                let stmt = super::select_records()
                    .and_where(Expr::col(ActivationRecords::Active).eq(outcome))
                    .order_by(ActivationRecords::Id, Order::Asc)
                    .to_owned();
                let sql = <$db_type>::build_select(stmt);
                self.fetch_many(sql).await
            }

            async fn find_all(
                &self,
            ) -> crate::interfaces::record_store::Result<Vec<crate::record::ActivationRecord>> {
                use sea_query::Order;

                use crate::storage::schema::ActivationRecords;

                let stmt = super::select_records()
                    .order_by(ActivationRecords::Id, Order::Asc)
                    .to_owned();
                let sql = <$db_type>::build_select(stmt);
                self.fetch_many(sql).await
            }

            async fn save(
                &self,
                record: crate::record::NewActivationRecord,
            ) -> crate::interfaces::record_store::Result<crate::record::ActivationRecord> {
                use sea_query::Query;
                use sqlx::Row;

                use crate::storage::schema::ActivationRecords;

                let created_at = record.created_at.unwrap_or_else(chrono::Utc::now);

                let stmt = Query::insert()
                    .into_table(ActivationRecords::Table)
                    .columns([
                        ActivationRecords::Iccid,
                        ActivationRecords::CustomerEmail,
                        ActivationRecords::Active,
                        ActivationRecords::ActivationTimestamp,
                        ActivationRecords::ActuatorResponse,
                    ])
                    .values_panic([
                        record.identifier.as_str().into(),
                        record.requester.as_str().into(),
                        record.outcome.into(),
                        created_at.to_rfc3339().into(),
                        record.diagnostic.as_str().into(),
                    ])
                    .returning_col(ActivationRecords::Id)
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                let row = sqlx::query(&sql)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| super::classify_insert_error(e, &record.identifier))?;
                let id: i64 = row.get("id");

                Ok(record
                    .with_created_at(created_at)
                    .into_record(crate::record::RecordId(id)))
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_record_store!(super::postgres::Postgres, sqlx::postgres::PgRow, "postgres");
impl_record_store!(super::sqlite::Sqlite, sqlx::sqlite::SqliteRow, "sqlite");
