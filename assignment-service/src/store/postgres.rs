//! PostgreSQL record store.
//!
//! Records live in `assignments` with identifiers in a `TEXT[]` column. When
//! uniqueness is enforced, every identifier is also written to
//! `assignment_identifiers` (primary key on the identifier) in the same
//! transaction, so a concurrent commit of the same identifier fails.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::models::{Assignment, NewAssignment};
use common::utils::IdGenerator;

use super::{AssignmentStore, LookupField, StoreError, StoreResult};

const COLUMNS: &str = "id, name, email, phone, quantity, identifiers, created_at";

const SCHEMA: [&str; 6] = [
    "CREATE TABLE IF NOT EXISTS assignments (
        id          UUID        PRIMARY KEY,
        name        TEXT        NOT NULL,
        email       TEXT        NOT NULL,
        phone       TEXT        NOT NULL,
        quantity    INTEGER     NOT NULL CHECK (quantity >= 1),
        identifiers TEXT[]      NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS idx_assignments_email ON assignments (email)",
    "CREATE INDEX IF NOT EXISTS idx_assignments_phone ON assignments (phone)",
    "CREATE INDEX IF NOT EXISTS idx_assignments_created_at ON assignments (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_assignments_identifiers ON assignments USING GIN (identifiers)",
    "CREATE TABLE IF NOT EXISTS assignment_identifiers (
        identifier    CHAR(3) PRIMARY KEY,
        assignment_id UUID    NOT NULL REFERENCES assignments (id)
    )",
];

/// Row from the `assignments` table.
#[derive(sqlx::FromRow)]
struct AssignmentRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    quantity: i32,
    identifiers: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            quantity: u32::try_from(row.quantity).unwrap_or_default(),
            identifiers: row.identifiers,
            created_at: row.created_at,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateIdentifier(db.message().to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// Store backed by a Postgres connection pool.
pub struct PostgresStore {
    pool: PgPool,
    unique_identifiers: bool,
}

impl PostgresStore {
    /// Connects using `DATABASE_URL` and pool settings from configuration.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let url = config.require_database_url()?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to connect: {}", e)))?;

        Self::new(pool, config.enforce_unique_identifiers).await
    }

    /// Wraps an existing pool and makes sure the schema exists.
    pub async fn new(pool: PgPool, unique_identifiers: bool) -> AppResult<Self> {
        let store = Self {
            pool,
            unique_identifiers,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::StoreUnavailable(format!("Failed to create schema: {}", e)))?;
        }
        tracing::info!("Tables `assignments` and `assignment_identifiers` ensured");
        Ok(())
    }

    async fn fetch(&self, sql: &str, bind: Option<&str>) -> StoreResult<Vec<Assignment>> {
        let mut query = sqlx::query_as::<_, AssignmentRow>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Assignment::from).collect())
    }
}

#[async_trait]
impl AssignmentStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn scan_all(&self) -> StoreResult<Vec<Assignment>> {
        let sql = format!("SELECT {} FROM assignments ORDER BY created_at, id", COLUMNS);
        self.fetch(&sql, None).await
    }

    async fn insert(&self, new: NewAssignment) -> StoreResult<Assignment> {
        let id = IdGenerator::record_id();
        let quantity = i32::try_from(new.identifiers.len())
            .map_err(|_| StoreError::Unavailable("quantity out of range".into()))?;

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO assignments (id, name, email, phone, quantity, identifiers)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(id)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(quantity)
            .bind(&new.identifiers)
            .fetch_one(&mut *tx)
            .await?;

        if self.unique_identifiers {
            sqlx::query(
                "INSERT INTO assignment_identifiers (identifier, assignment_id)
                 SELECT unnest($1::text[]), $2",
            )
            .bind(&new.identifiers)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row.into())
    }

    async fn query_eq(&self, field: LookupField, value: &str) -> StoreResult<Vec<Assignment>> {
        let sql = format!(
            "SELECT {} FROM assignments WHERE {} = $1 ORDER BY created_at DESC, id DESC",
            COLUMNS,
            field.column()
        );
        self.fetch(&sql, Some(value)).await
    }

    async fn query_contains(&self, identifier: &str) -> StoreResult<Vec<Assignment>> {
        let sql = format!(
            "SELECT {} FROM assignments WHERE identifiers @> ARRAY[$1]::text[] ORDER BY created_at DESC, id DESC",
            COLUMNS
        );
        self.fetch(&sql, Some(identifier)).await
    }
}
