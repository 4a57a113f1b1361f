//! Postgres storage.

use crate::error::StoreError;
use crate::types::{Contact, ContactId, NewContact};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Schema version marker written to the settings table.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const CREATE_SETTINGS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )";

// `seq` only provides insertion order.
const CREATE_CONTACTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS contacts (
        seq BIGSERIAL PRIMARY KEY,
        id UUID NOT NULL UNIQUE,
        name TEXT NOT NULL,
        phone TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )";

// Fails when an older `contacts` table lacks the columns this store uses.
const CHECK_CONTACTS_COLUMNS: &str =
    "SELECT seq, id, name, phone, created_at FROM contacts LIMIT 0";

const INSERT_APP_VERSION: &str = "
    INSERT INTO settings (key, value)
    VALUES ('app_version', $1)
    ON CONFLICT (key) DO NOTHING";

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    name: String,
    phone: String,
    created_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

/// Contact store backed by a single Postgres table.
///
/// Phone uniqueness is enforced by the table's `UNIQUE` constraint, so
/// concurrent inserts of the same phone cannot both succeed.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to `database_url` and create the schema if needed.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = PgConnectOptions::from_str(database_url)?;
        Self::connect_with(options, max_connections).await
    }

    /// Connect with explicit options and create the schema if needed.
    pub async fn connect_with(
        options: PgConnectOptions,
        max_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        info!(
            "Database ready (app_version={})",
            store.app_version().await.as_deref().unwrap_or("unknown")
        );
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        debug!("Setting up database schema");
        sqlx::query(CREATE_SETTINGS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_CONTACTS_TABLE).execute(&self.pool).await?;
        sqlx::query(CHECK_CONTACTS_COLUMNS)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StoreError::Unavailable(format!(
                    "contacts table has an incompatible schema: {}",
                    e
                ))
            })?;
        sqlx::query(INSERT_APP_VERSION)
            .bind(APP_VERSION)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// The version marker stored in the settings table.
    pub async fn app_version(&self) -> Option<String> {
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'app_version'")
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to read app_version: {}", e);
                None
            })
    }

    #[instrument(skip(self, new), fields(phone = %new.phone()))]
    pub async fn add(&self, new: NewContact) -> Result<Contact, StoreError> {
        let row: ContactRow = sqlx::query_as(
            "INSERT INTO contacts (id, name, phone, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, phone, created_at",
        )
        .bind(ContactId::new().as_uuid())
        .bind(new.name())
        .bind(new.phone())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicatePhone(new.phone().to_string())
            }
            _ => StoreError::from(e),
        })?;

        debug!("Stored contact {}", row.id);
        Ok(row.into())
    }

    pub async fn list_all(&self) -> Vec<Contact> {
        let rows: Result<Vec<ContactRow>, _> = sqlx::query_as(
            "SELECT id, name, phone, created_at FROM contacts ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await;

        match rows {
            Ok(rows) => rows.into_iter().map(Contact::from).collect(),
            Err(e) => {
                warn!("Failed to list contacts, returning none: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn count(&self) -> usize {
        let count: Result<i64, _> = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await;

        count.map(to_usize).unwrap_or_else(|e| {
            warn!("Failed to count contacts: {}", e);
            0
        })
    }

    pub async fn count_since(&self, since: DateTime<Utc>) -> usize {
        let count: Result<i64, _> =
            sqlx::query_scalar("SELECT COUNT(*) FROM contacts WHERE created_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await;

        count.map(to_usize).unwrap_or_else(|e| {
            warn!("Failed to count recent contacts: {}", e);
            0
        })
    }

    /// Both counts from one statement, so they share a snapshot.
    pub(crate) async fn snapshot_counts(&self, since: DateTime<Utc>) -> (usize, usize) {
        let counts: Result<(i64, i64), _> = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE created_at >= $1) FROM contacts",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await;

        match counts {
            Ok((total, recent)) => (to_usize(total), to_usize(recent)),
            Err(e) => {
                warn!("Failed to compute contact stats: {}", e);
                (0, 0)
            }
        }
    }
}

fn to_usize(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}
