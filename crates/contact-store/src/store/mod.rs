//! Contact store with interchangeable backings.

mod file;
mod list;
mod memory;
mod postgres;

pub use file::FileStore;
pub use list::ContactList;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::StoreError;
use crate::types::{Contact, NewContact};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Storage backend for contacts.
///
/// Reads never fail: a backing that cannot be read yields an empty result.
/// Writes report `StoreError::Unavailable` so the caller learns the contact
/// was not saved.
pub enum ContactStore {
    /// Flat JSON file
    File(FileStore),
    /// Postgres table
    Postgres(PgStore),
    /// In-memory only (no persistence)
    Memory(MemoryStore),
}

impl ContactStore {
    /// Open a flat-file store.
    pub async fn file(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(ContactStore::File(FileStore::open(path).await?))
    }

    /// Connect a Postgres store.
    pub async fn postgres(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        Ok(ContactStore::Postgres(
            PgStore::connect(database_url, max_connections).await?,
        ))
    }

    /// Create a memory store.
    pub fn memory() -> Self {
        ContactStore::Memory(MemoryStore::new())
    }

    /// Short name of the backing, for logs and health output.
    pub fn backend(&self) -> &'static str {
        match self {
            ContactStore::File(_) => "file",
            ContactStore::Postgres(_) => "postgres",
            ContactStore::Memory(_) => "memory",
        }
    }

    /// Store a new contact, failing with `DuplicatePhone` if its canonical
    /// phone number is already present.
    pub async fn add(&self, new: NewContact) -> Result<Contact, StoreError> {
        match self {
            ContactStore::File(s) => s.add(new).await,
            ContactStore::Postgres(s) => s.add(new).await,
            ContactStore::Memory(s) => s.add(new).await,
        }
    }

    /// All contacts in insertion order.
    pub async fn list_all(&self) -> Vec<Contact> {
        match self {
            ContactStore::File(s) => s.list_all().await,
            ContactStore::Postgres(s) => s.list_all().await,
            ContactStore::Memory(s) => s.list_all().await,
        }
    }

    pub async fn count(&self) -> usize {
        match self {
            ContactStore::File(s) => s.count().await,
            ContactStore::Postgres(s) => s.count().await,
            ContactStore::Memory(s) => s.count().await,
        }
    }

    /// Number of contacts created at or after `day_start`.
    pub async fn count_since(&self, day_start: DateTime<Utc>) -> usize {
        match self {
            ContactStore::File(s) => s.count_since(day_start).await,
            ContactStore::Postgres(s) => s.count_since(day_start).await,
            ContactStore::Memory(s) => s.count_since(day_start).await,
        }
    }

    pub(crate) async fn snapshot_counts(&self, since: DateTime<Utc>) -> (usize, usize) {
        match self {
            ContactStore::File(s) => s.snapshot_counts(since).await,
            ContactStore::Postgres(s) => s.snapshot_counts(since).await,
            ContactStore::Memory(s) => s.snapshot_counts(since).await,
        }
    }
}
