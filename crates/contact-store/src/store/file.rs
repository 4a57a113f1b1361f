//! Flat JSON file storage.

use super::ContactList;
use crate::error::StoreError;
use crate::types::{Contact, NewContact};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Contact store persisted as a pretty-printed JSON array.
///
/// The whole collection lives in memory behind one lock. Every `add` holds
/// the write lock across the duplicate check, the insert and the flush, so
/// there is exactly one writer at a time. Reads never touch the disk.
pub struct FileStore {
    contacts: RwLock<ContactList>,
    storage_path: PathBuf,
}

impl FileStore {
    /// Open the store at `storage_path`, creating an empty file if missing.
    ///
    /// A file that cannot be read or parsed is treated as holding no
    /// contacts; it is overwritten by the next successful `add`.
    pub async fn open(storage_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let storage_path = storage_path.into();

        let contacts = if fs::try_exists(&storage_path).await? {
            load_records(&storage_path).await
        } else {
            let list = ContactList::new();
            write_records(&storage_path, list.as_slice()).await?;
            info!("Created empty contacts file at {:?}", storage_path);
            list
        };

        info!(
            "Loaded {} contacts from {:?}",
            contacts.count(),
            storage_path
        );

        Ok(Self {
            contacts: RwLock::new(contacts),
            storage_path,
        })
    }

    /// Add a contact and flush the collection to disk.
    ///
    /// If the flush fails the contact is removed again and the error is
    /// returned, so a failed write is never visible to readers.
    #[instrument(skip(self, new), fields(phone = %new.phone()))]
    pub async fn add(&self, new: NewContact) -> Result<Contact, StoreError> {
        let mut contacts = self.contacts.write().await;

        let contact = Contact::new(new, Utc::now());
        contacts.push(contact.clone())?;

        if let Err(e) = write_records(&self.storage_path, contacts.as_slice()).await {
            contacts.pop();
            warn!("Failed to persist contact, rolled back: {}", e);
            return Err(e);
        }

        debug!("Stored contact {} (total: {})", contact.id, contacts.count());
        Ok(contact)
    }

    pub async fn list_all(&self) -> Vec<Contact> {
        self.contacts.read().await.as_slice().to_vec()
    }

    pub async fn count(&self) -> usize {
        self.contacts.read().await.count()
    }

    pub async fn count_since(&self, since: DateTime<Utc>) -> usize {
        self.contacts.read().await.count_since(since)
    }

    /// Total and since-`since` counts taken under a single read lock.
    pub(crate) async fn snapshot_counts(&self, since: DateTime<Utc>) -> (usize, usize) {
        let contacts = self.contacts.read().await;
        (contacts.count(), contacts.count_since(since))
    }
}

async fn load_records(path: &Path) -> ContactList {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to read contacts file {:?}, starting empty: {}", path, e);
            return ContactList::new();
        }
    };

    match serde_json::from_slice::<Vec<Contact>>(&data) {
        Ok(records) => ContactList::from_records(records),
        Err(e) => {
            warn!("Contacts file {:?} is malformed, starting empty: {}", path, e);
            ContactList::new()
        }
    }
}

/// Write atomically using temp file + rename.
async fn write_records(path: &Path, records: &[Contact]) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &data).await?;
    fs::rename(&temp_path, path).await?;

    debug!("Wrote {} contacts ({} bytes) to {:?}", records.len(), data.len(), path);
    Ok(())
}
