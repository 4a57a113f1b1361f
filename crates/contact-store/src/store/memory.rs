//! Non-persistent storage.

use super::ContactList;
use crate::error::StoreError;
use crate::types::{Contact, NewContact};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory store for testing or throwaway runs. Contacts are lost on
/// restart.
#[derive(Default)]
pub struct MemoryStore {
    contacts: RwLock<ContactList>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, new: NewContact) -> Result<Contact, StoreError> {
        let mut contacts = self.contacts.write().await;
        let contact = Contact::new(new, Utc::now());
        contacts.push(contact.clone())?;
        debug!("Memory store: added contact {}", contact.id);
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

    pub(crate) async fn snapshot_counts(&self, since: DateTime<Utc>) -> (usize, usize) {
        let contacts = self.contacts.read().await;
        (contacts.count(), contacts.count_since(since))
    }
}
