//! Ordered in-memory contact collection.

use crate::error::StoreError;
use crate::phone::normalize;
use crate::types::Contact;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::warn;

/// Contacts in insertion order, indexed by canonical phone number.
#[derive(Debug, Clone, Default)]
pub struct ContactList {
    contacts: Vec<Contact>,
    phones: HashSet<String>,
}

impl ContactList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from previously persisted records.
    ///
    /// Phones are re-normalized so that files written by older versions,
    /// which stored raw input, take part in duplicate detection.
    pub fn from_records(records: Vec<Contact>) -> Self {
        let mut list = Self::new();
        for mut contact in records {
            contact.phone = normalize(&contact.phone);
            if !list.phones.insert(contact.phone.clone()) {
                warn!(phone = %contact.phone, "Persisted data contains a duplicate phone number");
            }
            list.contacts.push(contact);
        }
        list
    }

    /// Check whether a canonical phone number is already stored.
    pub fn contains_phone(&self, phone: &str) -> bool {
        self.phones.contains(phone)
    }

    /// Append a contact, rejecting a phone number that is already present.
    pub fn push(&mut self, contact: Contact) -> Result<(), StoreError> {
        if self.contains_phone(&contact.phone) {
            return Err(StoreError::DuplicatePhone(contact.phone));
        }
        self.phones.insert(contact.phone.clone());
        self.contacts.push(contact);
        Ok(())
    }

    /// Remove the most recently pushed contact.
    pub fn pop(&mut self) -> Option<Contact> {
        let contact = self.contacts.pop()?;
        self.phones.remove(&contact.phone);
        Some(contact)
    }

    /// All contacts in insertion order.
    pub fn as_slice(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn count(&self) -> usize {
        self.contacts.len()
    }

    /// Number of contacts created at or after `since`.
    pub fn count_since(&self, since: DateTime<Utc>) -> usize {
        self.contacts
            .iter()
            .filter(|c| c.created_at >= since)
            .count()
    }
}
