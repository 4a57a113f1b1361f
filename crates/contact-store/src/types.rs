//! Contact types.

use crate::error::StoreError;
use crate::phone::normalize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique identifier of a stored contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(Uuid);

impl ContactId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ContactId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Records written before ids existed get a fresh one on load.
    #[serde(default)]
    pub id: ContactId,
    pub name: String,
    /// Canonical phone number (see [`normalize`])
    pub phone: String,
    #[serde(alias = "date")]
    pub created_at: DateTime<Utc>,
}

impl Contact {
    /// Build a contact from validated input, stamped with `created_at`.
    pub fn new(new: NewContact, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ContactId::new(),
            name: new.name,
            phone: new.phone,
            created_at,
        }
    }
}

/// A validated contact submission.
///
/// Only obtainable through [`NewContact::parse`], so the store never sees a
/// blank name or phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    name: String,
    phone: String,
}

impl NewContact {
    /// Trim and check both fields, then normalize the phone number.
    pub fn parse(name: &str, phone: &str) -> Result<Self, StoreError> {
        let name = name.trim();
        let phone = phone.trim();

        if name.is_empty() || phone.is_empty() {
            return Err(StoreError::Validation("Name and phone required".into()));
        }

        Ok(Self {
            name: name.to_string(),
            phone: normalize(phone),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical phone number.
    pub fn phone(&self) -> &str {
        &self.phone
    }
}
