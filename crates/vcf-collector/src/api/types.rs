//! API request and response types.

use contact_store::Contact;
use serde::{Deserialize, Serialize};

/// Contact submission. Both fields are optional here so that a missing
/// field is reported as a validation error rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct AddContactRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Response after storing a contact.
#[derive(Debug, Serialize)]
pub struct AddContactResponse {
    pub success: bool,
    pub contact: Contact,
}

/// Query string of the export endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub password: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub contacts: usize,
}
