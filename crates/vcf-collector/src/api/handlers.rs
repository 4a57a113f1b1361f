//! HTTP request handlers.

use super::types::{AddContactRequest, AddContactResponse, ExportQuery, HealthResponse};
use super::AppState;
use crate::error::ApiError;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::header,
    response::IntoResponse,
    Json,
};
use contact_store::{ContactStats, NewContact, StoreError};
use tracing::{debug, error, info, warn};

const VCF_CONTENT_TYPE: &str = "text/vcard; charset=utf-8";
const VCF_DISPOSITION: &str = "attachment; filename=contacts.vcf";

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: state.store.backend().to_string(),
        contacts: state.store.count().await,
    })
}

/// Store a submitted contact.
pub async fn add_contact(
    State(state): State<AppState>,
    payload: Result<Json<AddContactRequest>, JsonRejection>,
) -> Result<Json<AddContactResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected contact body: {}", rejection);
            AddContactRequest::default()
        }
    };

    let new = NewContact::parse(
        request.name.as_deref().unwrap_or_default(),
        request.phone.as_deref().unwrap_or_default(),
    )?;

    match state.store.add(new).await {
        Ok(contact) => {
            info!(contact_id = %contact.id, "Contact stored");
            Ok(Json(AddContactResponse {
                success: true,
                contact,
            }))
        }
        Err(StoreError::DuplicatePhone(phone)) => {
            warn!(phone = %phone, "Duplicate contact submitted");
            Err(ApiError::DuplicatePhone(phone))
        }
        Err(e) => {
            error!("Failed to store contact: {}", e);
            Err(e.into())
        }
    }
}

/// Total and today's contact counts.
pub async fn contact_stats(State(state): State<AppState>) -> Json<ContactStats> {
    Json(state.store.stats().await)
}

/// Download all contacts as a vCard file.
///
/// An empty store exports as an empty file.
pub async fn export_contacts(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = match query {
        Ok(Query(query)) => query,
        // The rejection text can echo the query, so it is not logged.
        Err(_) => {
            debug!("Rejected malformed export query");
            ExportQuery::default()
        }
    };

    let authorized = query
        .password
        .as_deref()
        .is_some_and(|p| state.export_password.verify(p));

    if !authorized {
        warn!("Export attempted with wrong password");
        return Err(ApiError::Unauthorized);
    }

    let contacts = state.store.list_all().await;
    let vcf = contact_store::export(&contacts);

    info!(count = contacts.len(), "Contacts exported");

    Ok((
        [
            (header::CONTENT_TYPE, VCF_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, VCF_DISPOSITION),
        ],
        vcf,
    ))
}
