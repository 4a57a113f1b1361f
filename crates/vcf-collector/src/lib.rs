//! VCF Collector - contact collection service.
//!
//! Accepts name/phone submissions over HTTP, stores them in a flat JSON
//! file or a Postgres table, reports counts, and exports the collected
//! contacts as vCard text behind a shared password.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

pub use auth::ExportPassword;
pub use config::Config;
pub use error::ApiError;
