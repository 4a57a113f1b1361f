//! Contact persistence and vCard export.
//!
//! Stores `{name, phone}` pairs with a uniqueness constraint on the
//! normalized phone number, either in a flat JSON file or in a Postgres
//! table, and serializes them to vCard 3.0 text.

mod error;
pub mod phone;
pub mod stats;
pub mod store;
mod types;
pub mod vcf;

pub use error::StoreError;
pub use phone::normalize;
pub use stats::{start_of_day, ContactStats};
pub use store::{ContactList, ContactStore, FileStore, MemoryStore, PgStore};
pub use types::*;
pub use vcf::export;
