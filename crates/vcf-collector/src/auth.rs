//! Export password check.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Shared secret guarding the export endpoint.
///
/// Stored as a `SecretString` so it never shows up in logs or debug output.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub struct ExportPassword(SecretString);

impl ExportPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(SecretString::new(password.into()))
    }

    /// Compare a candidate against the configured password.
    ///
    /// Both sides are hashed first so the comparison runs over a fixed
    /// 32 bytes regardless of input length, and every byte is inspected.
    pub fn verify(&self, candidate: &str) -> bool {
        let expected = Sha256::digest(self.0.expose_secret().as_bytes());
        let provided = Sha256::digest(candidate.as_bytes());

        expected
            .iter()
            .zip(provided.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl From<String> for ExportPassword {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

impl std::fmt::Debug for ExportPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ExportPassword([REDACTED])")
    }
}
