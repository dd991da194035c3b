//! Error handling for the key store
//!
//! This module defines the error types used throughout the key store.

use thiserror::Error;

/// Result alias used throughout the key store.
pub type KeystoreResult<T> = Result<T, KeystoreError>;

/// Key store error type
///
/// Error kinds are deliberately coarse. The one failure that is not
/// representable here is an inconsistent encrypted store detected during
/// unlock, which aborts the process instead of returning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeystoreError {
    #[error("Parameter error: {0}")]
    Parameter(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),
}

impl KeystoreError {
    /// Create a parameter error
    pub fn parameter(message: impl Into<String>) -> Self {
        Self::Parameter(message.into())
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Create a cryptographic error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    /// Create an integrity error
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }

    /// Create a key-not-found error
    pub fn key_not_found(message: impl Into<String>) -> Self {
        Self::KeyNotFound(message.into())
    }
}

impl From<secp256k1::Error> for KeystoreError {
    fn from(err: secp256k1::Error) -> Self {
        Self::crypto(format!("Secp256k1 error: {}", err))
    }
}
