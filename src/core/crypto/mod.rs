//! Cryptographic functionality for the key store
//!
//! This module provides the passphrase KDF, the AES-256-CBC crypter and the
//! per-secret encryption envelopes, along with the zeroizing buffer types
//! every secret travels in.

pub mod crypter;
pub mod envelope;
pub mod kdf;
pub mod keying_material;

// Re-export all public items from submodules
pub use crypter::*;
pub use envelope::*;
pub use kdf::*;
pub use keying_material::*;
