//! PayVault Wallet Core
//!
//! Encrypted key store for the PayVault wallet.
//! Holds secp256k1 private keys plus the paper-key and PIN-code secrets,
//! either in the clear or encrypted under a passphrase-derived master key.
//!
//! ## Architecture
//!
//! This library follows a simplified architecture focused on core
//! functionality:
//!
//! - **Core**: crypto primitives, key types, plaintext and encrypted stores
//! - **Shared**: common error types and constants
//!
//! ## Security Features
//!
//! - Secret buffers are wiped from memory on drop, on failure paths too
//! - Every stored ciphertext is bound to the identity of its secret
//! - Unlock refuses a master key that decrypts only part of the store
//!
//! ## Usage
//!
//! ```
//! use payvault_wallet_core::{CryptoKeyStore, KeyingMaterial, PrivateKey};
//!
//! let store = CryptoKeyStore::new();
//! let key = PrivateKey::from_bytes(&[1u8; 32], true)?;
//! let pubkey = key.public_key();
//! store.add_key_pubkey(key, &pubkey)?;
//!
//! let master = KeyingMaterial::from_slice(&[0x42u8; 32]);
//! store.encrypt_keys(&master)?;
//! store.lock()?;
//! store.unlock(&master)?;
//! assert!(store.get_key(&pubkey.id()).is_ok());
//! # Ok::<(), payvault_wallet_core::KeystoreError>(())
//! ```

pub mod core;
pub mod shared;

// Re-export main types
pub use crate::core::crypto::{Crypter, KeyingMaterial, MasterKeyRecord, SecretString};
pub use crate::core::keys::{KeyId, PrivateKey, PublicKey};
pub use crate::core::keystore::{
    BasicKeyStore, CryptoKeyStore, KeystoreStatus, StatusChangedCallback,
};
pub use crate::shared::error::{KeystoreError, KeystoreResult};

/// Initialize logging for binaries and tests that want it.
pub fn init() {
    let _ = env_logger::Builder::from_default_env().try_init();
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
