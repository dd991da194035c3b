//! secp256k1 private keys with zeroized storage.

use std::fmt;
use std::sync::OnceLock;

use secp256k1::{All, Secp256k1, SecretKey};
use zeroize::Zeroizing;

use crate::shared::constants::PRIVATE_KEY_SIZE;
use crate::shared::error::{KeystoreError, KeystoreResult};

use super::public_key::PublicKey;

/// Process-wide secp256k1 context. Creating one is expensive, so every key
/// derivation shares it.
fn secp_context() -> &'static Secp256k1<All> {
    static CONTEXT: OnceLock<Secp256k1<All>> = OnceLock::new();
    CONTEXT.get_or_init(Secp256k1::new)
}

/// A secp256k1 private key plus the compression flag of its public key.
///
/// The scalar bytes are wiped when the key is dropped. The Debug output
/// never includes the scalar.
#[derive(Clone)]
pub struct PrivateKey {
    bytes: Zeroizing<[u8; PRIVATE_KEY_SIZE]>,
    compressed: bool,
}

impl PrivateKey {
    /// Construct from a 32-byte scalar, validating it is in range for the
    /// curve.
    pub fn from_bytes(bytes: &[u8], compressed: bool) -> KeystoreResult<Self> {
        let scalar: [u8; PRIVATE_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| KeystoreError::parameter("private key must be 32 bytes"))?;
        SecretKey::from_byte_array(scalar)
            .map_err(|e| KeystoreError::crypto(format!("invalid private key: {}", e)))?;
        Ok(Self {
            bytes: Zeroizing::new(scalar),
            compressed,
        })
    }

    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_SIZE] {
        &self.bytes
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Derive the matching public key, serialized per the compression flag.
    pub fn public_key(&self) -> PublicKey {
        // The scalar was range-checked on construction.
        let secret = SecretKey::from_byte_array(*self.bytes)
            .expect("scalar was validated on construction");
        let pubkey = secp256k1::PublicKey::from_secret_key(secp_context(), &secret);
        let bytes = if self.compressed {
            pubkey.serialize().to_vec()
        } else {
            pubkey.serialize_uncompressed().to_vec()
        };
        PublicKey::from_serialized(bytes)
    }

    /// Check that this key derives the given public key.
    pub fn verify_public_key(&self, pubkey: &PublicKey) -> bool {
        self.public_key() == *pubkey
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        *self.bytes == *other.bytes && self.compressed == other.compressed
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(compressed: {})", self.compressed)
    }
}
