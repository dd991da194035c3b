//! Serialized secp256k1 public keys and their identifiers.

use std::fmt;

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::shared::constants::{
    COMPRESSED_PUBLIC_KEY_SIZE, KEY_HASH_SIZE, KEY_ID_SIZE, PUBLIC_KEY_SIZE,
};
use crate::shared::error::{KeystoreError, KeystoreResult};

/// 20-byte identifier of a public key.
///
/// Computed as RIPEMD160(SHA256(serialized key)) and used as the map key
/// for every key record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId([u8; KEY_ID_SIZE]);

impl KeyId {
    pub fn from_bytes(bytes: [u8; KEY_ID_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_ID_SIZE] {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", hex::encode(self.0))
    }
}

/// A serialized secp256k1 public key, 33 bytes compressed or 65 bytes
/// uncompressed.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Parse and validate a serialized public key.
    pub fn from_slice(bytes: &[u8]) -> KeystoreResult<Self> {
        if bytes.len() != COMPRESSED_PUBLIC_KEY_SIZE && bytes.len() != PUBLIC_KEY_SIZE {
            return Err(KeystoreError::parameter(format!(
                "invalid public key length {}",
                bytes.len()
            )));
        }
        secp256k1::PublicKey::from_slice(bytes)
            .map_err(|e| KeystoreError::parameter(format!("invalid public key: {}", e)))?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Wrap bytes that are already a valid serialization.
    pub(crate) fn from_serialized(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_compressed(&self) -> bool {
        self.bytes.len() == COMPRESSED_PUBLIC_KEY_SIZE
    }

    /// The 20-byte identifier this key is filed under.
    pub fn id(&self) -> KeyId {
        let sha = Sha256::digest(&self.bytes);
        let rip = Ripemd160::digest(sha.as_slice());
        let mut out = [0u8; KEY_ID_SIZE];
        out.copy_from_slice(rip.as_slice());
        KeyId::from_bytes(out)
    }

    /// Double-SHA256 of the serialized key, used as the per-secret IV seed.
    pub fn hash(&self) -> [u8; KEY_HASH_SIZE] {
        let first = Sha256::digest(&self.bytes);
        let second = Sha256::digest(first.as_slice());
        let mut out = [0u8; KEY_HASH_SIZE];
        out.copy_from_slice(second.as_slice());
        out
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.bytes))
    }
}
