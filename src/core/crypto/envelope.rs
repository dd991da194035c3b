//! Per-secret encryption envelopes
//!
//! Every secret in the store is encrypted under the master key with an IV
//! derived from the identity of the secret itself: the public-key hash for
//! private keys, a double-SHA256 of a fixed ASCII label for the auxiliary
//! secrets. A ciphertext moved to a different record therefore fails to
//! decrypt.

use sha2::{Digest, Sha256};

use crate::core::keys::{PrivateKey, PublicKey};
use crate::shared::constants::{KEY_HASH_SIZE, PRIVATE_KEY_SIZE, WALLET_CRYPTO_IV_SIZE};
use crate::shared::error::{KeystoreError, KeystoreResult};

use super::crypter::Crypter;
use super::keying_material::KeyingMaterial;

/// SHA256(SHA256(s)). The empty string maps to all zeros.
pub fn double_hash_of_string(s: &str) -> [u8; KEY_HASH_SIZE] {
    let mut out = [0u8; KEY_HASH_SIZE];
    if s.is_empty() {
        return out;
    }
    let first = Sha256::digest(s.as_bytes());
    let second = Sha256::digest(first.as_slice());
    out.copy_from_slice(second.as_slice());
    out
}

/// Encrypt a secret under the master key. The IV is the first 16 bytes of
/// the 32-byte seed.
pub fn encrypt_secret(
    master_key: &KeyingMaterial,
    plaintext: &KeyingMaterial,
    iv_seed: &[u8; KEY_HASH_SIZE],
) -> KeystoreResult<Vec<u8>> {
    let mut crypter = Crypter::new();
    crypter.set_key(master_key, &iv_seed[..WALLET_CRYPTO_IV_SIZE])?;
    crypter.encrypt(plaintext)
}

/// Decrypt a secret encrypted with [`encrypt_secret`] under the same seed.
pub fn decrypt_secret(
    master_key: &KeyingMaterial,
    ciphertext: &[u8],
    iv_seed: &[u8; KEY_HASH_SIZE],
) -> KeystoreResult<KeyingMaterial> {
    let mut crypter = Crypter::new();
    crypter.set_key(master_key, &iv_seed[..WALLET_CRYPTO_IV_SIZE])?;
    crypter.decrypt(ciphertext)
}

/// Decrypt a private key and check it against the public key it is stored
/// under.
///
/// The decrypted scalar must be exactly 32 bytes and must re-derive the
/// given public key. This guards every read against swapped or tampered
/// records.
pub fn decrypt_key(
    master_key: &KeyingMaterial,
    ciphertext: &[u8],
    pubkey: &PublicKey,
) -> KeystoreResult<PrivateKey> {
    let secret = decrypt_secret(master_key, ciphertext, &pubkey.hash())?;
    if secret.len() != PRIVATE_KEY_SIZE {
        return Err(KeystoreError::integrity(
            "decrypted secret is not a 32-byte key",
        ));
    }
    let key = PrivateKey::from_bytes(secret.as_bytes(), pubkey.is_compressed())
        .map_err(|_| KeystoreError::integrity("decrypted secret is not a valid key"))?;
    if !key.verify_public_key(pubkey) {
        return Err(KeystoreError::integrity(
            "decrypted key does not match its public key",
        ));
    }
    Ok(key)
}
