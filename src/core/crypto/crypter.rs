//! AES-256-CBC encryption context
//!
//! Holds a fixed 32-byte key and 16-byte IV and encrypts or decrypts blobs
//! under them with PKCS#7 padding. The key material is wiped when the
//! crypter is dropped, and on every failure path, so a partially
//! initialized crypter is never observable.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use zeroize::{Zeroize, Zeroizing};

use crate::shared::constants::{
    AES_BLOCK_SIZE, DERIVATION_METHOD_SHA512_AES, WALLET_CRYPTO_IV_SIZE, WALLET_CRYPTO_KEY_SIZE,
    WALLET_CRYPTO_SALT_SIZE,
};
use crate::shared::error::{KeystoreError, KeystoreResult};

use super::kdf::bytes_to_key_sha512_aes;
use super::keying_material::{KeyingMaterial, SecretString};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Default KDF round count for newly encrypted wallets. Wallets on disk
/// carry their own count, tuned at encryption time.
pub const DEFAULT_DERIVE_ITERATIONS: u32 = 25_000;

/// A master key as the wallet database stores it: the master key encrypted
/// under a passphrase-derived key, next to the KDF parameters needed to
/// re-derive that key.
///
/// The field layout is part of the wallet format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MasterKeyRecord {
    pub crypted_key: Vec<u8>,
    pub salt: Vec<u8>,
    pub derivation_method: u32,
    pub derive_iterations: u32,
}

impl MasterKeyRecord {
    pub fn new(salt: Vec<u8>) -> Self {
        Self {
            crypted_key: Vec::new(),
            salt,
            derivation_method: DERIVATION_METHOD_SHA512_AES,
            derive_iterations: DEFAULT_DERIVE_ITERATIONS,
        }
    }
}

/// Symmetric encryption context for wallet secrets.
pub struct Crypter {
    key: Zeroizing<[u8; WALLET_CRYPTO_KEY_SIZE]>,
    iv: Zeroizing<[u8; WALLET_CRYPTO_IV_SIZE]>,
    key_set: bool,
}

impl Crypter {
    pub fn new() -> Self {
        Self {
            key: Zeroizing::new([0u8; WALLET_CRYPTO_KEY_SIZE]),
            iv: Zeroizing::new([0u8; WALLET_CRYPTO_IV_SIZE]),
            key_set: false,
        }
    }

    /// Derive the key and IV from a passphrase.
    ///
    /// `method` selects the derivation scheme; only
    /// [`DERIVATION_METHOD_SHA512_AES`] is defined and any other value is
    /// rejected.
    pub fn set_key_from_passphrase(
        &mut self,
        passphrase: &SecretString,
        salt: &[u8],
        rounds: u32,
        method: u32,
    ) -> KeystoreResult<()> {
        if rounds < 1 || salt.len() != WALLET_CRYPTO_SALT_SIZE {
            self.wipe();
            return Err(KeystoreError::parameter(format!(
                "need at least 1 round and an {}-byte salt",
                WALLET_CRYPTO_SALT_SIZE
            )));
        }
        if method != DERIVATION_METHOD_SHA512_AES {
            self.wipe();
            return Err(KeystoreError::parameter(format!(
                "unknown derivation method {}",
                method
            )));
        }

        match bytes_to_key_sha512_aes(passphrase, salt, rounds) {
            Ok((key, iv)) => {
                self.key.copy_from_slice(&key[..]);
                self.iv.copy_from_slice(&iv[..]);
                self.key_set = true;
                Ok(())
            }
            Err(err) => {
                self.wipe();
                Err(err)
            }
        }
    }

    /// Install an externally supplied key and IV.
    pub fn set_key(&mut self, key: &KeyingMaterial, iv: &[u8]) -> KeystoreResult<()> {
        if key.len() != WALLET_CRYPTO_KEY_SIZE || iv.len() != WALLET_CRYPTO_IV_SIZE {
            self.wipe();
            return Err(KeystoreError::parameter(format!(
                "key must be {} bytes and IV {} bytes",
                WALLET_CRYPTO_KEY_SIZE, WALLET_CRYPTO_IV_SIZE
            )));
        }
        self.key.copy_from_slice(key.as_bytes());
        self.iv.copy_from_slice(iv);
        self.key_set = true;
        Ok(())
    }

    pub fn is_key_set(&self) -> bool {
        self.key_set
    }

    /// Encrypt a secret. The ciphertext is one padding block longer than a
    /// block-aligned plaintext, so it is always strictly longer than the
    /// input.
    pub fn encrypt(&self, plaintext: &KeyingMaterial) -> KeystoreResult<Vec<u8>> {
        if !self.key_set {
            return Err(KeystoreError::crypto("cipher key has not been set"));
        }
        let cipher = Aes256CbcEnc::new_from_slices(&self.key[..], &self.iv[..])
            .map_err(|e| KeystoreError::crypto(format!("cipher init failed: {}", e)))?;
        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()))
    }

    /// Decrypt a ciphertext. Rejects anything that is not a whole number of
    /// blocks or whose padding does not verify.
    pub fn decrypt(&self, ciphertext: &[u8]) -> KeystoreResult<KeyingMaterial> {
        if !self.key_set {
            return Err(KeystoreError::crypto("cipher key has not been set"));
        }
        if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_SIZE != 0 {
            return Err(KeystoreError::crypto(
                "ciphertext length is not a whole number of blocks",
            ));
        }
        let cipher = Aes256CbcDec::new_from_slices(&self.key[..], &self.iv[..])
            .map_err(|e| KeystoreError::crypto(format!("cipher init failed: {}", e)))?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| KeystoreError::crypto("bad PKCS#7 padding"))?;
        Ok(KeyingMaterial::from(plaintext))
    }

    fn wipe(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
        self.key_set = false;
    }
}

impl Default for Crypter {
    fn default() -> Self {
        Self::new()
    }
}
