//! Encrypted key store
//!
//! A key store that starts out holding plaintext keys and can transition,
//! once and irreversibly, into an encrypted mode protected by a 32-byte
//! master key. While encrypted, every secret is held only as ciphertext;
//! the master key itself is resident only between a successful `unlock`
//! and the next `lock`.
//!
//! Every public operation dispatches on the encryption flag: plaintext
//! stores delegate to [`BasicKeyStore`], locked stores refuse, unlocked
//! stores encrypt or decrypt through the per-secret envelopes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::crypto::envelope::{
    decrypt_key, decrypt_secret, double_hash_of_string, encrypt_secret,
};
use crate::core::crypto::{KeyingMaterial, SecretString};
use crate::core::keys::{KeyId, PrivateKey, PublicKey};
use crate::shared::constants::{PAPER_KEY_IV_LABEL, PIN_CODE_IV_LABEL};
use crate::shared::error::{KeystoreError, KeystoreResult};

use super::basic_store::BasicKeyStore;

/// Lock state reported to status listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeystoreStatus {
    Locked,
    Unlocked,
}

/// Listener invoked after every successful lock or unlock, outside the
/// store lock.
pub type StatusChangedCallback = Arc<dyn Fn(KeystoreStatus) + Send + Sync>;

#[derive(Default)]
struct CryptoKeyStoreState {
    basic: BasicKeyStore,
    crypted_keys: BTreeMap<KeyId, (PublicKey, Vec<u8>)>,
    crypted_paper_key: Vec<u8>,
    crypted_pin_code: Vec<u8>,
    master_key: KeyingMaterial,
    use_crypto: bool,
    decryption_thoroughly_checked: bool,
}

impl CryptoKeyStoreState {
    fn is_crypted(&self) -> bool {
        self.use_crypto
    }

    fn is_locked(&self) -> bool {
        self.use_crypto && self.master_key.is_empty()
    }

    /// Promote the store to encrypted mode. Idempotent; refused while
    /// plaintext keys are present, since they would be unrecoverable
    /// afterwards.
    fn set_crypted(&mut self) -> KeystoreResult<()> {
        if self.use_crypto {
            return Ok(());
        }
        if self.basic.key_count() != 0 {
            return Err(KeystoreError::state("plaintext keys are still present"));
        }
        self.use_crypto = true;
        Ok(())
    }

    fn add_crypted_key(&mut self, pubkey: PublicKey, ciphertext: Vec<u8>) -> KeystoreResult<()> {
        self.set_crypted()?;
        self.crypted_keys.insert(pubkey.id(), (pubkey, ciphertext));
        Ok(())
    }

    fn get_paper_key(&self) -> KeystoreResult<SecretString> {
        // A transient plaintext copy takes precedence over the ciphertext.
        if !self.basic.paper_key().is_empty() {
            return Ok(self.basic.paper_key().clone());
        }
        if !self.is_crypted() {
            return Ok(self.basic.paper_key().clone());
        }
        if self.is_locked() {
            return Err(KeystoreError::state("store is locked"));
        }
        let plaintext = decrypt_secret(
            &self.master_key,
            &self.crypted_paper_key,
            &double_hash_of_string(PAPER_KEY_IV_LABEL),
        )?;
        secret_to_string(plaintext)
    }

    fn get_pin_code(&self) -> KeystoreResult<SecretString> {
        if !self.basic.pin_code().is_empty() {
            return Ok(self.basic.pin_code().clone());
        }
        if !self.is_crypted() {
            return Ok(self.basic.pin_code().clone());
        }
        if self.is_locked() {
            return Err(KeystoreError::state("store is locked"));
        }
        let plaintext = decrypt_secret(
            &self.master_key,
            &self.crypted_pin_code,
            &double_hash_of_string(PIN_CODE_IV_LABEL),
        )?;
        secret_to_string(plaintext)
    }
}

fn secret_to_string(secret: KeyingMaterial) -> KeystoreResult<SecretString> {
    let s = std::str::from_utf8(secret.as_bytes())
        .map_err(|_| KeystoreError::crypto("decrypted secret is not valid UTF-8"))?;
    Ok(SecretString::new(s))
}

/// Thread-safe key store with an optional encrypted mode.
pub struct CryptoKeyStore {
    state: Mutex<CryptoKeyStoreState>,
    status_changed: Mutex<Option<StatusChangedCallback>>,
}

impl CryptoKeyStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CryptoKeyStoreState::default()),
            status_changed: Mutex::new(None),
        }
    }

    fn state(&self) -> MutexGuard<'_, CryptoKeyStoreState> {
        self.state.lock().expect("key store lock poisoned")
    }

    /// Register the listener fired after every successful lock or unlock.
    pub fn set_status_changed(&self, callback: StatusChangedCallback) {
        *self
            .status_changed
            .lock()
            .expect("status listener lock poisoned") = Some(callback);
    }

    /// Fired with no lock held, so listeners may call back in, including
    /// re-registering themselves.
    fn notify_status_changed(&self, status: KeystoreStatus) {
        let listener = self
            .status_changed
            .lock()
            .expect("status listener lock poisoned")
            .clone();
        if let Some(callback) = listener {
            callback(status);
        }
    }

    pub fn is_crypted(&self) -> bool {
        self.state().is_crypted()
    }

    pub fn is_locked(&self) -> bool {
        self.state().is_locked()
    }

    /// Bulk transition from plaintext to encrypted under the given master
    /// key. One-way; the store comes out encrypted and unlocked.
    ///
    /// A failure mid-loop leaves the store encrypted with only part of the
    /// key set migrated. Callers are expected to discard the store in that
    /// case rather than retry.
    pub fn encrypt_keys(&self, master_key: &KeyingMaterial) -> KeystoreResult<()> {
        let mut state = self.state();
        if !state.crypted_keys.is_empty() || state.is_crypted() {
            return Err(KeystoreError::state("store is already encrypted"));
        }

        state.use_crypto = true;
        let keys: Vec<PrivateKey> = state.basic.keys().values().cloned().collect();
        for key in keys {
            let pubkey = key.public_key();
            let secret = KeyingMaterial::from_slice(&key.as_bytes()[..]);
            let ciphertext = encrypt_secret(master_key, &secret, &pubkey.hash())?;
            state.add_crypted_key(pubkey, ciphertext)?;
        }
        state.basic.clear_keys();
        state.master_key = master_key.clone();
        Ok(())
    }

    /// Clear the resident master key. Idempotent.
    pub fn lock(&self) -> KeystoreResult<()> {
        {
            let mut state = self.state();
            state.set_crypted()?;
            state.master_key.clear();
        }
        self.notify_status_changed(KeystoreStatus::Locked);
        Ok(())
    }

    /// Validate the master key against the stored ciphertexts and make it
    /// resident.
    ///
    /// The first unlock walks every encrypted key; once a full walk has
    /// passed, later unlocks stop at the first key that decrypts. A master
    /// key that decrypts some keys but not others means the wallet data is
    /// corrupted, and the process is aborted rather than continuing with a
    /// half-trusted key.
    pub fn unlock(&self, master_key: &KeyingMaterial) -> KeystoreResult<()> {
        {
            let mut state = self.state();
            state.set_crypted()?;

            let mut key_pass = false;
            let mut key_fail = false;
            for (pubkey, ciphertext) in state.crypted_keys.values() {
                match decrypt_key(master_key, ciphertext, pubkey) {
                    Ok(_) => {
                        key_pass = true;
                        if state.decryption_thoroughly_checked {
                            break;
                        }
                    }
                    Err(_) => {
                        key_fail = true;
                        break;
                    }
                }
            }
            if key_pass && key_fail {
                log::error!("The wallet is probably corrupted: some keys decrypt but not all");
                panic!("encrypted key store is inconsistent: some keys decrypt but not all");
            }
            if key_fail || !key_pass {
                return Err(KeystoreError::crypto(
                    "master key does not decrypt the stored keys",
                ));
            }
            state.master_key = master_key.clone();
            state.decryption_thoroughly_checked = true;
        }
        self.notify_status_changed(KeystoreStatus::Unlocked);
        Ok(())
    }

    /// Add a key with its public key, encrypting it first when the store
    /// is encrypted. Fails while locked.
    pub fn add_key_pubkey(&self, key: PrivateKey, pubkey: &PublicKey) -> KeystoreResult<()> {
        let mut state = self.state();
        if !state.is_crypted() {
            state.basic.add_key_pubkey(key, pubkey);
            return Ok(());
        }
        if state.is_locked() {
            return Err(KeystoreError::state("store is locked"));
        }
        let secret = KeyingMaterial::from_slice(&key.as_bytes()[..]);
        let ciphertext = encrypt_secret(&state.master_key, &secret, &pubkey.hash())?;
        state.add_crypted_key(pubkey.clone(), ciphertext)
    }

    /// Insert an already-encrypted key record, promoting the store to
    /// encrypted mode. The ciphertext is not verified here; the next full
    /// unlock walk checks it.
    pub fn add_crypted_key(&self, pubkey: PublicKey, ciphertext: Vec<u8>) -> KeystoreResult<()> {
        self.state().add_crypted_key(pubkey, ciphertext)
    }

    pub fn get_key(&self, id: &KeyId) -> KeystoreResult<PrivateKey> {
        let state = self.state();
        if !state.is_crypted() {
            return state
                .basic
                .get_key(id)
                .ok_or_else(|| KeystoreError::key_not_found(id.to_string()));
        }
        if state.is_locked() {
            return Err(KeystoreError::state("store is locked"));
        }
        match state.crypted_keys.get(id) {
            Some((pubkey, ciphertext)) => decrypt_key(&state.master_key, ciphertext, pubkey),
            None => Err(KeystoreError::key_not_found(id.to_string())),
        }
    }

    /// Look up a public key. Works while locked; falls back to the
    /// watch-only set when no key record exists.
    pub fn get_pub_key(&self, id: &KeyId) -> KeystoreResult<PublicKey> {
        let state = self.state();
        if !state.is_crypted() {
            return state
                .basic
                .get_pub_key(id)
                .ok_or_else(|| KeystoreError::key_not_found(id.to_string()));
        }
        if let Some((pubkey, _)) = state.crypted_keys.get(id) {
            return Ok(pubkey.clone());
        }
        state
            .basic
            .get_pub_key(id)
            .ok_or_else(|| KeystoreError::key_not_found(id.to_string()))
    }

    pub fn have_key(&self, id: &KeyId) -> bool {
        let state = self.state();
        if state.is_crypted() {
            state.crypted_keys.contains_key(id)
        } else {
            state.basic.have_key(id)
        }
    }

    pub fn key_ids(&self) -> Vec<KeyId> {
        let state = self.state();
        if state.is_crypted() {
            state.crypted_keys.keys().copied().collect()
        } else {
            state.basic.key_ids()
        }
    }

    pub fn add_watch_only(&self, pubkey: PublicKey) {
        self.state().basic.add_watch_only(pubkey);
    }

    /// Store the paper key, encrypting it when the store is encrypted.
    /// Fails while locked.
    pub fn add_paper_key(&self, paper_key: SecretString) -> KeystoreResult<()> {
        let mut state = self.state();
        if !state.is_crypted() {
            state.basic.add_paper_key(paper_key);
            return Ok(());
        }
        if state.is_locked() {
            return Err(KeystoreError::state("store is locked"));
        }
        let plaintext = KeyingMaterial::from_slice(paper_key.as_bytes());
        let ciphertext = encrypt_secret(
            &state.master_key,
            &plaintext,
            &double_hash_of_string(PAPER_KEY_IV_LABEL),
        )?;
        state.crypted_paper_key = ciphertext;
        Ok(())
    }

    pub fn get_paper_key(&self) -> KeystoreResult<SecretString> {
        self.state().get_paper_key()
    }

    /// Decrypt the paper key into the transient plaintext cache, where
    /// later reads find it without the master key.
    pub fn decrypt_paper_key(&self) -> KeystoreResult<()> {
        let mut state = self.state();
        let paper_key = state.get_paper_key()?;
        state.basic.add_paper_key(paper_key);
        Ok(())
    }

    /// One-shot transition used during initial wallet encryption: encrypt
    /// the current plaintext paper key under the given master key and wipe
    /// the plaintext copy.
    pub fn encrypt_paper_key(&self, master_key: &KeyingMaterial) -> KeystoreResult<()> {
        let mut state = self.state();
        if state.is_locked() {
            return Err(KeystoreError::state("store is locked"));
        }
        let paper_key = state.get_paper_key()?;
        let plaintext = KeyingMaterial::from_slice(paper_key.as_bytes());
        let ciphertext = encrypt_secret(
            master_key,
            &plaintext,
            &double_hash_of_string(PAPER_KEY_IV_LABEL),
        )?;
        state.crypted_paper_key = ciphertext;
        state.basic.clear_paper_key();
        Ok(())
    }

    /// Raw ciphertext write used by the persistence layer when loading an
    /// encrypted wallet.
    pub fn add_crypted_paper_key(&self, ciphertext: Vec<u8>) -> KeystoreResult<()> {
        let mut state = self.state();
        state.set_crypted()?;
        state.crypted_paper_key = ciphertext;
        Ok(())
    }

    /// Raw ciphertext read used by the persistence layer.
    pub fn crypted_paper_key(&self) -> KeystoreResult<Vec<u8>> {
        let state = self.state();
        if state.is_locked() {
            return Err(KeystoreError::state("store is locked"));
        }
        if state.crypted_paper_key.is_empty() {
            return Err(KeystoreError::key_not_found(
                "no encrypted paper key is stored",
            ));
        }
        Ok(state.crypted_paper_key.clone())
    }

    /// Store the PIN code, encrypting it when the store is encrypted.
    /// Fails while locked.
    pub fn add_pin_code(&self, pin_code: SecretString) -> KeystoreResult<()> {
        let mut state = self.state();
        if !state.is_crypted() {
            state.basic.add_pin_code(pin_code);
            return Ok(());
        }
        if state.is_locked() {
            return Err(KeystoreError::state("store is locked"));
        }
        let plaintext = KeyingMaterial::from_slice(pin_code.as_bytes());
        let ciphertext = encrypt_secret(
            &state.master_key,
            &plaintext,
            &double_hash_of_string(PIN_CODE_IV_LABEL),
        )?;
        state.crypted_pin_code = ciphertext;
        Ok(())
    }

    pub fn get_pin_code(&self) -> KeystoreResult<SecretString> {
        self.state().get_pin_code()
    }

    /// Decrypt the PIN code into the transient plaintext cache.
    pub fn decrypt_pin_code(&self) -> KeystoreResult<()> {
        let mut state = self.state();
        let pin_code = state.get_pin_code()?;
        state.basic.add_pin_code(pin_code);
        Ok(())
    }

    /// One-shot transition used during initial wallet encryption, mirroring
    /// [`Self::encrypt_paper_key`].
    pub fn encrypt_pin_code(&self, master_key: &KeyingMaterial) -> KeystoreResult<()> {
        let mut state = self.state();
        if state.is_locked() {
            return Err(KeystoreError::state("store is locked"));
        }
        let pin_code = state.get_pin_code()?;
        let plaintext = KeyingMaterial::from_slice(pin_code.as_bytes());
        let ciphertext = encrypt_secret(
            master_key,
            &plaintext,
            &double_hash_of_string(PIN_CODE_IV_LABEL),
        )?;
        state.crypted_pin_code = ciphertext;
        state.basic.clear_pin_code();
        Ok(())
    }

    pub fn add_crypted_pin_code(&self, ciphertext: Vec<u8>) -> KeystoreResult<()> {
        let mut state = self.state();
        state.set_crypted()?;
        state.crypted_pin_code = ciphertext;
        Ok(())
    }

    pub fn crypted_pin_code(&self) -> KeystoreResult<Vec<u8>> {
        let state = self.state();
        if state.is_locked() {
            return Err(KeystoreError::state("store is locked"));
        }
        if state.crypted_pin_code.is_empty() {
            return Err(KeystoreError::key_not_found(
                "no encrypted PIN code is stored",
            ));
        }
        Ok(state.crypted_pin_code.clone())
    }
}

impl Default for CryptoKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn test_key(byte: u8) -> (PrivateKey, PublicKey) {
        let key = PrivateKey::from_bytes(&[byte; 32], true).expect("Failed to build key");
        let pubkey = key.public_key();
        (key, pubkey)
    }

    fn master() -> KeyingMaterial {
        KeyingMaterial::from_slice(&[0u8; 32])
    }

    fn other_master() -> KeyingMaterial {
        KeyingMaterial::from_slice(&[0x07u8; 32])
    }

    fn encrypted_store(key_bytes: &[u8]) -> (CryptoKeyStore, Vec<(PrivateKey, PublicKey)>) {
        let store = CryptoKeyStore::new();
        let mut keys = Vec::new();
        for &byte in key_bytes {
            let (key, pubkey) = test_key(byte);
            store
                .add_key_pubkey(key.clone(), &pubkey)
                .expect("Failed to add key");
            keys.push((key, pubkey));
        }
        store.encrypt_keys(&master()).expect("Failed to encrypt keys");
        (store, keys)
    }

    #[test]
    fn test_uncrypted_add_and_get() {
        let store = CryptoKeyStore::new();
        let (key, pubkey) = test_key(0x01);

        store
            .add_key_pubkey(key.clone(), &pubkey)
            .expect("Failed to add key");

        assert!(!store.is_crypted());
        assert!(!store.is_locked());
        assert!(store.have_key(&pubkey.id()));
        assert_eq!(store.get_key(&pubkey.id()).expect("Failed to get key"), key);
        assert_eq!(
            store
                .get_pub_key(&pubkey.id())
                .expect("Failed to get public key"),
            pubkey
        );
    }

    #[test]
    fn test_bulk_encrypt_then_lock_and_unlock() {
        let (store, keys) = encrypted_store(&[0x01, 0x02, 0x03]);

        assert!(store.is_crypted());
        assert!(!store.is_locked());
        assert_eq!(store.key_ids().len(), 3);
        for (key, pubkey) in &keys {
            assert_eq!(
                store.get_key(&pubkey.id()).expect("Failed to get key"),
                *key
            );
        }

        store.lock().expect("Failed to lock");
        assert!(store.is_locked());
        for (_, pubkey) in &keys {
            assert!(store.get_key(&pubkey.id()).is_err());
        }

        assert!(store.unlock(&other_master()).is_err());
        assert!(store.is_locked());

        store.unlock(&master()).expect("Failed to unlock");
        assert!(!store.is_locked());
        for (key, pubkey) in &keys {
            assert_eq!(
                store.get_key(&pubkey.id()).expect("Failed to get key"),
                *key
            );
        }
    }

    #[test]
    fn test_encrypt_keys_is_one_way() {
        let (store, _) = encrypted_store(&[0x01]);

        let result = store.encrypt_keys(&other_master());
        assert!(matches!(result, Err(KeystoreError::State(_))));
        assert!(store.is_crypted());
    }

    #[test]
    fn test_encrypt_keys_reproduces_the_original_key_set() {
        let (store, keys) = encrypted_store(&[0x05, 0x06, 0x07, 0x08]);

        let mut expected: Vec<KeyId> = keys.iter().map(|(_, p)| p.id()).collect();
        expected.sort();
        assert_eq!(store.key_ids(), expected);
        for (key, pubkey) in &keys {
            assert_eq!(
                store.get_key(&pubkey.id()).expect("Failed to get key"),
                *key
            );
        }
    }

    #[test]
    fn test_add_key_while_locked_fails() {
        let (store, _) = encrypted_store(&[0x01]);
        store.lock().expect("Failed to lock");

        let (key, pubkey) = test_key(0x02);
        let result = store.add_key_pubkey(key, &pubkey);
        assert!(matches!(result, Err(KeystoreError::State(_))));
    }

    #[test]
    fn test_add_key_while_unlocked_is_readable() {
        let (store, _) = encrypted_store(&[0x01]);

        let (key, pubkey) = test_key(0x02);
        store
            .add_key_pubkey(key.clone(), &pubkey)
            .expect("Failed to add key");
        assert_eq!(store.get_key(&pubkey.id()).expect("Failed to get key"), key);
    }

    #[test]
    fn test_promotion_with_plaintext_keys_is_refused() {
        let store = CryptoKeyStore::new();
        let (key, pubkey) = test_key(0x01);
        store.add_key_pubkey(key, &pubkey).expect("Failed to add key");

        let (_, foreign) = test_key(0x02);
        let result = store.add_crypted_key(foreign, vec![0u8; 48]);
        assert!(matches!(result, Err(KeystoreError::State(_))));
        assert!(!store.is_crypted());
    }

    #[test]
    fn test_unlock_without_keys_fails() {
        let store = CryptoKeyStore::new();
        store.lock().expect("Failed to lock");
        assert!(store.unlock(&master()).is_err());
    }

    #[test]
    #[should_panic(expected = "some keys decrypt but not all")]
    fn test_unlock_aborts_when_only_some_keys_decrypt() {
        let store = CryptoKeyStore::new();

        let (key, pubkey) = test_key(0x01);
        let secret = KeyingMaterial::from_slice(&key.as_bytes()[..]);
        let ciphertext =
            encrypt_secret(&master(), &secret, &pubkey.hash()).expect("Failed to encrypt");
        store
            .add_crypted_key(pubkey.clone(), ciphertext)
            .expect("Failed to add crypted key");

        // A record that does not decrypt, filed after the good one so the
        // unlock walk sees a success before the failure.
        let foreign = (0x02u8..=0x20)
            .map(|byte| test_key(byte).1)
            .find(|candidate| candidate.id() > pubkey.id())
            .expect("Failed to find a key id sorting after the good one");
        store
            .add_crypted_key(foreign, vec![0x55u8; 48])
            .expect("Failed to add crypted key");

        let _ = store.unlock(&master());
    }

    #[test]
    fn test_get_pub_key_works_while_locked() {
        let (store, keys) = encrypted_store(&[0x01]);
        store.lock().expect("Failed to lock");

        let (_, pubkey) = &keys[0];
        assert_eq!(
            store
                .get_pub_key(&pubkey.id())
                .expect("Failed to get public key"),
            *pubkey
        );
    }

    #[test]
    fn test_watch_only_fallback() {
        let (store, _) = encrypted_store(&[0x01]);
        let (_, watched) = test_key(0x09);

        store.add_watch_only(watched.clone());
        assert_eq!(
            store
                .get_pub_key(&watched.id())
                .expect("Failed to get public key"),
            watched
        );
        assert!(store.get_key(&watched.id()).is_err());
    }

    #[test]
    fn test_paper_key_envelope() {
        let (store, _) = encrypted_store(&[0x01]);

        store
            .add_paper_key(SecretString::new("correct horse battery staple"))
            .expect("Failed to add paper key");

        let ciphertext = store
            .crypted_paper_key()
            .expect("Failed to read encrypted paper key");
        assert!(!ciphertext.is_empty());

        assert_eq!(
            store.get_paper_key().expect("Failed to get paper key").as_str(),
            "correct horse battery staple"
        );

        store.lock().expect("Failed to lock");
        assert!(store.get_paper_key().is_err());

        store.unlock(&master()).expect("Failed to unlock");
        assert_eq!(
            store.get_paper_key().expect("Failed to get paper key").as_str(),
            "correct horse battery staple"
        );
    }

    #[test]
    fn test_add_paper_key_while_locked_fails() {
        let (store, _) = encrypted_store(&[0x01]);
        store.lock().expect("Failed to lock");
        assert!(store
            .add_paper_key(SecretString::new("too late"))
            .is_err());
    }

    #[test]
    fn test_encrypt_paper_key_migrates_the_plaintext_copy() {
        let store = CryptoKeyStore::new();
        store
            .add_paper_key(SecretString::new("correct horse battery staple"))
            .expect("Failed to add paper key");

        let (key, pubkey) = test_key(0x01);
        store.add_key_pubkey(key, &pubkey).expect("Failed to add key");
        store.encrypt_keys(&master()).expect("Failed to encrypt keys");

        // The paper key is still only a plaintext copy at this point.
        store
            .encrypt_paper_key(&master())
            .expect("Failed to encrypt paper key");

        store.lock().expect("Failed to lock");
        assert!(store.get_paper_key().is_err());

        store.unlock(&master()).expect("Failed to unlock");
        assert_eq!(
            store.get_paper_key().expect("Failed to get paper key").as_str(),
            "correct horse battery staple"
        );
    }

    #[test]
    fn test_decrypt_paper_key_caches_the_plaintext() {
        let (store, _) = encrypted_store(&[0x01]);
        store
            .add_paper_key(SecretString::new("correct horse battery staple"))
            .expect("Failed to add paper key");

        store.decrypt_paper_key().expect("Failed to decrypt paper key");
        store.lock().expect("Failed to lock");

        // The transient plaintext copy is served even while locked.
        assert_eq!(
            store.get_paper_key().expect("Failed to get paper key").as_str(),
            "correct horse battery staple"
        );
    }

    #[test]
    fn test_pin_code_envelope() {
        let (store, _) = encrypted_store(&[0x01]);

        store
            .add_pin_code(SecretString::new("123456"))
            .expect("Failed to add PIN code");
        assert!(!store
            .crypted_pin_code()
            .expect("Failed to read encrypted PIN code")
            .is_empty());

        store.lock().expect("Failed to lock");
        assert!(store.get_pin_code().is_err());
        assert!(store.add_pin_code(SecretString::new("654321")).is_err());

        store.unlock(&master()).expect("Failed to unlock");
        assert_eq!(
            store.get_pin_code().expect("Failed to get PIN code").as_str(),
            "123456"
        );
    }

    #[test]
    fn test_crypted_blob_round_trip_through_persistence_accessors() {
        let (store, _) = encrypted_store(&[0x01]);
        store
            .add_paper_key(SecretString::new("correct horse battery staple"))
            .expect("Failed to add paper key");
        let blob = store
            .crypted_paper_key()
            .expect("Failed to read encrypted paper key");

        let reloaded = CryptoKeyStore::new();
        reloaded
            .add_crypted_paper_key(blob)
            .expect("Failed to load encrypted paper key");
        assert!(reloaded.is_crypted());
        assert!(reloaded.get_paper_key().is_err());
    }

    #[test]
    fn test_status_listener_fires_on_lock_and_unlock() {
        let (store, _) = encrypted_store(&[0x01]);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.set_status_changed(Arc::new(move |status| {
            sink.lock().expect("Failed to record event").push(status);
        }));

        store.lock().expect("Failed to lock");
        assert!(store.unlock(&other_master()).is_err());
        store.unlock(&master()).expect("Failed to unlock");

        let seen = events.lock().expect("Failed to read events").clone();
        assert_eq!(seen, vec![KeystoreStatus::Locked, KeystoreStatus::Unlocked]);
    }

    #[test]
    fn test_status_listener_may_call_back_into_the_store() {
        let (store, keys) = encrypted_store(&[0x01]);
        let store = Arc::new(store);
        let (_, pubkey) = keys[0].clone();

        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        let handle = Arc::clone(&store);
        store.set_status_changed(Arc::new(move |status| {
            // Listeners are allowed to read the store from the callback.
            let readable = handle.get_key(&pubkey.id()).is_ok();
            sink.lock()
                .expect("Failed to record event")
                .push((status, readable));
        }));

        store.lock().expect("Failed to lock");
        store.unlock(&master()).expect("Failed to unlock");

        let seen = observed.lock().expect("Failed to read events").clone();
        assert_eq!(
            seen,
            vec![
                (KeystoreStatus::Locked, false),
                (KeystoreStatus::Unlocked, true)
            ]
        );
    }

    #[test]
    fn test_store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CryptoKeyStore>();
    }
}
