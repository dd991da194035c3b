//! Plaintext key store
//!
//! Holds private keys, watch-only public keys and the auxiliary wallet
//! secrets in the clear. [`super::CryptoKeyStore`] delegates here while the
//! wallet is not encrypted and keeps using the watch-only set afterwards.

use std::collections::BTreeMap;

use crate::core::crypto::SecretString;
use crate::core::keys::{KeyId, PrivateKey, PublicKey};

#[derive(Default)]
pub struct BasicKeyStore {
    keys: BTreeMap<KeyId, PrivateKey>,
    watch_keys: BTreeMap<KeyId, PublicKey>,
    paper_key: SecretString,
    pin_code: SecretString,
}

impl BasicKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_key_pubkey(&mut self, key: PrivateKey, pubkey: &PublicKey) {
        self.keys.insert(pubkey.id(), key);
    }

    pub fn get_key(&self, id: &KeyId) -> Option<PrivateKey> {
        self.keys.get(id).cloned()
    }

    /// Look up a public key, deriving it from the private key when we hold
    /// one and falling back to the watch-only set.
    pub fn get_pub_key(&self, id: &KeyId) -> Option<PublicKey> {
        if let Some(key) = self.keys.get(id) {
            return Some(key.public_key());
        }
        self.watch_keys.get(id).cloned()
    }

    pub fn have_key(&self, id: &KeyId) -> bool {
        self.keys.contains_key(id)
    }

    pub fn key_ids(&self) -> Vec<KeyId> {
        self.keys.keys().copied().collect()
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn keys(&self) -> &BTreeMap<KeyId, PrivateKey> {
        &self.keys
    }

    /// Drop all plaintext keys. Each scalar wipes itself on drop.
    pub(crate) fn clear_keys(&mut self) {
        self.keys.clear();
    }

    pub fn add_watch_only(&mut self, pubkey: PublicKey) {
        self.watch_keys.insert(pubkey.id(), pubkey);
    }

    pub fn have_watch_only(&self, id: &KeyId) -> bool {
        self.watch_keys.contains_key(id)
    }

    pub fn add_paper_key(&mut self, paper_key: SecretString) {
        self.paper_key = paper_key;
    }

    pub fn paper_key(&self) -> &SecretString {
        &self.paper_key
    }

    pub(crate) fn clear_paper_key(&mut self) {
        self.paper_key.clear();
    }

    pub fn add_pin_code(&mut self, pin_code: SecretString) {
        self.pin_code = pin_code;
    }

    pub fn pin_code(&self) -> &SecretString {
        &self.pin_code
    }

    pub(crate) fn clear_pin_code(&mut self) {
        self.pin_code.clear();
    }
}
