//! Wrappers for secret material that is wiped from memory on drop.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Byte buffer for keying material.
///
/// Holds passphrase-derived keys, master keys and decrypted secrets. The
/// backing storage is overwritten with zeros when the buffer is dropped or
/// cleared, and the `Debug` output never includes the contents.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyingMaterial(Vec<u8>);

impl KeyingMaterial {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wipe the contents. The buffer is empty afterwards.
    pub fn clear(&mut self) {
        self.0.zeroize();
    }
}

impl From<Vec<u8>> for KeyingMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for KeyingMaterial {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for KeyingMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyingMaterial({} bytes)", self.0.len())
    }
}

/// Owned secret string with the same wipe contract as [`KeyingMaterial`].
///
/// Used for passphrases, the paper key and the PIN code.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wipe the contents. The string is empty afterwards.
    pub fn clear(&mut self) {
        self.0.zeroize();
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString({} bytes)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keying_material_from_slice() {
        let material = KeyingMaterial::from_slice(&[1, 2, 3]);
        assert_eq!(material.as_bytes(), &[1, 2, 3]);
        assert_eq!(material.len(), 3);
        assert!(!material.is_empty());
    }

    #[test]
    fn test_keying_material_clear() {
        let mut material = KeyingMaterial::from_slice(&[0xAA; 32]);
        material.clear();
        assert!(material.is_empty());
    }

    #[test]
    fn test_keying_material_debug_is_redacted() {
        let material = KeyingMaterial::from_slice(&[0xAA; 4]);
        let output = format!("{:?}", material);
        assert_eq!(output, "KeyingMaterial(4 bytes)");
        assert!(!output.contains("170"));
        assert!(!output.to_lowercase().contains("aa"));
    }

    #[test]
    fn test_secret_string() {
        let secret = SecretString::new("hunter2");
        assert_eq!(secret.as_str(), "hunter2");
        assert_eq!(secret.len(), 7);
    }

    #[test]
    fn test_secret_string_clear() {
        let mut secret = SecretString::new("hunter2");
        secret.clear();
        assert!(secret.is_empty());
    }

    #[test]
    fn test_secret_string_debug_is_redacted() {
        let secret = SecretString::new("hunter2");
        let output = format!("{:?}", secret);
        assert!(!output.contains("hunter2"));
    }
}
