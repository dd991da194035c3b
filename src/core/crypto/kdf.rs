//! Passphrase key derivation
//!
//! Derives the wallet master-key encryption key from a user passphrase.

use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::shared::constants::{WALLET_CRYPTO_IV_SIZE, WALLET_CRYPTO_KEY_SIZE};
use crate::shared::error::{KeystoreError, KeystoreResult};

use super::keying_material::SecretString;

/// Derive a 32-byte AES key and 16-byte IV from a passphrase and salt.
///
/// This mimics the behavior of OpenSSL's `EVP_BytesToKey` with an aes-256-cbc
/// cipher and sha512 message digest. Because sha512's output size (64 bytes)
/// is greater than the aes256 key size (32 bytes) plus the block size
/// (16 bytes), a single digest chain suffices and the general multi-block
/// loop is never entered. Existing wallets depend on this exact construction.
pub fn bytes_to_key_sha512_aes(
    passphrase: &SecretString,
    salt: &[u8],
    rounds: u32,
) -> KeystoreResult<(
    Zeroizing<[u8; WALLET_CRYPTO_KEY_SIZE]>,
    Zeroizing<[u8; WALLET_CRYPTO_IV_SIZE]>,
)> {
    if rounds == 0 {
        return Err(KeystoreError::parameter(
            "derivation rounds must be at least 1",
        ));
    }

    let mut buf = Zeroizing::new([0u8; 64]);
    let mut hasher = Sha512::new();
    hasher.update(passphrase.as_bytes());
    hasher.update(salt);
    buf.copy_from_slice(hasher.finalize().as_slice());

    for _ in 1..rounds {
        let mut hasher = Sha512::new();
        hasher.update(&buf[..]);
        buf.copy_from_slice(hasher.finalize().as_slice());
    }

    let mut key = Zeroizing::new([0u8; WALLET_CRYPTO_KEY_SIZE]);
    let mut iv = Zeroizing::new([0u8; WALLET_CRYPTO_IV_SIZE]);
    key.copy_from_slice(&buf[..WALLET_CRYPTO_KEY_SIZE]);
    iv.copy_from_slice(&buf[WALLET_CRYPTO_KEY_SIZE..WALLET_CRYPTO_KEY_SIZE + WALLET_CRYPTO_IV_SIZE]);

    Ok((key, iv))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_round_matches_one_sha512_digest() {
        let passphrase = SecretString::new("test");
        let salt = [0u8; 8];
        let (key, iv) = bytes_to_key_sha512_aes(&passphrase, &salt, 1)
            .expect("Failed to derive key");

        let mut hasher = Sha512::new();
        hasher.update(b"test");
        hasher.update(salt);
        let digest = hasher.finalize();

        assert_eq!(&key[..], &digest.as_slice()[..32]);
        assert_eq!(&iv[..], &digest.as_slice()[32..48]);
    }

    #[test]
    fn test_two_rounds_chain_the_digest() {
        let passphrase = SecretString::new("test");
        let salt = [0u8; 8];
        let (key, iv) = bytes_to_key_sha512_aes(&passphrase, &salt, 2)
            .expect("Failed to derive key");

        let mut hasher = Sha512::new();
        hasher.update(b"test");
        hasher.update(salt);
        let first = hasher.finalize();

        let mut hasher = Sha512::new();
        hasher.update(first.as_slice());
        let second = hasher.finalize();

        assert_eq!(&key[..], &second.as_slice()[..32]);
        assert_eq!(&iv[..], &second.as_slice()[32..48]);
    }

    #[test]
    fn test_deterministic() {
        let passphrase = SecretString::new("correct horse battery staple");
        let salt = [0x42u8; 8];

        let (key_a, iv_a) = bytes_to_key_sha512_aes(&passphrase, &salt, 25000)
            .expect("Failed to derive key");
        let (key_b, iv_b) = bytes_to_key_sha512_aes(&passphrase, &salt, 25000)
            .expect("Failed to derive key");

        assert_eq!(&key_a[..], &key_b[..]);
        assert_eq!(&iv_a[..], &iv_b[..]);
    }

    #[test]
    fn test_different_salt_changes_output() {
        let passphrase = SecretString::new("test");
        let (key_a, _) = bytes_to_key_sha512_aes(&passphrase, &[1u8; 8], 1)
            .expect("Failed to derive key");
        let (key_b, _) = bytes_to_key_sha512_aes(&passphrase, &[2u8; 8], 1)
            .expect("Failed to derive key");
        assert_ne!(&key_a[..], &key_b[..]);
    }

    #[test]
    fn test_zero_rounds_is_rejected() {
        let passphrase = SecretString::new("test");
        let result = bytes_to_key_sha512_aes(&passphrase, &[0u8; 8], 0);
        assert!(matches!(result, Err(KeystoreError::Parameter(_))));
    }
}
