//! Constants for the key store
//!
//! This module contains all constants used throughout the key store.

// Wallet encryption parameters. These values are persisted alongside each
// master-key record; changing any of them breaks existing wallets.
pub const WALLET_CRYPTO_KEY_SIZE: usize = 32;
pub const WALLET_CRYPTO_SALT_SIZE: usize = 8;
pub const WALLET_CRYPTO_IV_SIZE: usize = 16;

// AES-256-CBC block size
pub const AES_BLOCK_SIZE: usize = 16;

// secp256k1 key material
pub const PRIVATE_KEY_SIZE: usize = 32;
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;
pub const PUBLIC_KEY_SIZE: usize = 65;
pub const KEY_ID_SIZE: usize = 20;
pub const KEY_HASH_SIZE: usize = 32;

// Only derivation method 0 (iterated SHA-512, AES-256-CBC) is defined.
// Non-zero values are rejected rather than silently defaulted.
pub const DERIVATION_METHOD_SHA512_AES: u32 = 0;

// Domain-separation labels for the auxiliary secret envelopes. Also part of
// the persisted wallet format.
pub const PAPER_KEY_IV_LABEL: &str = "paperkey";
pub const PIN_CODE_IV_LABEL: &str = "pincode";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_constants() {
        assert_eq!(WALLET_CRYPTO_KEY_SIZE, 32);
        assert_eq!(WALLET_CRYPTO_SALT_SIZE, 8);
        assert_eq!(WALLET_CRYPTO_IV_SIZE, 16);
        assert_eq!(AES_BLOCK_SIZE, 16);
    }

    #[test]
    fn test_key_constants() {
        assert_eq!(PRIVATE_KEY_SIZE, 32);
        assert_eq!(KEY_ID_SIZE, 20);
        assert_eq!(KEY_HASH_SIZE, 32);
    }

    #[test]
    fn test_envelope_labels() {
        assert_eq!(PAPER_KEY_IV_LABEL, "paperkey");
        assert_eq!(PIN_CODE_IV_LABEL, "pincode");
    }
}
