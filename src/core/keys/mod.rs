//! Key primitives
//!
//! secp256k1 private and public keys in the shapes the key store needs:
//! zeroized private scalars, serialized public keys and their 20-byte
//! identifiers.

pub mod private_key;
pub mod public_key;

// Re-export all public items from submodules
pub use private_key::*;
pub use public_key::*;
