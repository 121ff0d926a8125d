//! Cryptographic primitives.
//!
//! Provides scrypt key derivation and XChaCha20-Poly1305 encryption.

pub mod aead;
pub mod kdf;

pub use kdf::{Pepper, ScryptParams, derive, peppered};

/// Length of the salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the nonce (24 bytes for XChaCha20-Poly1305).
pub const NONCE_LEN: usize = 24;
/// Length of the AEAD encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the Poly1305 authentication tag.
pub const AEAD_TAG_LEN: usize = 16;
/// Length of one encoded cost parameter (4 bytes).
pub const PARAM_LEN: usize = 4;
/// Length of the SHA-256 integrity tag on envelopes.
pub const DIGEST_LEN: usize = 32;
/// Longest derived key an envelope may carry.
pub const MAX_KEY_LEN: usize = 1024;
