//! Password-based key envelopes and password-keyed authenticated encryption.
//!
//! - [`envelope`]: derive a key from a password with scrypt and store it,
//!   with salt, cost parameters and a SHA-256 integrity tag, in one
//!   self-describing byte record that can verify candidate passwords later.
//! - [`cipher`]: seal and open messages under a password with
//!   XChaCha20-Poly1305, authenticating optional associated data.
//! - [`random`]: the OS-backed random source both of them draw from.
//!
//! Deployment settings (cost parameters, pepper) live in a [`Config`]
//! owned by the caller and passed in explicitly.

pub mod cipher;
pub mod config;
pub mod crypto;
pub mod envelope;
mod error;
mod format;
pub mod random;

pub use crate::config::Config;
pub use crate::crypto::{Pepper, ScryptParams};
pub use crate::envelope::{EnvelopeInfo, Format};
pub use crate::error::{Error, Result};

/// `length` bytes from the OS random generator.
pub fn generate_random(length: usize) -> Result<Vec<u8>> {
    random::generate(length)
}

/// Creates a v1 envelope for `password` using `config`.
pub fn create_envelope(password: &str, key_length: usize, config: &Config) -> Result<Vec<u8>> {
    envelope::create_with(password, key_length, config)
}

/// Checks `password` against a v1 envelope using the pepper in `config`.
pub fn verify_envelope(password: &str, envelope: &[u8], config: &Config) -> Result<bool> {
    envelope::verify_with(password, envelope, config)
}

/// Seals `plaintext` under `password`, authenticating `associated_data`.
pub fn aead_encrypt(
    password: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
    config: &Config,
) -> Result<Vec<u8>> {
    cipher::encrypt_with(password, plaintext, associated_data, config)
}

/// Opens a message from [`aead_encrypt`]; `associated_data` must match.
pub fn aead_decrypt(
    password: &[u8],
    ciphertext: &[u8],
    associated_data: &[u8],
    config: &Config,
) -> Result<zeroize::Zeroizing<Vec<u8>>> {
    cipher::decrypt_with(password, ciphertext, associated_data, config)
}
