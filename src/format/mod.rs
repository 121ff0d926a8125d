//! Message format handling for password-sealed data.
//!
//! Provides version-aware parsing and serialization of the header that
//! precedes every AEAD ciphertext.

use crate::crypto::{NONCE_LEN, SALT_LEN, ScryptParams};
use crate::error::{Error, Result};

pub mod v1;

/// Magic bytes identifying a sealed message ("PWSL").
pub const MAGIC: &[u8; 4] = b"PWSL";
/// Length of magic bytes.
pub const MAGIC_LEN: usize = 4;
/// Length of version field.
pub const VER_LEN: usize = 1;
/// Latest format version
pub const CURRENT_VERSION: u8 = v1::VERSION_V1;

/// Everything needed to re-derive the key and open the ciphertext.
///
/// The encoded header is also fed to the AEAD as associated data, so
/// any change to it fails authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Header {
    version: u8,
    kdf: ScryptParams,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
}

impl Header {
    /// Creates a header in the current format version.
    pub fn new(kdf: ScryptParams, salt: [u8; SALT_LEN], nonce: [u8; NONCE_LEN]) -> Self {
        Self {
            version: CURRENT_VERSION,
            kdf,
            salt,
            nonce,
        }
    }

    /// Returns the format version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the KDF parameters used for key derivation.
    pub fn kdf(&self) -> &ScryptParams {
        &self.kdf
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }
}

/// Parses the header of a sealed message.
///
/// Automatically dispatches to the appropriate version parser and returns
/// the header together with the offset where the ciphertext begins.
///
/// # Errors
///
/// Returns [`Error::MalformedCiphertext`] if:
/// - The message is too short
/// - The magic bytes are invalid
/// - The version is unsupported
/// - The cost parameters are out of bounds
pub(crate) fn parse(data: &[u8]) -> Result<(Header, usize)> {
    if data.len() < MAGIC_LEN + VER_LEN {
        return Err(malformed("message too short"));
    }

    if &data[..MAGIC_LEN] != MAGIC {
        return Err(malformed("invalid magic"));
    }

    match data[MAGIC_LEN] {
        v1::VERSION_V1 => v1::parse(data),
        version => Err(malformed(format!("unsupported version: {version}"))),
    }
}

/// Serializes a header to bytes.
pub(crate) fn serialize(header: &Header) -> Vec<u8> {
    // v1 is the only version a Header can be built with
    v1::serialize(header)
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedCiphertext(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_rejects_short_input() {
        assert!(matches!(parse(b"PWS"), Err(Error::MalformedCiphertext(_))));
    }

    #[test]
    fn dispatch_rejects_bad_magic() {
        let mut data = vec![0u8; 128];
        data[..4].copy_from_slice(b"KNST");
        data[4] = CURRENT_VERSION;
        assert!(matches!(parse(&data), Err(Error::MalformedCiphertext(_))));
    }

    #[test]
    fn dispatch_rejects_unknown_version() {
        let mut data = vec![0u8; 128];
        data[..4].copy_from_slice(MAGIC);
        data[4] = 99;
        assert!(matches!(parse(&data), Err(Error::MalformedCiphertext(_))));
    }
}
