//! Message format v1.
//!
//! V1 Message Format:
//! ```text
//! MAGIC (4) | VERSION (1) | N (4) | R (4) | P (4) | SALT (16) | NONCE (24) | CIPHERTEXT + TAG (>= 16)
//! ```

use super::{Header, MAGIC, MAGIC_LEN, VER_LEN, malformed};
use crate::crypto::{AEAD_TAG_LEN, NONCE_LEN, PARAM_LEN, SALT_LEN, ScryptParams};
use crate::error::Result;

/// Current message format version.
pub const VERSION_V1: u8 = 1;

const PARAMS_LEN: usize = 3 * PARAM_LEN;

/// Length of the v1 header, which is also authenticated as associated data.
pub const HEADER_LEN: usize = MAGIC_LEN + VER_LEN + PARAMS_LEN + SALT_LEN + NONCE_LEN;

/// Parses a v1 message header.
///
/// # Errors
///
/// Returns an error if the message cannot hold a header plus an
/// authentication tag, or if the cost parameters are out of bounds.
pub fn parse(data: &[u8]) -> Result<(Header, usize)> {
    if data.len() < HEADER_LEN + AEAD_TAG_LEN {
        return Err(malformed("message too short for v1"));
    }

    let mut offset = MAGIC_LEN + VER_LEN;

    let mut params = [0u8; PARAMS_LEN];
    params.copy_from_slice(&data[offset..offset + PARAMS_LEN]);
    offset += PARAMS_LEN;

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&data[offset..offset + SALT_LEN]);
    offset += SALT_LEN;

    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&data[offset..offset + NONCE_LEN]);
    offset += NONCE_LEN;

    let kdf = ScryptParams::from_le_bytes(&params);
    if let Some(reason) = kdf.violation() {
        return Err(malformed(format!("invalid cost parameters: {reason}")));
    }

    Ok((
        Header {
            version: VERSION_V1,
            kdf,
            salt,
            nonce,
        },
        offset,
    ))
}

/// Serializes a header to v1 format bytes.
pub fn serialize(header: &Header) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN);

    buf.extend_from_slice(MAGIC);
    buf.push(VERSION_V1);
    buf.extend_from_slice(&header.kdf().to_le_bytes());
    buf.extend_from_slice(header.salt());
    buf.extend_from_slice(header.nonce());

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn with_tag_room(mut bytes: Vec<u8>) -> Vec<u8> {
        bytes.extend_from_slice(&[0u8; AEAD_TAG_LEN]);
        bytes
    }

    #[test]
    fn header_roundtrip() {
        let header = Header::new(
            ScryptParams::new(1 << 10, 4, 2).unwrap(),
            [1u8; SALT_LEN],
            [2u8; NONCE_LEN],
        );

        let bytes = with_tag_room(serialize(&header));
        let (parsed, offset) = parse(&bytes).unwrap();

        assert_eq!(offset, HEADER_LEN);
        assert_eq!(parsed, header);
        assert_eq!(parsed.kdf().n(), 1 << 10);
        assert_eq!(parsed.kdf().r(), 4);
        assert_eq!(parsed.kdf().p(), 2);
    }

    #[test]
    fn header_layout_is_stable() {
        let header = Header::new(ScryptParams::default(), [0xAA; SALT_LEN], [0xBB; NONCE_LEN]);
        let bytes = serialize(&header);

        assert_eq!(bytes.len(), 57);
        assert_eq!(&bytes[..5], b"PWSL\x01");
        assert_eq!(&bytes[5..17], &[0, 0x40, 0, 0, 8, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(&bytes[17..33], &[0xAA; SALT_LEN]);
        assert_eq!(&bytes[33..], &[0xBB; NONCE_LEN]);
    }

    #[test]
    fn header_without_tag_room_fails() {
        let header = Header::new(ScryptParams::default(), [0u8; SALT_LEN], [0u8; NONCE_LEN]);
        let bytes = serialize(&header);
        assert!(matches!(parse(&bytes), Err(Error::MalformedCiphertext(_))));
    }

    #[test]
    fn header_invalid_params_fail() {
        let header = Header::new(ScryptParams::default(), [0u8; SALT_LEN], [0u8; NONCE_LEN]);
        let mut bytes = with_tag_room(serialize(&header));
        // N = 0x4001, not a power of two
        bytes[5] = 1;
        assert!(matches!(parse(&bytes), Err(Error::MalformedCiphertext(_))));
    }
}
