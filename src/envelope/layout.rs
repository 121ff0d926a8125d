//! Byte layouts of the derived-key envelope.
//!
//! ```text
//! V1:            VERSION (1) | KEY (L) | SALT (16) | N (4) | R (4) | P (4) | SHA-256 (32)
//! LegacyTagged:                KEY (L) | SALT (16) | N (4) | R (4) | P (4) | SHA-256 (32)
//! LegacyPlain:                 KEY (L) | SALT (16) | N (4) | R (4) | P (4)
//! ```
//!
//! Integers are little-endian. The digest covers every byte before it.

use sha2::{Digest, Sha256};

use crate::crypto::{DIGEST_LEN, MAX_KEY_LEN, PARAM_LEN, SALT_LEN, ScryptParams};
use crate::error::{Error, Result};

/// Leading byte of a [`Format::V1`] envelope.
pub const VERSION_V1: u8 = 1;

const PARAMS_LEN: usize = 3 * PARAM_LEN;

/// Envelope layout. Never inferred from length: legacy records must be
/// named explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Version byte, key, salt, params, SHA-256 tag.
    #[default]
    V1,
    /// Unversioned key, salt, params, SHA-256 tag.
    LegacyTagged,
    /// Unversioned key, salt, params.
    LegacyPlain,
}

impl Format {
    fn prefix_len(self) -> usize {
        match self {
            Format::V1 => 1,
            Format::LegacyTagged | Format::LegacyPlain => 0,
        }
    }

    fn tag_len(self) -> usize {
        match self {
            Format::V1 | Format::LegacyTagged => DIGEST_LEN,
            Format::LegacyPlain => 0,
        }
    }

    /// Bytes an envelope carries besides the derived key.
    pub fn overhead(self) -> usize {
        self.prefix_len() + SALT_LEN + PARAMS_LEN + self.tag_len()
    }

    pub fn has_integrity_tag(self) -> bool {
        self.tag_len() > 0
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::V1 => write!(f, "v1"),
            Format::LegacyTagged => write!(f, "legacy-tagged"),
            Format::LegacyPlain => write!(f, "legacy-plain"),
        }
    }
}

/// A structurally valid envelope, borrowed from its bytes.
#[derive(Debug)]
pub(crate) struct Decoded<'a> {
    pub key: &'a [u8],
    pub salt: &'a [u8],
    pub params: ScryptParams,
    /// Bytes covered by the integrity tag.
    pub signed: &'a [u8],
    pub tag: Option<&'a [u8]>,
}

pub(crate) fn digest(bytes: &[u8]) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}

pub(crate) fn encode(format: Format, key: &[u8], salt: &[u8], params: &ScryptParams) -> Vec<u8> {
    let mut buf = Vec::with_capacity(key.len() + format.overhead());

    if format == Format::V1 {
        buf.push(VERSION_V1);
    }
    buf.extend_from_slice(key);
    buf.extend_from_slice(salt);
    buf.extend_from_slice(&params.to_le_bytes());

    if format.has_integrity_tag() {
        let tag = digest(&buf);
        buf.extend_from_slice(&tag);
    }

    buf
}

/// Splits an envelope into its fields, mirroring [`encode`].
///
/// Only structure is checked here; the tag is left for the caller to
/// compare after derivation.
pub(crate) fn decode(format: Format, bytes: &[u8]) -> Result<Decoded<'_>> {
    let overhead = format.overhead();
    if bytes.len() <= overhead {
        return Err(malformed(format!(
            "{format} envelope needs more than {overhead} bytes, got {}",
            bytes.len()
        )));
    }

    if format == Format::V1 && bytes[0] != VERSION_V1 {
        return Err(malformed(format!(
            "unsupported envelope version: {}",
            bytes[0]
        )));
    }

    let key_len = bytes.len() - overhead;
    if key_len > MAX_KEY_LEN {
        return Err(malformed(format!(
            "key length {key_len} exceeds {MAX_KEY_LEN}"
        )));
    }

    let mut offset = format.prefix_len();

    let key = &bytes[offset..offset + key_len];
    offset += key_len;

    let salt = &bytes[offset..offset + SALT_LEN];
    offset += SALT_LEN;

    let mut raw = [0u8; PARAMS_LEN];
    raw.copy_from_slice(&bytes[offset..offset + PARAMS_LEN]);
    offset += PARAMS_LEN;

    let params = ScryptParams::from_le_bytes(&raw);
    if let Some(reason) = params.violation() {
        return Err(malformed(format!("invalid cost parameters: {reason}")));
    }

    let (signed, rest) = bytes.split_at(offset);
    let tag = format.has_integrity_tag().then_some(rest);

    Ok(Decoded {
        key,
        salt,
        params,
        signed,
        tag,
    })
}

fn malformed(reason: String) -> Error {
    Error::MalformedEnvelope(reason)
}
