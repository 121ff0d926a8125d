//! Self-describing password-derived key envelopes.
//!
//! An envelope carries a derived key together with the salt and scrypt
//! cost parameters that produced it, so a candidate password can be checked
//! against it later without any other stored state.
//!
//! Verification always runs the full derivation once the envelope decodes,
//! and compares both the key and the integrity tag in constant time without
//! short-circuiting. A wrong password and a corrupted record therefore take
//! the same time and both yield `Ok(false)`.

mod layout;

pub use layout::{Format, VERSION_V1};

use subtle::{Choice, ConstantTimeEq};

use crate::config::Config;
use crate::crypto::{self, SALT_LEN, ScryptParams};
use crate::error::Result;
use crate::random;

/// Structural summary of an envelope, obtained without derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeInfo {
    pub format: Format,
    pub key_len: usize,
    pub params: ScryptParams,
}

/// Creates a v1 envelope with the default cost parameters and no pepper.
pub fn create(password: impl AsRef<[u8]>, key_len: usize) -> Result<Vec<u8>> {
    create_with(password, key_len, &Config::default())
}

/// Creates a v1 envelope using the cost parameters and pepper of `config`.
pub fn create_with(password: impl AsRef<[u8]>, key_len: usize, config: &Config) -> Result<Vec<u8>> {
    create_as(password, key_len, Format::V1, config)
}

/// Creates an envelope in an explicit `format`.
///
/// # Errors
///
/// [`crate::Error::SourceExhausted`] if the salt cannot be generated, and
/// [`crate::Error::Kdf`] if `key_len` or the cost parameters are rejected.
pub fn create_as(
    password: impl AsRef<[u8]>,
    key_len: usize,
    format: Format,
    config: &Config,
) -> Result<Vec<u8>> {
    let salt = random::array::<SALT_LEN>()?;
    let params = *config.params();

    let secret = crypto::peppered(password.as_ref(), config.pepper());
    let key = crypto::derive(&secret, &salt, params, key_len)?;

    let envelope = layout::encode(format, &key, &salt, &params);

    tracing::debug!(
        %format,
        key_len,
        n = params.n(),
        r = params.r(),
        p = params.p(),
        "created envelope"
    );

    Ok(envelope)
}

/// Verifies `password` against a v1 envelope, without pepper.
pub fn verify(password: impl AsRef<[u8]>, envelope: &[u8]) -> Result<bool> {
    verify_with(password, envelope, &Config::default())
}

/// Verifies `password` against a v1 envelope, taking the pepper from
/// `config`. Cost parameters are always read from the envelope.
pub fn verify_with(password: impl AsRef<[u8]>, envelope: &[u8], config: &Config) -> Result<bool> {
    verify_as(password, envelope, Format::V1, config)
}

/// Verifies `password` against an envelope in an explicit `format`.
///
/// # Errors
///
/// [`crate::Error::MalformedEnvelope`] if the bytes do not decode as
/// `format`; this is checked before any derivation. A decodable envelope
/// never errors on mismatch, it returns `Ok(false)`.
pub fn verify_as(
    password: impl AsRef<[u8]>,
    envelope: &[u8],
    format: Format,
    config: &Config,
) -> Result<bool> {
    let decoded = layout::decode(format, envelope)?;

    let secret = crypto::peppered(password.as_ref(), config.pepper());
    let key = crypto::derive(&secret, decoded.salt, decoded.params, decoded.key.len())?;

    // Both comparisons run unconditionally, after the derivation.
    let key_ok = key.as_slice().ct_eq(decoded.key);
    let tag_ok = match decoded.tag {
        Some(tag) => layout::digest(decoded.signed).as_slice().ct_eq(tag),
        None => Choice::from(1),
    };
    let matched: bool = (key_ok & tag_ok).into();

    tracing::debug!(%format, key_len = decoded.key.len(), matched, "verified envelope");

    Ok(matched)
}

/// Decodes the structure of an envelope without running the KDF.
pub fn inspect(envelope: &[u8], format: Format) -> Result<EnvelopeInfo> {
    let decoded = layout::decode(format, envelope)?;
    Ok(EnvelopeInfo {
        format,
        key_len: decoded.key.len(),
        params: decoded.params,
    })
}
