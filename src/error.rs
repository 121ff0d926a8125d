use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by every pwseal operation.
///
/// Cryptographic mismatches are deliberately coarse: a wrong password,
/// tampered bytes and mismatched associated data all collapse into
/// [`Error::AuthenticationFailed`] on the AEAD path, and into `Ok(false)`
/// on the envelope path.
#[derive(Debug, Error)]
pub enum Error {
    /// The OS random generator could not service the request.
    #[error("OS random generator unavailable")]
    SourceExhausted,

    /// The key derivation function rejected its parameters or failed.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// The envelope is too short or structurally inconsistent.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The AEAD message is too short or structurally inconsistent.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    #[error("encryption failed")]
    Encryption,

    /// Wrong password, tampered message or mismatched associated data.
    #[error("invalid password or corrupted data")]
    AuthenticationFailed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
