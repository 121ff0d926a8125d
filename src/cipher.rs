//! Password-keyed authenticated encryption.
//!
//! Every call derives a fresh key from the password and a new salt, draws a
//! new nonce, and prepends both (with the cost parameters) in a v1 header.
//! The caller's associated data is never stored; the same bytes must be
//! supplied again to [`decrypt`].

use zeroize::Zeroizing;

use crate::config::Config;
use crate::crypto::{self, KEY_LEN, NONCE_LEN, SALT_LEN};
use crate::error::{Error, Result};
use crate::format::{self, Header};
use crate::random;

/// Encrypts `plaintext` under `password` with the default configuration.
pub fn encrypt(
    password: impl AsRef<[u8]>,
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>> {
    encrypt_with(password, plaintext, associated_data, &Config::default())
}

/// Encrypts `plaintext` under `password`, pepper and cost parameters taken
/// from `config`.
///
/// # Errors
///
/// [`Error::SourceExhausted`] if salt or nonce generation fails,
/// [`Error::Kdf`] if derivation fails and [`Error::Encryption`] if the
/// cipher rejects its input.
pub fn encrypt_with(
    password: impl AsRef<[u8]>,
    plaintext: &[u8],
    associated_data: &[u8],
    config: &Config,
) -> Result<Vec<u8>> {
    let salt = random::array::<SALT_LEN>()?;
    let nonce = random::array::<NONCE_LEN>()?;
    let params = *config.params();

    let secret = crypto::peppered(password.as_ref(), config.pepper());
    let key = crypto::derive(&secret, &salt, params, KEY_LEN)?;
    drop(secret);

    let header = Header::new(params, salt, nonce);
    let mut message = format::serialize(&header);
    let aad = bind(&message, associated_data);

    let ciphertext = crypto::aead::seal(&key, &nonce, plaintext, &aad)?;
    message.extend_from_slice(&ciphertext);

    tracing::debug!(
        plaintext_len = plaintext.len(),
        aad_len = associated_data.len(),
        n = params.n(),
        r = params.r(),
        p = params.p(),
        "sealed message"
    );

    Ok(message)
}

/// Decrypts a message produced by [`encrypt`].
pub fn decrypt(
    password: impl AsRef<[u8]>,
    message: &[u8],
    associated_data: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    decrypt_with(password, message, associated_data, &Config::default())
}

/// Decrypts a message, taking the pepper from `config`.
///
/// Cost parameters always come from the message header.
///
/// # Errors
///
/// [`Error::MalformedCiphertext`] when the header cannot be decoded, checked
/// before any derivation. Every other mismatch (password, pepper, associated
/// data, ciphertext, header) is [`Error::AuthenticationFailed`].
pub fn decrypt_with(
    password: impl AsRef<[u8]>,
    message: &[u8],
    associated_data: &[u8],
    config: &Config,
) -> Result<Zeroizing<Vec<u8>>> {
    let (header, offset) = format::parse(message)?;
    let (header_bytes, ciphertext) = message.split_at(offset);

    let secret = crypto::peppered(password.as_ref(), config.pepper());
    let key = crypto::derive(&secret, header.salt(), *header.kdf(), KEY_LEN)?;
    drop(secret);

    let aad = bind(header_bytes, associated_data);
    let plaintext = crypto::aead::open(&key, header.nonce(), ciphertext, &aad);

    match &plaintext {
        Ok(p) => tracing::debug!(
            version = header.version(),
            plaintext_len = p.len(),
            "opened message"
        ),
        Err(Error::AuthenticationFailed) => tracing::debug!("message failed authentication"),
        Err(_) => {}
    }

    plaintext
}

/// AEAD associated data: the encoded header followed by the caller's data.
/// The header has a fixed length, so the concatenation is unambiguous.
fn bind(header: &[u8], associated_data: &[u8]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(header.len() + associated_data.len());
    aad.extend_from_slice(header);
    aad.extend_from_slice(associated_data);
    aad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{AEAD_TAG_LEN, Pepper, ScryptParams};
    use crate::format::v1::HEADER_LEN;

    fn fast() -> Config {
        Config::default().with_params(ScryptParams::new(1 << 4, 1, 1).unwrap())
    }

    const MESSAGE: &[u8] = b"The quick brown fox jumps over the lazy dog";

    #[test]
    fn roundtrip_with_empty_aad() {
        let password = random::generate(32).unwrap();

        let ciphertext = encrypt_with(&password, MESSAGE, b"", &fast()).unwrap();
        let plaintext = decrypt_with(&password, &ciphertext, b"", &fast()).unwrap();

        assert_eq!(&*plaintext, MESSAGE);
    }

    #[test]
    fn roundtrip_with_random_aad() {
        let password = random::generate(32).unwrap();
        let extra = random::generate(64).unwrap();

        let ciphertext = encrypt_with(&password, MESSAGE, &extra, &fast()).unwrap();
        let plaintext = decrypt_with(&password, &ciphertext, &extra, &fast()).unwrap();

        assert_eq!(&*plaintext, MESSAGE);
    }

    #[test]
    fn roundtrip_with_default_params() {
        let ciphertext = encrypt("pw", b"hello", b"ctx").unwrap();
        assert_eq!(&*decrypt("pw", &ciphertext, b"ctx").unwrap(), b"hello");
    }

    #[test]
    fn message_layout() {
        let ciphertext = encrypt_with("pw", MESSAGE, b"", &fast()).unwrap();
        assert_eq!(ciphertext.len(), HEADER_LEN + MESSAGE.len() + AEAD_TAG_LEN);
        assert_eq!(&ciphertext[..5], b"PWSL\x01");
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let ciphertext = encrypt_with("pw", b"", b"aad", &fast()).unwrap();
        assert_eq!(ciphertext.len(), HEADER_LEN + AEAD_TAG_LEN);
        assert!(decrypt_with("pw", &ciphertext, b"aad", &fast()).unwrap().is_empty());
    }

    #[test]
    fn same_input_never_repeats_ciphertext() {
        let a = encrypt_with("pw", MESSAGE, b"", &fast()).unwrap();
        let b = encrypt_with("pw", MESSAGE, b"", &fast()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_password_fails() {
        let ciphertext = encrypt_with("correct", MESSAGE, b"", &fast()).unwrap();
        assert!(matches!(
            decrypt_with("wrong", &ciphertext, b"", &fast()),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn mismatched_aad_fails_like_wrong_password() {
        let ciphertext = encrypt_with("pw", MESSAGE, b"", &fast()).unwrap();
        assert!(matches!(
            decrypt_with("pw", &ciphertext, b"\0", &fast()),
            Err(Error::AuthenticationFailed)
        ));

        let ciphertext = encrypt_with("pw", MESSAGE, b"context", &fast()).unwrap();
        assert!(matches!(
            decrypt_with("pw", &ciphertext, b"", &fast()),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn pepper_is_required_to_decrypt() {
        let peppered = fast().with_pepper(Pepper::new("deployment-secret"));
        let ciphertext = encrypt_with("pw", MESSAGE, b"", &peppered).unwrap();

        assert!(matches!(
            decrypt_with("pw", &ciphertext, b"", &fast()),
            Err(Error::AuthenticationFailed)
        ));
        assert_eq!(
            &*decrypt_with("pw", &ciphertext, b"", &peppered).unwrap(),
            MESSAGE
        );
    }

    #[test]
    fn header_tampering_fails_authentication() {
        let mut ciphertext = encrypt_with("pw", MESSAGE, b"", &fast()).unwrap();
        // first salt byte
        ciphertext[17] ^= 0x01;
        assert!(matches!(
            decrypt_with("pw", &ciphertext, b"", &fast()),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn truncated_message_is_malformed() {
        let ciphertext = encrypt_with("pw", MESSAGE, b"", &fast()).unwrap();
        assert!(matches!(
            decrypt_with("pw", &ciphertext[..HEADER_LEN + AEAD_TAG_LEN - 1], b"", &fast()),
            Err(Error::MalformedCiphertext(_))
        ));
        assert!(matches!(
            decrypt_with("pw", &[], b"", &fast()),
            Err(Error::MalformedCiphertext(_))
        ));
    }

    #[test]
    fn old_params_still_decrypt_after_default_changes() {
        let old = Config::default().with_params(ScryptParams::new(1 << 5, 2, 1).unwrap());
        let ciphertext = encrypt_with("pw", MESSAGE, b"", &old).unwrap();

        assert_eq!(&*decrypt_with("pw", &ciphertext, b"", &fast()).unwrap(), MESSAGE);
    }
}
