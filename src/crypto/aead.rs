use super::NONCE_LEN;
use crate::error::{Error, Result};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use zeroize::Zeroizing;

/// Encrypt plaintext, authenticating `aad` alongside it
pub fn seal(key: &[u8], nonce: &[u8; NONCE_LEN], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| Error::Encryption)?;

    cipher
        .encrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| Error::Encryption)
}

/// Decrypt ciphertext; any failure is reported as `AuthenticationFailed`
pub fn open(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher =
        XChaCha20Poly1305::new_from_slice(key).map_err(|_| Error::AuthenticationFailed)?;

    let plaintext = cipher
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| Error::AuthenticationFailed)?;
    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{AEAD_TAG_LEN, KEY_LEN};

    #[test]
    fn seal_open_roundtrip() {
        let key = [0x42u8; KEY_LEN];
        let nonce = [7u8; NONCE_LEN];

        let ciphertext = seal(&key, &nonce, b"secret", b"header").unwrap();
        assert_eq!(ciphertext.len(), 6 + AEAD_TAG_LEN);

        let plaintext = open(&key, &nonce, &ciphertext, b"header").unwrap();
        assert_eq!(&*plaintext, b"secret");
    }

    #[test]
    fn wrong_key_fails() {
        let nonce = [7u8; NONCE_LEN];
        let ciphertext = seal(&[1u8; KEY_LEN], &nonce, b"secret", b"").unwrap();

        assert!(matches!(
            open(&[2u8; KEY_LEN], &nonce, &ciphertext, b""),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn aad_mismatch_fails() {
        let key = [0x42u8; KEY_LEN];
        let nonce = [7u8; NONCE_LEN];
        let ciphertext = seal(&key, &nonce, b"secret", b"a").unwrap();

        assert!(matches!(
            open(&key, &nonce, &ciphertext, b"b"),
            Err(Error::AuthenticationFailed)
        ));
        assert!(matches!(
            open(&key, &nonce, &ciphertext, b""),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn short_key_is_rejected_without_panicking() {
        let nonce = [7u8; NONCE_LEN];
        assert!(matches!(
            seal(&[0u8; 16], &nonce, b"m", b""),
            Err(Error::Encryption)
        ));
    }
}
