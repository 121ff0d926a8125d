//! Random source backed by the OS CSPRNG.
//!
//! Every salt and nonce in the crate comes from here. Nothing is cached or
//! counted between calls, so the functions are safe to call from any number
//! of threads at once.

use crate::error::{Error, Result};

/// Fill buffer with cryptographically secure random bytes
pub fn fill(buf: &mut [u8]) -> Result<()> {
    getrandom::fill(buf).map_err(|e| {
        tracing::warn!(len = buf.len(), error = %e, "OS random generator failed");
        Error::SourceExhausted
    })
}

/// Generate `len` random bytes
pub fn generate(len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    fill(&mut buf)?;
    Ok(buf)
}

/// Generate a fixed-size random array (salts, nonces)
pub fn array<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    fill(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_returns_requested_length() {
        for len in [0, 1, 16, 24, 33, 4096] {
            assert_eq!(generate(len).unwrap().len(), len);
        }
    }

    #[test]
    fn consecutive_arrays_differ() {
        let a = array::<32>().unwrap();
        let b = array::<32>().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn output_is_not_all_zero() {
        let buf = generate(64).unwrap();
        assert!(buf.iter().any(|&b| b != 0));
    }
}
