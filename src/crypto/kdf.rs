use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{MAX_KEY_LEN, PARAM_LEN};
use crate::error::{Error, Result};

/// Largest accepted cost exponent (N = 2^20).
const MAX_LOG_N: u32 = 20;
const MAX_R: u32 = 32;
const MAX_P: u32 = 16;
/// Upper bound on the `128 * r * N` working set scrypt allocates.
const MAX_MEMORY: u64 = 1 << 30;

/// scrypt cost parameters.
///
/// Stored in every envelope and message header, so a record stays
/// verifiable after the deployment default changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScryptParams {
    n: u32,
    r: u32,
    p: u32,
}

impl Default for ScryptParams {
    fn default() -> Self {
        // recommended for interactive logins
        Self {
            n: 1 << 14,
            r: 8,
            p: 1,
        }
    }
}

impl ScryptParams {
    pub fn new(n: u32, r: u32, p: u32) -> Result<Self> {
        let params = Self { n, r, p };
        params.validate()?;
        Ok(params)
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn r(&self) -> u32 {
        self.r
    }

    pub fn p(&self) -> u32 {
        self.p
    }

    pub fn log_n(&self) -> u8 {
        self.n.trailing_zeros() as u8
    }

    pub fn validate(&self) -> Result<()> {
        match self.violation() {
            Some(reason) => Err(Error::Kdf(reason)),
            None => Ok(()),
        }
    }

    /// Describes the first bound these parameters break, if any.
    pub fn violation(&self) -> Option<String> {
        if self.n < 2 || !self.n.is_power_of_two() {
            return Some(format!("scrypt N must be a power of two >= 2, got {}", self.n));
        }
        if self.n.trailing_zeros() > MAX_LOG_N {
            return Some(format!("scrypt N must be at most 2^{MAX_LOG_N}, got {}", self.n));
        }
        if !(1..=MAX_R).contains(&self.r) {
            return Some(format!("scrypt r must be in 1..={MAX_R}, got {}", self.r));
        }
        if !(1..=MAX_P).contains(&self.p) {
            return Some(format!("scrypt p must be in 1..={MAX_P}, got {}", self.p));
        }
        // scrypt requires N < 2^(16 * r)
        if self.n.trailing_zeros() >= 16 * self.r {
            return Some("scrypt N too large for block size r".into());
        }
        if 128 * u64::from(self.r) * u64::from(self.n) > MAX_MEMORY {
            return Some("scrypt memory cost exceeds 1 GiB".into());
        }
        None
    }

    /// `N || r || p`, little-endian.
    pub fn to_le_bytes(&self) -> [u8; 3 * PARAM_LEN] {
        let mut buf = [0u8; 3 * PARAM_LEN];
        buf[..PARAM_LEN].copy_from_slice(&self.n.to_le_bytes());
        buf[PARAM_LEN..2 * PARAM_LEN].copy_from_slice(&self.r.to_le_bytes());
        buf[2 * PARAM_LEN..].copy_from_slice(&self.p.to_le_bytes());
        buf
    }

    /// Decodes `N || r || p` without validating.
    pub fn from_le_bytes(bytes: &[u8; 3 * PARAM_LEN]) -> Self {
        let word = |i: usize| {
            let mut w = [0u8; PARAM_LEN];
            w.copy_from_slice(&bytes[i * PARAM_LEN..(i + 1) * PARAM_LEN]);
            u32::from_le_bytes(w)
        };
        Self {
            n: word(0),
            r: word(1),
            p: word(2),
        }
    }
}

/// Deployment-wide secret appended to passwords before derivation.
#[derive(Clone)]
pub struct Pepper(Zeroizing<Vec<u8>>);

impl Pepper {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    /// Like [`Pepper::new`], but an empty value is a configuration error.
    pub fn parse(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(Error::Config("pepper must not be empty".into()));
        }
        Ok(Self::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Pepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pepper").field(&"[REDACTED]").finish()
    }
}

/// Joins password and optional pepper into a zeroizing buffer.
pub fn peppered(password: &[u8], pepper: Option<&Pepper>) -> Zeroizing<Vec<u8>> {
    let extra = pepper.map_or(&[][..], Pepper::as_bytes);
    let mut secret = Zeroizing::new(Vec::with_capacity(password.len() + extra.len()));
    secret.extend_from_slice(password);
    secret.extend_from_slice(extra);
    secret
}

/// Derive `key_len` bytes from `secret` and `salt` with scrypt.
pub fn derive(
    secret: &[u8],
    salt: &[u8],
    params: ScryptParams,
    key_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    params.validate()?;

    if !(1..=MAX_KEY_LEN).contains(&key_len) {
        return Err(Error::Kdf(format!(
            "key length must be in 1..={MAX_KEY_LEN}, got {key_len}"
        )));
    }

    // output length comes from the buffer, not from `Params`
    let scrypt_params = scrypt::Params::new(
        params.log_n(),
        params.r,
        params.p,
        scrypt::Params::RECOMMENDED_LEN,
    )
    .map_err(|e| Error::Kdf(format!("failed to construct scrypt params: {e}")))?;

    let mut key = Zeroizing::new(vec![0u8; key_len]);
    scrypt::scrypt(secret, salt, &scrypt_params, key.as_mut_slice()).map_err(|e| {
        tracing::warn!(error = %e, "scrypt derivation failed");
        Error::Kdf(format!("scrypt derivation failed: {e}"))
    })?;

    Ok(key)
}
