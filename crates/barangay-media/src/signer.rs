//! Time-limited read URLs.
//!
//! A signature is the HMAC-SHA256, keyed by the server secret, of the object
//! path and the expiry instant (unix seconds), hex-encoded. Anyone holding the
//! URL may read the object until it expires; changing the path or the expiry
//! invalidates it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of secrets produced by [`generate_secret`].
const SECRET_LEN: usize = 32;

/// A fresh random signing secret, hex-encoded.
pub fn generate_secret() -> String {
  let mut bytes = [0u8; SECRET_LEN];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// Signs and verifies media URLs with one keyed MAC.
#[derive(Clone)]
pub struct UrlSigner {
  key: HmacSha256,
}

impl UrlSigner {
  pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
    let key =
      HmacSha256::new_from_slice(secret.as_ref()).map_err(|_| Error::InvalidSecret)?;
    Ok(Self { key })
  }

  /// Unix expiry for a URL issued at `now` with lifetime `ttl`.
  pub fn expiry(now: DateTime<Utc>, ttl: Duration) -> i64 {
    let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    now.timestamp().saturating_add(secs)
  }

  pub fn sign(&self, path: &str, expires: i64) -> String {
    hex::encode(self.mac(path, expires).finalize().into_bytes())
  }

  /// Check `signature` for `path` and `expires`, then check that `now` is
  /// not past the expiry.
  pub fn verify(
    &self,
    path: &str,
    expires: i64,
    signature: &str,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let given = hex::decode(signature).map_err(|_| Error::BadSignature)?;
    self
      .mac(path, expires)
      .verify_slice(&given)
      .map_err(|_| Error::BadSignature)?;
    if now.timestamp() > expires {
      return Err(Error::Expired);
    }
    Ok(())
  }

  fn mac(&self, path: &str, expires: i64) -> HmacSha256 {
    let mut mac = self.key.clone();
    mac.update(path.as_bytes());
    mac.update(&[0u8]);
    mac.update(&expires.to_le_bytes());
    mac
  }
}

impl std::fmt::Debug for UrlSigner {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("UrlSigner").finish_non_exhaustive()
  }
}
