//! Runtime server configuration, deserialised from `config.toml` and
//! `BARANGAY_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// Root directory for uploaded documents and images.
  #[serde(default = "default_media_dir")]
  pub media_dir:           PathBuf,
  /// Origin placed in signed media URLs. Defaults to `http://{host}:{port}`.
  #[serde(default)]
  pub public_base_url:     Option<String>,
  /// Hex or free-form secret for media URL signatures. A random one is
  /// generated at startup when absent, so URLs do not survive a restart.
  #[serde(default)]
  pub signing_secret:      Option<String>,
  #[serde(default = "default_signed_url_ttl_secs")]
  pub signed_url_ttl_secs: u64,
  #[serde(default = "default_geocoder_url")]
  pub geocoder_url:        String,
  /// Nominatim's usage policy requires an identifying user agent.
  #[serde(default = "default_geocoder_user_agent")]
  pub geocoder_user_agent: String,
  /// Reload the resident snapshot whenever the store reports a write.
  #[serde(default)]
  pub live_reload:         bool,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("barangay.db") }

fn default_media_dir() -> PathBuf { PathBuf::from("media") }

fn default_signed_url_ttl_secs() -> u64 { 15 * 60 }

fn default_geocoder_url() -> String { "https://nominatim.openstreetmap.org".to_string() }

fn default_geocoder_user_agent() -> String {
  concat!("barangay-registry/", env!("CARGO_PKG_VERSION")).to_string()
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn base_url(&self) -> String {
    match &self.public_base_url {
      Some(url) => url.trim_end_matches('/').to_string(),
      None => format!("http://{}", self.address()),
    }
  }

  pub fn signed_url_ttl(&self) -> Duration { Duration::from_secs(self.signed_url_ttl_secs) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
