//! Local-filesystem object storage for resident uploads.
//!
//! Objects live under a root directory, addressed by relative paths such as
//! `ids/2f1c.png`. Read access is granted through time-limited URLs signed
//! with a server secret; see [`signer`].

mod local;

pub mod error;
pub mod signer;

pub use error::{Error, Result};
pub use local::LocalObjectStore;
pub use signer::{UrlSigner, generate_secret};
