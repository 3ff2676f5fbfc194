//! Core types and trait definitions for the barangay resident registry.
//!
//! The resident lifecycle (status registry and transition engine) and the
//! query engine are pure functions over in-memory data. The [`sync`] module
//! bridges them to a [`store::ResidentStore`] backend. This crate is free of
//! HTTP and database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod geo;
pub mod media;
pub mod query;
pub mod resident;
pub mod status;
pub mod store;
pub mod sync;
pub mod transition;

pub use error::{Error, Result};

#[cfg(test)]
pub(crate) mod testing;
