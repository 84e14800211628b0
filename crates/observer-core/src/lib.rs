//! Core types and algorithms for the Observer presence tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the transition record model, the [`store::EventStore`] contract, the
//! interval reconstructor, the aggregator and the boundary event generator.
//! Storage backends and the request layer depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod boundary;
pub mod error;
pub mod reconstruct;
pub mod record;
pub mod status;
pub mod store;

pub use error::{Error, Result};
