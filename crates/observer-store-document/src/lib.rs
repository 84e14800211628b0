//! Document backend for the Observer transition log.
//!
//! One JSON document per transition record, appended as a line to a single
//! JSON-lines file. Suited to deployments that would rather ship a log file
//! around than run a database.

mod document;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::DocumentStore;
