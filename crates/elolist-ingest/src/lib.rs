//! Monthly ingestion of the rating list into an elolist store.
//!
//! [`Pipeline`] ties the stages together and is generic over any
//! [`RatingStore`](elolist_core::store::RatingStore); the `elolist` binary
//! drives it with the SQLite backend.

pub mod aliases;
pub mod archive;
pub mod config;
pub mod error;
pub mod export;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod reference;
pub mod select;
pub mod validate;

pub use aliases::FederationAliases;
pub use config::{DatabaseUrl, Settings, ValidationPolicy};
pub use error::{Error, Result};
pub use pipeline::{BatchSummary, Pipeline, RunSummary};

#[cfg(test)]
mod tests;
