//! Core types and trait definitions for the elolist rating-list pipeline.
//!
//! This crate is deliberately free of filesystem and database dependencies.
//! The codec, store and pipeline crates all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod age;
pub mod country;
pub mod error;
pub mod period;
pub mod player;
pub mod store;

pub use error::{Error, Result};
