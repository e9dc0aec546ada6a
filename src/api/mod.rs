//! Remote schedule feed module.
//!
//! This module provides the `SourceClient` for reading the published
//! schedule feed: one flat JSON table of rows per category, with string
//! fields agreed upon with the feed publisher. The engine itself only
//! consumes the decoded rows; callers pair a fetch with a
//! [`crate::sync::reconcile`] pass.

pub mod client;
pub mod error;

pub use client::{SourceClient, DEFAULT_BASE_URL};
pub use error::SourceError;
