//! Small formatting and ordering helpers shared by the CLI.

pub mod format;

pub use format::{format_bytes, time_sort_key};
