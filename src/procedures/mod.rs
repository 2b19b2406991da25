//! Various procedures for resolving goals against a context.
//!
//! For the most part these are methods accessed via a context, and primarily placed here for documentation.

pub mod solve;

pub use solve::{Barrier, Solutions};
