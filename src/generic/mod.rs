//! Sources of randomness.

pub mod minimal_pcg;
pub use minimal_pcg::MinimalPCG32;
