//! Random number generation module, a thin facade over the "rand" crate that
//! is the Rust standard for RNGs.

mod standard;

/// Select the RNG implementation in use
pub use self::standard::RandGenerator as RandomGenerator;
