//! Integration test crate for ReelMask.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple reelmask crates to verify they work together.

#[cfg(test)]
mod support;

#[cfg(test)]
mod pipeline;

#[cfg(test)]
mod editing;
