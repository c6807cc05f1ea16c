//! Integration test crate for PropReel.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple propreel crates to verify they work together.

#[cfg(test)]
mod editing;

#[cfg(test)]
mod history;

#[cfg(test)]
mod persistence;

#[cfg(test)]
mod playback;
