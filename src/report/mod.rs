//! Snapshot rendering.

pub mod generator;

pub use generator::*;
