//! This crate provides test-utilities for the planner crates.
//!
//! It holds in-memory chain clients whose answers tests can rewrite, a registry snapshot and
//! chain fixtures that agree with each other, and generators for arbitrary values.

pub mod arbitrary_generator;
pub mod fixtures;
pub mod mocks;
