//! Integration test utilities for the clan assistant
//!
//! This crate provides in-memory port fakes and builders for driving
//! full reconciliation runs against the service layer.

pub mod fixtures;

pub use fixtures::*;
