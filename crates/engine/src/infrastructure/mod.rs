//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod config;
pub mod documents;
pub mod ports;
pub mod quality_library;
pub mod storage;
