//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits.

mod header_source;

pub use header_source::InMemoryHeaderSource;
