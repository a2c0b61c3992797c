//! Common utilities for the Koala rendering engine.
//!
//! This crate provides shared infrastructure used by every pipeline stage:
//! - **Warning System** - deduplicated diagnostics for recoverable input
//!   problems (unknown CSS properties, unparsable values, skipped at-rules)

pub mod warning;
