//! # Workflows Module
//!
//! Top-level entry points for users of the library.
//!
//! - **Comparison Workflow** ([`compare`]) - Resolve a query and a target,
//!   align them, score every mapped subunit pair and render the report.

pub mod compare;
