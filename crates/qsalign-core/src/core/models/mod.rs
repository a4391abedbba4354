//! # Core Models Module
//!
//! Plain data structures describing the assemblies being compared.
//!
//! - [`structure`] - A resolved assembly: identifier, ordered chains and residues, one
//!   representative atom per residue
//! - [`subunit`] - A named rigid unit derived from a chain, reduced to its point set
//!
//! Both are read-only once built and are dropped at the end of a run.

pub mod structure;
pub mod subunit;
