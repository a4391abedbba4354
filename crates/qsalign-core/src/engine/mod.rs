//! # Engine Module
//!
//! The comparison logic of QsAlign.
//!
//! ## Overview
//!
//! Subunits are extracted from each assembly and grouped into sequence
//! clusters ([`cluster`]). The quaternary aligner ([`aligner`]) searches for
//! the subunit correspondence and global superposition that maps the most
//! subunits, producing an [`result::AlignmentResult`]. The orientation scorer
//! ([`scoring`]) then measures the residual rotation of every mapped pair, and
//! the report assembler ([`report`]) writes the tab-delimited record.
//!
//! - **Configuration** ([`config`]) - Clustering and alignment thresholds
//! - **Progress Monitoring** ([`progress`]) - Events consumed by user interfaces
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod aligner;
pub mod cluster;
pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod result;
pub mod scoring;
