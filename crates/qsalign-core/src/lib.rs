//! # QsAlign Core Library
//!
//! Quaternary structure comparison of macromolecular assemblies: which subunits
//! of a query correspond to which subunits of a target, how well the two
//! assemblies superpose, and how far each mapped pair remains rotated after the
//! assembly-level superposition.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `Subunit`),
//!   point-set geometry and quaternion math, and structure file I/O.
//!
//! - **[`engine`]: The Logic Core.** Subunit clustering, the quaternary aligner,
//!   the orientation scorer and the report assembler, together with their
//!   configuration, error and progress types.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into a
//!   single comparison call that produces a renderable [`workflows::compare::Comparison`].

pub mod core;
pub mod engine;
pub mod workflows;
