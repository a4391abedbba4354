//! Structure file input.
//!
//! A trait-based reader interface, a minimal PDB reader that keeps one
//! representative atom per residue, and a loader that turns an identifier
//! into a [`Structure`](crate::core::models::structure::Structure).

pub(crate) mod codes;
pub mod loader;
pub mod pdb;
pub mod traits;
