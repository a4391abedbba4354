//! # Core Module
//!
//! Stateless building blocks shared by the engine: the structure and subunit
//! models, geometric utilities and structure file input.
//!
//! - **Models** ([`models`]) - Structures, chains, residues and alignment subunits
//! - **Utilities** ([`utils`]) - Centroids, Kabsch superposition, RMSD and quaternion orientation
//! - **File I/O** ([`io`]) - PDB reading and identifier resolution through search paths

pub mod io;
pub mod models;
pub mod utils;
