pub mod geometry;
pub mod quaternions;
