//! On-disk and stdout JSON shapes.

pub mod scores;
pub mod summary;
