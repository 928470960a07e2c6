//! lattice - table structure reconstruction from ruling lines.
//!
//! Given the horizontal and vertical rulings of a page region, finds their
//! crossings, builds the minimal cells, flags merged cells and fills the
//! holes they leave with placeholders, merges cells into region outlines and
//! decides whether the region looks like a table.

pub mod api;
pub mod error;
pub mod table;
pub mod utils;

// Re-export high_level at the crate root
pub use api::high_level;
pub use error::{LatticeError, Result};
