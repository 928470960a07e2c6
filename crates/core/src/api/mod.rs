//! Public entry points for reconstructing regions end to end.

pub mod high_level;

pub use high_level::{Reconstruction, RulingSet, reconstruct, reconstruct_many};
