//! Frame-difference motion tracking.
//!
//! Consecutive frames are compared on a coarse cell grid; changed cells are
//! merged into 4-connected blobs and reported as motion regions.

mod grid;
mod tracker;

pub use grid::{ActivityGrid, Blob};
pub use tracker::{MotionTrack, MotionTracker};
