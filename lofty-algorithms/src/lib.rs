#![warn(clippy::all)]
//! Algorithms for finding flat canopy regions in forest point clouds.
//!
//! The landing-site analysis slides a square window over the horizontal footprint of a point cloud,
//! crops the points inside each window and scores how flat the top of the canopy is in there. The
//! building blocks can be used individually, or all at once through [analysis::find_landing_sites].

// Axis-aligned extents (minimum and span per axis) of a point cloud.
pub mod extents;
// Generation of the overlapping 2D window grid covering the footprint of a point cloud.
pub mod sliding_window;
// Turns 2D windows into 3D boxes and lazily extracts the points inside each of them.
pub mod crop;
// Per-window canopy flatness scores and landing centers.
pub mod flatness;
// Complete landing-site pipeline with a single configuration structure.
pub mod analysis;
// Ranking of scored windows and mapping of scores to colors for visualization.
pub mod ranking;
