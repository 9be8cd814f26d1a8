#![warn(clippy::all)]

//! Core data structures for canopy landing-site analysis
//!
//! `lofty-core` holds the in-memory [PointCloud](crate::containers::PointCloud) that every other LOFTY
//! crate operates on, together with the bounding box math in [math](crate::math) that the sliding window
//! analysis is built from.

pub extern crate nalgebra;

pub mod containers;
/// Useful mathematical tools when working with point cloud data
pub mod math;

#[cfg(test)]
pub(crate) mod test_utils;
