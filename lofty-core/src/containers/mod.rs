//! In-memory point cloud storage
//!
//! LOFTY only ever needs point positions, so the single container type is a [PointCloud] holding
//! `Vector3<f64>` positions in the order in which they were read.

mod point_cloud;
pub use self::point_cloud::*;
