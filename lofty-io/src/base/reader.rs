use anyhow::Result;
use lofty_core::{containers::PointCloud, math::AABB};

/// Base trait for all types that support reading point data
pub trait PointReader {
    /// Reads all points of the underlying source into a new `PointCloud`
    fn read_all(&mut self) -> Result<PointCloud>;
    /// Returns the total number of points in the source, if the format stores it up front
    fn point_count(&self) -> Option<usize>;
    /// Returns the bounds stored in the header of the source, if the format has them
    fn header_bounds(&self) -> Option<AABB<f64>>;
}
