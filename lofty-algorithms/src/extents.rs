use anyhow::{anyhow, Result};
use lofty_core::{
    containers::PointCloud,
    math::AABB,
    nalgebra::{Point3, Vector3},
};

/// Axis-aligned extents of a point cloud: the minimum coordinate and the span (max - min) per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub min: Point3<f64>,
    pub span: Vector3<f64>,
}

impl Extents {
    /// The maximum coordinate per axis
    pub fn max(&self) -> Point3<f64> {
        self.min + self.span
    }
}

impl From<AABB<f64>> for Extents {
    fn from(bounds: AABB<f64>) -> Self {
        Self {
            min: *bounds.min(),
            span: bounds.extent(),
        }
    }
}

/// Calculates the extents of all points in `cloud`
///
/// # Errors
///
/// If `cloud` contains no points. All windowing downstream assumes a well-defined footprint, so an empty cloud
/// is rejected here instead of producing a zero extent
/// ```
/// # use lofty_algorithms::extents::calculate_extents;
/// # use lofty_core::{containers::PointCloud, nalgebra::Vector3};
/// let cloud = PointCloud::from_positions(vec![Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 0.0, 5.0)]);
/// let extents = calculate_extents(&cloud).unwrap();
/// assert_eq!(extents.span, Vector3::new(3.0, 2.0, 2.0));
/// assert_eq!(extents.min.y, 0.0);
/// ```
pub fn calculate_extents(cloud: &PointCloud) -> Result<Extents> {
    let bounds = cloud
        .bounds()
        .ok_or_else(|| anyhow!("Cannot calculate the extents of an empty point cloud"))?;
    let extents = Extents::from(bounds);
    log::debug!(
        "Point cloud extents: x {:.3} m, y {:.3} m, z {:.3} m, min point ({:.3}, {:.3}, {:.3})",
        extents.span.x,
        extents.span.y,
        extents.span.z,
        extents.min.x,
        extents.min.y,
        extents.min.z
    );
    Ok(extents)
}
