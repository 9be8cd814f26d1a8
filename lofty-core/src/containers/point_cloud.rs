use std::iter::FromIterator;

use anyhow::{bail, Result};
use nalgebra::{Point3, Vector3};

use crate::math::{minmax, AABB};

/// An ordered, immutable sequence of 3D point positions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    positions: Vec<Vector3<f64>>,
}

impl PointCloud {
    /// Creates a new empty `PointCloud`
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a new `PointCloud` from the given positions
    /// ```
    /// # use lofty_core::containers::PointCloud;
    /// # use lofty_core::nalgebra::Vector3;
    /// let cloud = PointCloud::from_positions(vec![Vector3::new(1.0, 2.0, 3.0)]);
    /// assert_eq!(cloud.len(), 1);
    /// ```
    pub fn from_positions(positions: Vec<Vector3<f64>>) -> Self {
        Self { positions }
    }

    /// Creates a new empty `PointCloud` with space for `capacity` points
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
        }
    }

    /// Appends a single position. Only loaders use this, the analysis treats clouds as read-only
    pub fn push(&mut self, position: Vector3<f64>) {
        self.positions.push(position);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vector3<f64>> {
        self.positions.iter()
    }

    /// Keeps every `every_k_points`-th point, starting with the first one. The point at index `i` is kept if
    /// `i % every_k_points == 0`
    ///
    /// # Errors
    ///
    /// If `every_k_points` is zero
    /// ```
    /// # use lofty_core::containers::PointCloud;
    /// # use lofty_core::nalgebra::Vector3;
    /// let cloud = (0..10).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect::<PointCloud>();
    /// let downsampled = cloud.uniform_down_sample(3).unwrap();
    /// assert_eq!(downsampled.len(), 4);
    /// ```
    pub fn uniform_down_sample(&self, every_k_points: usize) -> Result<Self> {
        if every_k_points == 0 {
            bail!("Downsampling stride must be at least 1");
        }
        Ok(self.iter().step_by(every_k_points).copied().collect())
    }

    /// Returns the bounding box of all points in this `PointCloud`, or `None` if it is empty
    pub fn bounds(&self) -> Option<AABB<f64>> {
        minmax(self.iter().copied()).map(|(min, max)| {
            AABB::from_min_max_unchecked(Point3::from(min), Point3::from(max))
        })
    }

    /// Returns an iterator over all points that lie inside `bounds`. Points on the boundary of `bounds` are
    /// included
    pub fn crop<'a>(&'a self, bounds: &'a AABB<f64>) -> impl Iterator<Item = &'a Vector3<f64>> + 'a {
        self.iter()
            .filter(move |position| bounds.contains(&Point3::from(**position)))
    }
}

impl FromIterator<Vector3<f64>> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Vector3<f64>>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Vector3<f64>;
    type IntoIter = std::slice::Iter<'a, Vector3<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::random_cloud;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_uniform_down_sample_keeps_first_of_every_stride() {
        let cloud = (0..11)
            .map(|i| Vector3::new(i as f64, 0.0, 0.0))
            .collect::<PointCloud>();
        let downsampled = cloud.uniform_down_sample(5).unwrap();
        let xs = downsampled.iter().map(|p| p.x).collect::<Vec<_>>();
        assert_eq!(xs, vec![0.0, 5.0, 10.0]);

        assert_eq!(cloud.uniform_down_sample(1).unwrap(), cloud);
        assert!(cloud.uniform_down_sample(0).is_err());
    }

    #[test]
    fn test_bounds() {
        assert!(PointCloud::new().bounds().is_none());

        let cloud = random_cloud(1000, 42);
        let bounds = cloud.bounds().unwrap();
        for position in cloud.iter() {
            assert!(bounds.contains(&Point3::from(*position)));
        }
        let min_x = cloud.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        assert_approx_eq!(bounds.min().x, min_x);
    }

    #[test]
    fn test_crop_is_inclusive() {
        let cloud = PointCloud::from_positions(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(1.5, 0.5, 0.5),
        ]);
        let bounds =
            AABB::from_min_max_unchecked(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(cloud.crop(&bounds).count(), 2);
    }
}
