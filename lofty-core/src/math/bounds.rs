use nalgebra::{ClosedAdd, ClosedDiv, ClosedSub, Point3, Scalar, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 3D axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AABB<T: Scalar + PartialOrd> {
    min: Point3<T>,
    max: Point3<T>,
}

impl<T: Scalar + ClosedSub + PartialOrd + Copy> AABB<T> {
    /// Creates a new AABB from the given minimum and maximum coordinates. Performs no checks that min <= max
    pub fn from_min_max_unchecked(min: Point3<T>, max: Point3<T>) -> Self {
        Self { min, max }
    }

    /// Returns the minimum point of this AABB
    pub fn min(&self) -> &Point3<T> {
        &self.min
    }

    /// Returns the maximum point of this AABB
    pub fn max(&self) -> &Point3<T> {
        &self.max
    }

    /// Returns the extent of this AABB. The extent is the size between the minimum and maximum position of this AABB
    /// ```
    /// # use lofty_core::math::AABB;
    /// let bounds = AABB::from_min_max_unchecked(nalgebra::Point3::new(0.0, 0.0, 0.0), nalgebra::Point3::new(1.0, 2.0, 3.0));
    /// assert_eq!(bounds.extent(), nalgebra::Vector3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn extent(&self) -> Vector3<T> {
        self.max - self.min
    }

    /// Returns true if the given point is contained within this AABB. Points right on the boundary
    /// of this AABB (e.g. point.x == self.max.x or self.min.x) will return true as well.
    /// ```
    /// # use lofty_core::math::AABB;
    /// let bounds = AABB::from_min_max_unchecked(nalgebra::Point3::new(0.0, 0.0, 0.0), nalgebra::Point3::new(1.0, 1.0, 1.0));
    /// assert!(bounds.contains(&nalgebra::Point3::new(0.5, 0.5, 0.5)));
    /// assert!(bounds.contains(&nalgebra::Point3::new(1.0, 0.0, 1.0)));
    /// ```
    pub fn contains(&self, point: &Point3<T>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Computes the union of the given bounding boxes. The union of two bounding boxes a and b is defined as the
    /// smallest AABB that fully contains both a and b.
    pub fn union(a: &AABB<T>, b: &AABB<T>) -> Self {
        let pick_min = |l: T, r: T| if l < r { l } else { r };
        let pick_max = |l: T, r: T| if l > r { l } else { r };
        Self {
            min: Point3::new(
                pick_min(a.min.x, b.min.x),
                pick_min(a.min.y, b.min.y),
                pick_min(a.min.z, b.min.z),
            ),
            max: Point3::new(
                pick_max(a.max.x, b.max.x),
                pick_max(a.max.y, b.max.y),
                pick_max(a.max.z, b.max.z),
            ),
        }
    }

}

impl<T: Scalar + ClosedSub + ClosedAdd + ClosedDiv + PartialOrd + Copy + From<u8>> AABB<T> {
    /// Returns the center point of this AABB
    /// ```
    /// # use lofty_core::math::AABB;
    /// let bounds = AABB::from_min_max_unchecked(nalgebra::Point3::new(0.0, 2.0, -1.0), nalgebra::Point3::new(4.0, 4.0, 1.0));
    /// assert_eq!(bounds.center(), nalgebra::Point3::new(2.0, 3.0, 0.0));
    /// ```
    pub fn center(&self) -> Point3<T> {
        let two: T = T::from(2u8);
        Point3::new(
            (self.min.x + self.max.x) / two,
            (self.min.y + self.max.y) / two,
            (self.min.z + self.max.z) / two,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> AABB<f64> {
        AABB::from_min_max_unchecked(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bounds = unit_box();
        assert!(bounds.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(bounds.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(!bounds.contains(&Point3::new(1.0 + 1e-9, 0.5, 0.5)));
        assert!(!bounds.contains(&Point3::new(0.5, -0.1, 0.5)));
    }

    #[test]
    fn test_union() {
        let a = unit_box();
        let b = AABB::from_min_max_unchecked(Point3::new(-1.0, 2.0, 0.5), Point3::new(0.5, 3.0, 0.7));
        let merged = AABB::union(&a, &b);
        assert_eq!(*merged.min(), Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(*merged.max(), Point3::new(1.0, 3.0, 1.0));
    }
}
