use nalgebra::{Scalar, Vector3};

/// Helper trait for computing minimum and maximum values for types. For vector types the infimum and supremum
/// are computed component-wise, which is what bounding box computations of point positions need
pub trait MinMax {
    /// Computes the infimum of this value and `other`. For scalar types this is the minimum of the two values,
    /// for vector types it is the component-wise minimum
    ///
    /// # Example
    /// ```
    /// use lofty_core::math::MinMax;
    /// # use lofty_core::nalgebra::Vector3;
    ///
    /// assert_eq!(5.0f64.infimum(&3.0), 3.0);
    /// assert_eq!(Vector3::new(1.0, 2.0, 3.0).infimum(&Vector3::new(2.0, 1.0, 0.0)), Vector3::new(1.0, 1.0, 0.0));
    /// ```
    fn infimum(&self, other: &Self) -> Self;
    /// Computes the supremum of this value and `other`. For scalar types this is the maximum of the two values,
    /// for vector types it is the component-wise maximum
    ///
    /// # Example
    /// ```
    /// use lofty_core::math::MinMax;
    /// # use lofty_core::nalgebra::Vector3;
    ///
    /// assert_eq!(5.0f64.supremum(&3.0), 5.0);
    /// assert_eq!(Vector3::new(1.0, 2.0, 3.0).supremum(&Vector3::new(2.0, 1.0, 4.0)), Vector3::new(2.0, 2.0, 4.0));
    /// ```
    fn supremum(&self, other: &Self) -> Self;
}

impl MinMax for f32 {
    fn infimum(&self, other: &Self) -> Self {
        self.min(*other)
    }

    fn supremum(&self, other: &Self) -> Self {
        self.max(*other)
    }
}

impl MinMax for f64 {
    fn infimum(&self, other: &Self) -> Self {
        self.min(*other)
    }

    fn supremum(&self, other: &Self) -> Self {
        self.max(*other)
    }
}

impl<T: MinMax + Scalar> MinMax for Vector3<T> {
    fn infimum(&self, other: &Self) -> Self {
        Vector3::new(
            self.x.infimum(&other.x),
            self.y.infimum(&other.y),
            self.z.infimum(&other.z),
        )
    }

    fn supremum(&self, other: &Self) -> Self {
        Vector3::new(
            self.x.supremum(&other.x),
            self.y.supremum(&other.y),
            self.z.supremum(&other.z),
        )
    }
}

/// Returns the component-wise minimum and maximum of all values in `iter`, or `None` if `iter` is empty
pub fn minmax<T: MinMax + Copy, I: IntoIterator<Item = T>>(iter: I) -> Option<(T, T)> {
    iter.into_iter().fold(None, |acc, val| match acc {
        None => Some((val, val)),
        Some((old_min, old_max)) => Some((val.infimum(&old_min), val.supremum(&old_max))),
    })
}
