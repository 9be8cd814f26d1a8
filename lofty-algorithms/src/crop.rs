use anyhow::{bail, Result};
use lofty_core::{containers::PointCloud, math::AABB, nalgebra::Vector3};

use crate::{extents::Extents, sliding_window::Window2D};

/// Windows with this many points or fewer are dropped by the [WindowCropper]
pub const MIN_POINTS_PER_WINDOW: usize = 10;

/// A 3D window together with the points of the cloud that fall inside it
#[derive(Debug, Clone)]
pub struct CroppedWindow {
    /// Position of the window in the sequence of 2D windows that the cropper was created from
    pub index: usize,
    pub bounds: AABB<f64>,
    pub points: Vec<Vector3<f64>>,
}

/// Lazy iterator over the non-empty windows of a sliding window grid. Each window spans the horizontal
/// rectangle of its 2D window and the full vertical range of the point cloud, widened by `z_margin` at the
/// bottom and at the top. Only the points of the current window are materialized, so peak memory is bounded by
/// the largest single window and not by the sum over all windows.
///
/// Windows are not a partition of the cloud: with overlap, a point ends up in several windows.
pub struct WindowCropper<'a> {
    cloud: &'a PointCloud,
    windows: &'a [Window2D],
    z_min: f64,
    z_max: f64,
    next_window: usize,
    skipped: usize,
}

impl<'a> WindowCropper<'a> {
    /// Number of windows dropped so far because they contained `MIN_POINTS_PER_WINDOW` points or fewer
    pub fn skipped_windows(&self) -> usize {
        self.skipped
    }

    /// Vertical range `(z_min, z_max)` shared by all 3D windows
    pub fn vertical_range(&self) -> (f64, f64) {
        (self.z_min, self.z_max)
    }
}

impl<'a> Iterator for WindowCropper<'a> {
    type Item = CroppedWindow;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_window < self.windows.len() {
            let index = self.next_window;
            self.next_window += 1;

            let bounds = self.windows[index].to_3d(self.z_min, self.z_max);
            let points = self.cloud.crop(&bounds).copied().collect::<Vec<_>>();
            if points.len() > MIN_POINTS_PER_WINDOW {
                return Some(CroppedWindow {
                    index,
                    bounds,
                    points,
                });
            }
            self.skipped += 1;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.windows.len() - self.next_window))
    }
}

/// Creates a [WindowCropper] that yields the points of `cloud` inside each of the given `windows`, in the order of
/// `windows`. `extents` must be the extents of `cloud`; they define the vertical range
/// `[z_min - z_margin, z_min + z_span + z_margin]` of every 3D window.
///
/// # Errors
///
/// If `z_margin` is negative or not finite
pub fn crop_windows<'a>(
    cloud: &'a PointCloud,
    extents: &Extents,
    windows: &'a [Window2D],
    z_margin: f64,
) -> Result<WindowCropper<'a>> {
    if !z_margin.is_finite() || z_margin < 0.0 {
        bail!("Vertical margin must be >= 0, but was {}", z_margin);
    }
    Ok(WindowCropper {
        cloud,
        windows,
        z_min: extents.min.z - z_margin,
        z_max: extents.min.z + extents.span.z + z_margin,
        next_window: 0,
        skipped: 0,
    })
}
