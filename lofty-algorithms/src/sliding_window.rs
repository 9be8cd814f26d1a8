use std::time::Instant;

use anyhow::{bail, Result};
use lofty_core::{math::AABB, nalgebra::Point3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::extents::Extents;

/// A square window in the horizontal plane, spanning `[start_x, end_x] x [start_y, end_y]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window2D {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl Window2D {
    /// Horizontal center of this window as `(x, y)`
    pub fn center(&self) -> (f64, f64) {
        (
            (self.start_x + self.end_x) / 2.0,
            (self.start_y + self.end_y) / 2.0,
        )
    }

    /// Extends this window into a 3D box ranging from `z_min` to `z_max` vertically
    pub fn to_3d(&self, z_min: f64, z_max: f64) -> AABB<f64> {
        AABB::from_min_max_unchecked(
            Point3::new(self.start_x, self.start_y, z_min),
            Point3::new(self.end_x, self.end_y, z_max),
        )
    }
}

/// Parameters of the sliding window grid
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowGridParameters {
    /// Side length of each window, in the units of the point cloud (usually meters)
    pub kernel_size: f64,
    /// Fraction of `kernel_size` that two neighbouring windows share. Must be in `[0, 1)`
    pub overlap: f64,
}

impl Default for WindowGridParameters {
    fn default() -> Self {
        Self {
            kernel_size: 3.0,
            overlap: 0.0,
        }
    }
}

impl WindowGridParameters {
    pub fn new(kernel_size: f64, overlap: f64) -> Result<Self> {
        let params = Self {
            kernel_size,
            overlap,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks that the grid can be generated, i.e. that the window step is positive and finite
    pub fn validate(&self) -> Result<()> {
        if !self.kernel_size.is_finite() || self.kernel_size <= 0.0 {
            bail!(
                "Kernel size must be a positive number, but was {}",
                self.kernel_size
            );
        }
        if !self.overlap.is_finite() || self.overlap < 0.0 || self.overlap >= 1.0 {
            bail!(
                "Window overlap must be in the range [0, 1), but was {}",
                self.overlap
            );
        }
        Ok(())
    }

    /// Distance between the starts of two neighbouring windows
    pub fn step(&self) -> f64 {
        self.kernel_size - self.overlap * self.kernel_size
    }
}

/// Number of window starts along one axis. Starts are placed at `min + i * step` for as long as they are smaller
/// than `max + step`, so the last window always starts at or beyond `max`
fn window_starts(min: f64, span: f64, step: f64) -> impl Iterator<Item = f64> {
    let bound = min + span + step;
    (0usize..)
        .map(move |idx| min + idx as f64 * step)
        .take_while(move |start| *start < bound)
}

/// Tiles the horizontal footprint described by `extents` with square windows of side `kernel_size`. Windows are
/// returned in raster order: rows advance along y in the outer loop, columns along x in the inner loop, both in
/// increasing coordinate direction.
///
/// The grid deliberately overshoots the footprint by one step on each axis: windows keep being emitted as long as
/// their start is smaller than `max + kernel_size * (1 - overlap)`. For `overlap == 0` this gives
/// `ceil(span / kernel_size) + 1` windows per axis. Windows at the far border may therefore contain few or no
/// points.
///
/// # Errors
///
/// If `params` fail [validation](WindowGridParameters::validate)
/// ```
/// # use lofty_algorithms::{extents::Extents, sliding_window::*};
/// # use lofty_core::nalgebra::{Point3, Vector3};
/// let extents = Extents { min: Point3::new(0.0, 0.0, 0.0), span: Vector3::new(12.0, 4.0, 1.0) };
/// let windows = generate_windows(&extents, &WindowGridParameters::new(5.0, 0.0).unwrap()).unwrap();
/// assert_eq!(windows.len(), 4 * 2);
/// assert_eq!(windows[1].start_x, 5.0);
/// ```
pub fn generate_windows(extents: &Extents, params: &WindowGridParameters) -> Result<Vec<Window2D>> {
    params.validate()?;
    let t_start = Instant::now();

    let step = params.step();
    let starts_x = window_starts(extents.min.x, extents.span.x, step).collect::<Vec<_>>();
    let windows = window_starts(extents.min.y, extents.span.y, step)
        .flat_map(|start_y| {
            starts_x.iter().map(move |&start_x| Window2D {
                start_x,
                start_y,
                end_x: start_x + params.kernel_size,
                end_y: start_y + params.kernel_size,
            })
        })
        .collect::<Vec<_>>();

    log::info!(
        "{} 2D windows created in {:.3}s",
        windows.len(),
        t_start.elapsed().as_secs_f64()
    );
    Ok(windows)
}
