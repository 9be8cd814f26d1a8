use std::time::Instant;

use anyhow::{bail, Result};
use lofty_core::containers::PointCloud;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    crop::crop_windows,
    extents::calculate_extents,
    flatness::{score_windows, FlatnessParameters, FlatnessReport, InlierSelector},
    sliding_window::{generate_windows, WindowGridParameters},
};

/// All parameters of a landing-site analysis run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LandingSiteConfig {
    /// Side length of the square windows in meters
    pub kernel_size: f64,
    /// Fraction of `kernel_size` shared by neighbouring windows, in `[0, 1)`
    pub overlap: f64,
    /// Extra vertical room below and above the cloud for the 3D windows, in meters
    pub z_margin: f64,
    /// Stride the input cloud was downsampled with
    pub downsampling_factor: usize,
    /// Points a 10 m x 10 m window of the full-resolution cloud needs to be scored
    pub min_points_threshold: usize,
    /// Number of highest points per window treated as noise
    pub k_margin_points_z: usize,
    pub inliers: InlierSelector,
}

impl Default for LandingSiteConfig {
    fn default() -> Self {
        let grid = WindowGridParameters::default();
        let flatness = FlatnessParameters::default();
        Self {
            kernel_size: grid.kernel_size,
            overlap: grid.overlap,
            z_margin: 1.0,
            downsampling_factor: flatness.downsampling_factor,
            min_points_threshold: flatness.min_points_threshold,
            k_margin_points_z: flatness.k_margin_points_z,
            inliers: flatness.inliers,
        }
    }
}

impl LandingSiteConfig {
    pub fn grid_parameters(&self) -> WindowGridParameters {
        WindowGridParameters {
            kernel_size: self.kernel_size,
            overlap: self.overlap,
        }
    }

    pub fn flatness_parameters(&self) -> FlatnessParameters {
        FlatnessParameters {
            kernel_size: self.kernel_size,
            downsampling_factor: self.downsampling_factor,
            min_points_threshold: self.min_points_threshold,
            k_margin_points_z: self.k_margin_points_z,
            inliers: self.inliers,
        }
    }

    /// Checks all parameters, so that a run fails before any windowing starts
    pub fn validate(&self) -> Result<()> {
        self.grid_parameters().validate()?;
        if !self.z_margin.is_finite() || self.z_margin < 0.0 {
            bail!("Vertical margin must be >= 0, but was {}", self.z_margin);
        }
        self.flatness_parameters().validate()
    }
}

/// Runs the complete landing-site analysis on `cloud`: extents, window grid, cropping and flatness scoring. The
/// returned report has one entry per window containing more than 10 points, in raster order of the window grid.
/// Rank the scores ascending to find the flattest windows.
///
/// `cloud` is expected to be downsampled already by `config.downsampling_factor`.
///
/// # Errors
///
/// If `config` is invalid, `cloud` is empty or no window met the density threshold
pub fn find_landing_sites(cloud: &PointCloud, config: &LandingSiteConfig) -> Result<FlatnessReport> {
    config.validate()?;
    config.inliers.warn_if_fraction();
    let t_start = Instant::now();

    let extents = calculate_extents(cloud)?;
    let windows = generate_windows(&extents, &config.grid_parameters())?;
    let mut cropper = crop_windows(cloud, &extents, &windows, config.z_margin)?;
    let report = score_windows(&mut cropper, &config.flatness_parameters())?;

    log::info!(
        "{} of {} windows contained enough points to be kept, flattest windows found in {:.3}s",
        report.len(),
        windows.len(),
        t_start.elapsed().as_secs_f64()
    );
    log::debug!("{} windows dropped while cropping", cropper.skipped_windows());
    Ok(report)
}
