use std::time::Instant;

use anyhow::{bail, Result};
use float_ord::FloatOrd;
use lofty_core::{math::AABB, nalgebra::Point3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::crop::CroppedWindow;

/// Selects how many points of a window count towards its flatness score
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InlierSelector {
    /// A fixed number of points per window
    Count(usize),
    /// A percentage (0-100] of the points in each window. Scales with downsampling, unlike `Count`
    Percentage(f64),
}

impl Default for InlierSelector {
    fn default() -> Self {
        InlierSelector::Count(100)
    }
}

impl InlierSelector {
    /// Builds an `InlierSelector` from the two optional command line style parameters. If both are given, the
    /// percentage wins and a warning is logged. If neither is given, the default selector is used
    /// ```
    /// # use lofty_algorithms::flatness::InlierSelector;
    /// assert_eq!(InlierSelector::from_options(Some(300), Some(20.0)).unwrap(), InlierSelector::Percentage(20.0));
    /// assert_eq!(InlierSelector::from_options(Some(300), None).unwrap(), InlierSelector::Count(300));
    /// ```
    pub fn from_options(count: Option<usize>, percentage: Option<f64>) -> Result<Self> {
        let selector = match (count, percentage) {
            (Some(count), Some(percentage)) => {
                log::warn!(
                    "Both an inlier count ({}) and an inlier percentage ({}%) were given, using the percentage",
                    count,
                    percentage
                );
                InlierSelector::Percentage(percentage)
            }
            (None, Some(percentage)) => InlierSelector::Percentage(percentage),
            (Some(count), None) => InlierSelector::Count(count),
            (None, None) => InlierSelector::default(),
        };
        selector.validate()?;
        Ok(selector)
    }

    /// Checks that this selector yields a usable number of inliers. Percentages below 1 are accepted, see
    /// [looks_like_fraction](InlierSelector::looks_like_fraction)
    pub fn validate(&self) -> Result<()> {
        match *self {
            InlierSelector::Count(0) => bail!("Inlier count must be at least 1"),
            InlierSelector::Count(_) => {}
            InlierSelector::Percentage(percentage) => {
                if !percentage.is_finite() || percentage <= 0.0 || percentage > 100.0 {
                    bail!(
                        "Inlier percentage must be in the range (0, 100], but was {}",
                        percentage
                    );
                }
            }
        }
        Ok(())
    }

    /// True for percentages below 1, which usually are a fraction that was meant as a percentage (0.3 instead
    /// of 30)
    pub fn looks_like_fraction(&self) -> bool {
        matches!(*self, InlierSelector::Percentage(percentage) if percentage < 1.0)
    }

    /// Logs a warning if [looks_like_fraction](InlierSelector::looks_like_fraction) holds
    pub fn warn_if_fraction(&self) {
        if let InlierSelector::Percentage(percentage) = *self {
            if self.looks_like_fraction() {
                log::warn!(
                    "The inlier percentage {}% is smaller than 1%. Was this intended, or did you mean {}%?",
                    percentage,
                    percentage * 100.0
                );
            }
        }
    }

    /// Number of inliers for a window containing `subset_len` points
    pub fn resolve(&self, subset_len: usize) -> usize {
        match *self {
            InlierSelector::Count(count) => count,
            InlierSelector::Percentage(percentage) => {
                (subset_len as f64 * percentage / 100.0) as usize
            }
        }
    }
}

/// Parameters of the flatness scoring
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlatnessParameters {
    /// Side length of the windows, used to scale the density threshold
    pub kernel_size: f64,
    /// Stride by which the cloud was downsampled before the analysis
    pub downsampling_factor: usize,
    /// Number of points a 10 m x 10 m window of the full-resolution cloud needs to be scored
    pub min_points_threshold: usize,
    /// The `k_margin_points_z` highest points of a window are treated as noise; the reference height is the height
    /// of the `k_margin_points_z`-th highest point
    pub k_margin_points_z: usize,
    pub inliers: InlierSelector,
}

impl Default for FlatnessParameters {
    fn default() -> Self {
        Self {
            kernel_size: 3.0,
            downsampling_factor: 1,
            min_points_threshold: 7000,
            k_margin_points_z: 10,
            inliers: Default::default(),
        }
    }
}

impl FlatnessParameters {
    pub fn validate(&self) -> Result<()> {
        if !self.kernel_size.is_finite() || self.kernel_size <= 0.0 {
            bail!(
                "Kernel size must be a positive number, but was {}",
                self.kernel_size
            );
        }
        if self.downsampling_factor == 0 {
            bail!("Downsampling factor must be at least 1");
        }
        if self.k_margin_points_z == 0 {
            bail!("k_margin_points_z must be at least 1");
        }
        self.inliers.validate()
    }

    /// Number of points a window must exceed to be scored. The threshold grows with the window area and shrinks
    /// with the downsampling factor
    /// ```
    /// # use lofty_algorithms::flatness::FlatnessParameters;
    /// let params = FlatnessParameters { kernel_size: 10.0, ..Default::default() };
    /// assert_eq!(params.required_density(), 7000.0);
    /// ```
    pub fn required_density(&self) -> f64 {
        self.min_points_threshold as f64 * self.kernel_size.powi(2)
            / 100.0
            / self.downsampling_factor as f64
    }
}

/// Score of a single window before sparse windows are resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowScore {
    /// Mean vertical distance of the inliers to the reference height. Lower is flatter
    Scored(f64),
    /// The window had too few points to be scored
    Sparse,
}

impl WindowScore {
    pub fn score(&self) -> Option<f64> {
        match *self {
            WindowScore::Scored(score) => Some(score),
            WindowScore::Sparse => None,
        }
    }
}

/// Result of scoring one window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredWindow {
    /// Index of the window within the 2D window grid
    pub index: usize,
    pub bounds: AABB<f64>,
    pub score: WindowScore,
    /// Horizontal window center with the mean height of the highest inliers. Sparse windows use the center of
    /// their 3D box
    pub center: Point3<f64>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Scores the flatness of a single cropped window.
///
/// All heights are sorted ascending and the height of the `k_margin_points_z`-th highest point becomes the reference
/// height, so that a few spikes above the canopy are ignored. The absolute vertical distances of all points to the
/// reference are sorted ascending and the score is the mean of the distances at ranks `1..inliers`. Rank 0 is the
/// reference point itself and would pull the score towards zero.
///
/// The landing center is the horizontal window center, at the mean height of the `inliers` highest points.
pub fn score_window(window: &CroppedWindow, params: &FlatnessParameters) -> ScoredWindow {
    let count = window.points.len();
    let box_center = window.bounds.center();
    if count as f64 <= params.required_density() || count < 2 {
        return ScoredWindow {
            index: window.index,
            bounds: window.bounds,
            score: WindowScore::Sparse,
            center: box_center,
        };
    }

    let mut heights = window.points.iter().map(|p| p.z).collect::<Vec<_>>();
    heights.sort_by_key(|z| FloatOrd(*z));

    let reference_height = heights[count.saturating_sub(params.k_margin_points_z)];
    let mut distances = heights
        .iter()
        .map(|z| (z - reference_height).abs())
        .collect::<Vec<_>>();
    distances.sort_by_key(|d| FloatOrd(*d));

    let inliers = params.inliers.resolve(count);
    let flatness = mean(&distances[1..inliers.max(2).min(count)]);

    let top_points = inliers.max(1).min(count);
    let landing_height = mean(&heights[count - top_points..]);

    ScoredWindow {
        index: window.index,
        bounds: window.bounds,
        score: WindowScore::Scored(flatness),
        center: Point3::new(box_center.x, box_center.y, landing_height),
    }
}

/// Replaces the score of every sparse window with the worst (largest) score of all scored windows, so that sparse
/// windows rank last without stretching the score range.
///
/// # Errors
///
/// If no window was scored at all
pub fn replace_sparse_scores(windows: &[ScoredWindow]) -> Result<Vec<f64>> {
    let worst_score = windows
        .iter()
        .filter_map(|window| window.score.score())
        .max_by_key(|score| FloatOrd(*score));
    let worst_score = match worst_score {
        Some(score) => score,
        None => bail!(
            "No valid window found: no window met the density threshold ({} windows checked)",
            windows.len()
        ),
    };
    Ok(windows
        .iter()
        .map(|window| window.score.score().unwrap_or(worst_score))
        .collect())
}

/// Flatness scores and landing centers of all windows that survived cropping, in window grid order
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlatnessReport {
    pub scores: Vec<f64>,
    pub centers: Vec<Point3<f64>>,
    /// 3D box of each window
    pub bounds: Vec<AABB<f64>>,
    /// Index of each window within the 2D window grid
    pub grid_indices: Vec<usize>,
    /// Number of windows that were too sparse to be scored and received the worst score
    pub sparse_windows: usize,
}

impl FlatnessReport {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Scores all `windows` in two phases. First every window is scored on its own with [score_window], then the scores
/// of sparse windows are replaced through [replace_sparse_scores]. Windows are consumed one at a time, so only the
/// points of a single window are held in memory if `windows` is lazy.
///
/// # Errors
///
/// If `params` are invalid, or if every window is sparse
pub fn score_windows<I: IntoIterator<Item = CroppedWindow>>(
    windows: I,
    params: &FlatnessParameters,
) -> Result<FlatnessReport> {
    params.validate()?;
    let t_start = Instant::now();

    let scored = windows
        .into_iter()
        .map(|window| score_window(&window, params))
        .collect::<Vec<_>>();
    let scores = replace_sparse_scores(&scored)?;

    let sparse_windows = scored
        .iter()
        .filter(|window| window.score == WindowScore::Sparse)
        .count();
    log::info!(
        "Scored {} windows ({} too sparse) in {:.3}s",
        scored.len(),
        sparse_windows,
        t_start.elapsed().as_secs_f64()
    );

    Ok(FlatnessReport {
        scores,
        centers: scored.iter().map(|window| window.center).collect(),
        bounds: scored.iter().map(|window| window.bounds).collect(),
        grid_indices: scored.iter().map(|window| window.index).collect(),
        sparse_windows,
    })
}
