use std::str::FromStr;

use anyhow::{bail, Result};
use float_ord::FloatOrd;
use lofty_core::nalgebra::Point3;

use crate::flatness::FlatnessReport;

/// A window of a [FlatnessReport] together with its rank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedWindow {
    /// 0 is the flattest window
    pub rank: usize,
    /// Position of the window within the report
    pub index: usize,
    pub score: f64,
    pub center: Point3<f64>,
    /// Score mapped linearly from the score range of the selection to `[0, 1]`
    pub normalized: f64,
}

/// Returns the indices of `scores` ordered from the lowest (flattest) to the highest score. Equal scores keep their
/// original order
/// ```
/// # use lofty_algorithms::ranking::rank_ascending;
/// assert_eq!(rank_ascending(&[0.3, 0.1, 0.2, 0.1]), vec![1, 3, 2, 0]);
/// ```
pub fn rank_ascending(scores: &[f64]) -> Vec<usize> {
    let mut indices = (0..scores.len()).collect::<Vec<_>>();
    indices.sort_by_key(|&idx| FloatOrd(scores[idx]));
    indices
}

/// Selects the best `percent` percent of the windows in `report`, i.e. the `floor(len * percent / 100)` windows with
/// the lowest scores, in ascending score order
///
/// # Errors
///
/// If `percent` is not within `(0, 100]`
pub fn select_top_percent(report: &FlatnessReport, percent: f64) -> Result<Vec<RankedWindow>> {
    if !percent.is_finite() || percent <= 0.0 || percent > 100.0 {
        bail!(
            "Percentage of best windows must be in the range (0, 100], but was {}",
            percent
        );
    }
    let count = (report.len() as f64 * percent / 100.0) as usize;
    if count == 0 {
        log::warn!(
            "Selecting {}% of {} windows leaves no window to show",
            percent,
            report.len()
        );
        return Ok(vec![]);
    }

    let selected = rank_ascending(&report.scores)
        .into_iter()
        .take(count)
        .collect::<Vec<_>>();
    let best = report.scores[selected[0]];
    let worst = report.scores[selected[count - 1]];
    let range = worst - best;

    Ok(selected
        .into_iter()
        .enumerate()
        .map(|(rank, index)| {
            let score = report.scores[index];
            RankedWindow {
                rank,
                index,
                score,
                center: report.centers[index],
                normalized: if range > 0.0 {
                    (score - best) / range
                } else {
                    0.0
                },
            }
        })
        .collect())
}

/// Colormaps for coloring ranked windows, named after their matplotlib counterparts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Cyan to magenta
    Cool,
    /// Black over red and yellow to white
    Hot,
    Gray,
    Viridis,
}

const VIRIDIS_ANCHORS: [[f64; 3]; 5] = [
    [68.0, 1.0, 84.0],
    [59.0, 82.0, 139.0],
    [33.0, 145.0, 140.0],
    [94.0, 201.0, 98.0],
    [253.0, 231.0, 37.0],
];

impl Colormap {
    /// Maps `value` (clamped to `[0, 1]`) to an RGB color
    /// ```
    /// # use lofty_algorithms::ranking::Colormap;
    /// assert_eq!(Colormap::Cool.map(0.0), [0, 255, 255]);
    /// assert_eq!(Colormap::Cool.map(1.0), [255, 0, 255]);
    /// ```
    pub fn map(&self, value: f64) -> [u8; 3] {
        let t = if value.is_nan() { 0.0 } else { value.max(0.0).min(1.0) };
        let rgb = match self {
            Colormap::Cool => [t, 1.0 - t, 1.0],
            Colormap::Hot => [
                (3.0 * t).min(1.0),
                (3.0 * t - 1.0).max(0.0).min(1.0),
                (3.0 * t - 2.0).max(0.0).min(1.0),
            ],
            Colormap::Gray => [t, t, t],
            Colormap::Viridis => {
                let scaled = t * (VIRIDIS_ANCHORS.len() - 1) as f64;
                let lower = (scaled.floor() as usize).min(VIRIDIS_ANCHORS.len() - 2);
                let frac = scaled - lower as f64;
                let (a, b) = (VIRIDIS_ANCHORS[lower], VIRIDIS_ANCHORS[lower + 1]);
                [
                    (a[0] + (b[0] - a[0]) * frac) / 255.0,
                    (a[1] + (b[1] - a[1]) * frac) / 255.0,
                    (a[2] + (b[2] - a[2]) * frac) / 255.0,
                ]
            }
        };
        [
            (rgb[0] * 255.0).round() as u8,
            (rgb[1] * 255.0).round() as u8,
            (rgb[2] * 255.0).round() as u8,
        ]
    }
}

impl FromStr for Colormap {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cool" => Ok(Colormap::Cool),
            "hot" => Ok(Colormap::Hot),
            "gray" | "grey" => Ok(Colormap::Gray),
            "viridis" => Ok(Colormap::Viridis),
            _ => bail!(
                "Unknown colormap '{}', expected one of cool, hot, gray, viridis",
                s
            ),
        }
    }
}
