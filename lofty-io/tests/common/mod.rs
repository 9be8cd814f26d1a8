#![allow(dead_code)]

use std::path::PathBuf;

use lofty_core::{containers::PointCloud, nalgebra::Vector3};
use rand::{prelude::Distribution, rngs::StdRng, Rng, SeedableRng};

/// Positions scattered around a georeferenced origin, similar to what airborne LAS tiles contain
pub struct GeoreferencedDistribution;

impl Distribution<Vector3<f64>> for GeoreferencedDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3<f64> {
        Vector3::new(
            512_000.0 + rng.gen_range(0.0..100.0),
            5_403_000.0 + rng.gen_range(0.0..100.0),
            350.0 + rng.gen_range(0.0..40.0),
        )
    }
}

pub fn georeferenced_cloud(count: usize, seed: u64) -> PointCloud {
    StdRng::seed_from_u64(seed)
        .sample_iter(GeoreferencedDistribution)
        .take(count)
        .collect()
}

/// Fresh, empty directory below the system temp dir. Remove it with `std::fs::remove_dir_all` once the test is done
pub fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("lofty_io_tests")
        .join(format!("{}_{}", name, std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("Could not clear test directory");
    }
    std::fs::create_dir_all(&dir).expect("Could not create test directory");
    dir
}

/// Asserts that both clouds contain the same points in the same order, up to `tolerance` per coordinate
pub fn assert_same_positions(expected: &PointCloud, actual: &PointCloud, tolerance: f64) {
    assert_eq!(expected.len(), actual.len());
    for (idx, (e, a)) in expected.iter().zip(actual.iter()).enumerate() {
        let max_difference = (e - a).abs().max();
        assert!(
            max_difference <= tolerance,
            "Point {} differs: expected {:?} but got {:?}",
            idx,
            e,
            a
        );
    }
}
