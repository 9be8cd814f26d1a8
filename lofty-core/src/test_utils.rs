use nalgebra::Vector3;
use rand::{prelude::Distribution, rngs::StdRng, Rng, SeedableRng};

use crate::containers::PointCloud;

/// Samples positions uniformly inside `[0, extent)` on every axis
pub(crate) struct UniformPositionDistribution {
    pub extent: Vector3<f64>,
}

impl Distribution<Vector3<f64>> for UniformPositionDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3<f64> {
        Vector3::new(
            rng.gen::<f64>() * self.extent.x,
            rng.gen::<f64>() * self.extent.y,
            rng.gen::<f64>() * self.extent.z,
        )
    }
}

pub(crate) fn random_cloud(count: usize, seed: u64) -> PointCloud {
    let rng = StdRng::seed_from_u64(seed);
    rng.sample_iter(UniformPositionDistribution {
        extent: Vector3::new(10.0, 20.0, 5.0),
    })
    .take(count)
    .collect()
}
