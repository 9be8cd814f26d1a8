use anyhow::Result;
use lofty_algorithms::{
    analysis::{find_landing_sites, LandingSiteConfig},
    flatness::InlierSelector,
    ranking::{select_top_percent, Colormap},
};
use lofty_core::{containers::PointCloud, nalgebra::Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Synthetic 40 m x 40 m forest: a rough canopy at ~25 m with a flat clearing of crowns around (30, 10)
fn synthetic_canopy(rng: &mut StdRng) -> PointCloud {
    (0..200_000)
        .map(|_| {
            let x = rng.gen_range(0.0..40.0);
            let y = rng.gen_range(0.0..40.0);
            let in_clearing = (x - 30.0_f64).abs() < 4.0 && (y - 10.0_f64).abs() < 4.0;
            let z = if in_clearing {
                24.0 + rng.gen_range(0.0..0.1)
            } else {
                20.0 + rng.gen_range(0.0..8.0)
            };
            Vector3::new(x, y, z)
        })
        .collect()
}

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(4711);
    let cloud = synthetic_canopy(&mut rng);

    let config = LandingSiteConfig {
        kernel_size: 4.0,
        min_points_threshold: 1000,
        inliers: InlierSelector::Percentage(20.0),
        ..Default::default()
    };
    let report = find_landing_sites(&cloud, &config)?;
    println!(
        "Scored {} windows, {} of them too sparse",
        report.len(),
        report.sparse_windows
    );

    for site in select_top_percent(&report, 5.0)? {
        println!(
            "#{} score {:.4} at ({:.1}, {:.1}, {:.2}) color {:?}",
            site.rank + 1,
            site.score,
            site.center.x,
            site.center.y,
            site.center.z,
            Colormap::Viridis.map(site.normalized)
        );
    }
    Ok(())
}
