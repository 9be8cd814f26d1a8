use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{anyhow, Context, Result};
use clap::{value_t, App, Arg};
use lofty_algorithms::{
    analysis::{find_landing_sites, LandingSiteConfig},
    flatness::{FlatnessReport, InlierSelector},
    ranking::{rank_ascending, select_top_percent, Colormap, RankedWindow},
};
use lofty_core::{containers::PointCloud, math::AABB};
use lofty_io::base::read_point_cloud;
use log::info;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

const PLOT_WIDTH: u32 = 1024;
const MAX_PLOTTED_POINTS: usize = 500_000;

struct Args {
    pub input_file: PathBuf,
    pub config: LandingSiteConfig,
    pub top_percent: f64,
    pub colormap: Colormap,
    pub csv_file: Option<PathBuf>,
    pub plot_file: Option<PathBuf>,
}

fn get_args() -> Result<Args> {
    let matches = App::new("lofty landing sites")
        .version("0.1")
        .about("Scans a canopy point cloud with a sliding window and ranks the windows by flatness")
        .arg(
            Arg::with_name("INPUT")
                .short("i")
                .long("input")
                .takes_value(true)
                .value_name("INPUT")
                .help("Input point cloud file (.las, .laz or .pcd)")
                .required(true),
        )
        .arg(
            Arg::with_name("CONFIG")
                .long("config")
                .takes_value(true)
                .value_name("JSON")
                .help("JSON file with analysis parameters. Parameters given on the command line take precedence"),
        )
        .arg(
            Arg::with_name("KERNEL_SIZE")
                .short("k")
                .long("kernel-size")
                .takes_value(true)
                .help("Side length of the square windows in meters [default: 3]"),
        )
        .arg(
            Arg::with_name("OVERLAP")
                .long("overlap")
                .takes_value(true)
                .help("Fraction of the kernel size shared by neighbouring windows, in [0, 1) [default: 0]"),
        )
        .arg(
            Arg::with_name("Z_MARGIN")
                .long("z-margin")
                .takes_value(true)
                .help("Vertical margin below and above the cloud for the cropping boxes in meters [default: 1]"),
        )
        .arg(
            Arg::with_name("SKIP_POINTS")
                .long("skip-points")
                .takes_value(true)
                .help("Keep only every n-th point of the input. Also used as the downsampling factor of the density threshold [default: 1]"),
        )
        .arg(
            Arg::with_name("MIN_POINTS")
                .long("min-points")
                .takes_value(true)
                .help("Points a 10 m x 10 m window of the full resolution cloud needs to be scored [default: 7000]"),
        )
        .arg(
            Arg::with_name("K_MARGIN")
                .long("k-margin")
                .takes_value(true)
                .help("Number of highest points per window treated as noise [default: 10]"),
        )
        .arg(
            Arg::with_name("INLIERS")
                .long("inliers")
                .takes_value(true)
                .help("Number of points used for the flatness estimate [default: 100]"),
        )
        .arg(
            Arg::with_name("INLIER_PERCENTAGE")
                .long("inlier-percentage")
                .takes_value(true)
                .help("Percentage of the window's points used for the flatness estimate. Wins over --inliers"),
        )
        .arg(
            Arg::with_name("TOP_PERCENT")
                .long("top-percent")
                .takes_value(true)
                .default_value("10")
                .help("Percentage of the flattest windows that are printed and plotted"),
        )
        .arg(
            Arg::with_name("COLORMAP")
                .long("colormap")
                .takes_value(true)
                .possible_values(&["cool", "hot", "gray", "viridis"])
                .case_insensitive(true)
                .default_value("cool")
                .help("Colormap for the plotted windows"),
        )
        .arg(
            Arg::with_name("CSV")
                .long("csv")
                .takes_value(true)
                .value_name("CSV")
                .help("Write all windows ordered by flatness to this CSV file"),
        )
        .arg(
            Arg::with_name("PLOT")
                .long("plot")
                .takes_value(true)
                .value_name("PNG")
                .help("Draw a top-down view of the cloud and the flattest windows into this PNG file"),
        )
        .get_matches();

    let mut config = match matches.value_of("CONFIG") {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Could not open configuration file {}", path))?;
            serde_json::from_reader(file)
                .with_context(|| format!("Invalid configuration file {}", path))?
        }
        None => LandingSiteConfig::default(),
    };
    if matches.is_present("KERNEL_SIZE") {
        config.kernel_size = value_t!(matches, "KERNEL_SIZE", f64)?;
    }
    if matches.is_present("OVERLAP") {
        config.overlap = value_t!(matches, "OVERLAP", f64)?;
    }
    if matches.is_present("Z_MARGIN") {
        config.z_margin = value_t!(matches, "Z_MARGIN", f64)?;
    }
    if matches.is_present("SKIP_POINTS") {
        config.downsampling_factor = value_t!(matches, "SKIP_POINTS", usize)?;
    }
    if matches.is_present("MIN_POINTS") {
        config.min_points_threshold = value_t!(matches, "MIN_POINTS", usize)?;
    }
    if matches.is_present("K_MARGIN") {
        config.k_margin_points_z = value_t!(matches, "K_MARGIN", usize)?;
    }
    if matches.is_present("INLIERS")
        || matches.is_present("INLIER_PERCENTAGE")
    {
        let count = matches
            .value_of("INLIERS")
            .map(|_| value_t!(matches, "INLIERS", usize))
            .transpose()?;
        let percentage = matches
            .value_of("INLIER_PERCENTAGE")
            .map(|_| value_t!(matches, "INLIER_PERCENTAGE", f64))
            .transpose()?;
        config.inliers = InlierSelector::from_options(count, percentage)?;
    }

    Ok(Args {
        input_file: PathBuf::from(matches.value_of("INPUT").unwrap()),
        config,
        top_percent: value_t!(matches, "TOP_PERCENT", f64)?,
        colormap: matches.value_of("COLORMAP").unwrap().parse()?,
        csv_file: matches.value_of("CSV").map(PathBuf::from),
        plot_file: matches.value_of("PLOT").map(PathBuf::from),
    })
}

fn write_csv(report: &FlatnessReport, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(
        File::create(path).with_context(|| format!("Could not create CSV file {}", path.display()))?,
    );
    writeln!(writer, "rank,score,x,y,z")?;
    for (rank, index) in rank_ascending(&report.scores).into_iter().enumerate() {
        let center = &report.centers[index];
        writeln!(
            writer,
            "{},{},{},{},{}",
            rank + 1,
            report.scores[index],
            center.x,
            center.y,
            center.z
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn print_sites(sites: &[RankedWindow]) {
    println!("{:>5} {:>12} {:>14} {:>14} {:>10}", "rank", "score", "x", "y", "z");
    for site in sites {
        println!(
            "{:>5} {:>12.5} {:>14.3} {:>14.3} {:>10.3}",
            site.rank + 1,
            site.score,
            site.center.x,
            site.center.y,
            site.center.z
        );
    }
}

fn plot_sites(
    cloud: &PointCloud,
    sites: &[RankedWindow],
    report: &FlatnessReport,
    colormap: Colormap,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let bounds = report
        .bounds
        .iter()
        .fold(cloud.bounds(), |acc, window| match acc {
            Some(acc) => Some(AABB::union(&acc, window)),
            None => Some(*window),
        })
        .ok_or("Cannot plot an empty point cloud")?;
    let extent = bounds.extent();
    let height = ((PLOT_WIDTH as f64 * extent.y / extent.x.max(f64::EPSILON)).round() as u32)
        .max(1)
        .min(4 * PLOT_WIDTH);

    let root = BitMapBackend::new(path, (PLOT_WIDTH, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.apply_coord_spec(Cartesian2d::<RangedCoordf64, RangedCoordf64>::new(
        bounds.min().x..bounds.max().x,
        bounds.min().y..bounds.max().y,
        (0..PLOT_WIDTH as i32, height as i32..0),
    ));

    let stride = (cloud.len() / MAX_PLOTTED_POINTS).max(1);
    let (z_min, z_max) = (bounds.min().z, bounds.max().z);
    for position in cloud.iter().step_by(stride) {
        let t = (position.z - z_min) / (z_max - z_min).max(f64::EPSILON);
        let gray = (200.0 - 160.0 * t) as u8;
        root.draw_pixel((position.x, position.y), &RGBColor(gray, gray, gray))?;
    }

    // draw the worst selected windows first so the best ones end up on top
    for site in sites.iter().rev() {
        let window = &report.bounds[site.index];
        let [r, g, b] = colormap.map(site.normalized);
        root.draw(&Rectangle::new(
            [
                (window.min().x, window.min().y),
                (window.max().x, window.max().y),
            ],
            ShapeStyle::from(&RGBColor(r, g, b).mix(0.7)).filled(),
        ))?;
        root.draw(&Circle::new(
            (site.center.x, site.center.y),
            2,
            ShapeStyle::from(&BLACK).filled(),
        ))?;
    }
    root.present()?;
    Ok(())
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = get_args()?;
    args.config.validate()?;

    let t_start = Instant::now();
    let full_cloud = read_point_cloud(&args.input_file)?;
    let cloud = full_cloud.uniform_down_sample(args.config.downsampling_factor)?;
    info!(
        "Loaded {} points ({} after downsampling) in {:.2}s",
        full_cloud.len(),
        cloud.len(),
        t_start.elapsed().as_secs_f64()
    );
    drop(full_cloud);

    let report = find_landing_sites(&cloud, &args.config)?;
    let sites = select_top_percent(&report, args.top_percent)?;

    println!(
        "{} of {} scored windows are in the flattest {}%",
        sites.len(),
        report.len(),
        args.top_percent
    );
    print_sites(&sites);

    if let Some(csv_file) = &args.csv_file {
        write_csv(&report, csv_file)?;
        info!("Wrote {} windows to {}", report.len(), csv_file.display());
    }
    if let Some(plot_file) = &args.plot_file {
        plot_sites(&cloud, &sites, &report, args.colormap, plot_file)
            .map_err(|why| anyhow!("Could not draw {}: {}", plot_file.display(), why))?;
        info!("Wrote plot to {}", plot_file.display());
    }
    Ok(())
}
