use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{anyhow, Result};
use clap::{App, Arg};
use float_ord::FloatOrd;
use itertools::Itertools;
use lofty_algorithms::extents::calculate_extents;
use lofty_io::{
    base::{GenericPointReader, PointReader},
    batch::find_files_with_extension,
};
use log::info;

struct Args {
    pub input_path: PathBuf,
    pub detailed: bool,
}

fn get_args() -> Result<Args> {
    let matches = App::new("lofty info")
        .version("0.1")
        .about("Prints information about a point cloud file or all point cloud files in a folder")
        .arg(
            Arg::with_name("INPUT")
                .short("i")
                .takes_value(true)
                .value_name("INPUT")
                .help("Input point cloud file or folder")
                .required(true),
        )
        .arg(
            Arg::with_name("DETAILED")
                .short("d")
                .long("detailed")
                .help("Also print the vertical distribution and the point density of each cloud"),
        )
        .get_matches();

    Ok(Args {
        input_path: PathBuf::from(matches.value_of("INPUT").unwrap()),
        detailed: matches.is_present("DETAILED"),
    })
}

fn get_all_input_files(input_path: &Path) -> Result<Vec<PathBuf>> {
    if !input_path.exists() {
        return Err(anyhow!("Input path {} does not exist!", input_path.display()));
    }
    if input_path.is_file() {
        return Ok(vec![input_path.to_path_buf()]);
    }
    let files = ["pcd", "las", "laz"]
        .iter()
        .map(|extension| find_files_with_extension(input_path, extension))
        .collect::<Result<Vec<_>>>()?;
    Ok(files.into_iter().kmerge().collect())
}

fn print_file_info(path: &Path, detailed: bool) -> Result<()> {
    println!("{}", path.display());
    let mut reader = GenericPointReader::open_file(path)?;
    if let Some(bounds) = reader.header_bounds() {
        println!(
            "\tHeader bounds: {:.3?} - {:.3?}",
            bounds.min().coords.as_slice(),
            bounds.max().coords.as_slice()
        );
    }

    let t_start = Instant::now();
    let cloud = reader.read_all()?;
    info!(
        "Read {} in {:.2}s",
        path.display(),
        t_start.elapsed().as_secs_f64()
    );
    println!("\tPoints: {}", cloud.len());
    if cloud.is_empty() {
        return Ok(());
    }

    let extents = calculate_extents(&cloud)?;
    println!(
        "\tMinimum: {:.3?}",
        extents.min.coords.as_slice()
    );
    println!(
        "\tMaximum: {:.3?}",
        extents.max().coords.as_slice()
    );
    println!("\tExtent: {:.3?}", extents.span.as_slice());

    if detailed {
        let mean_z = cloud.iter().map(|p| p.z).sum::<f64>() / cloud.len() as f64;
        let mut heights = cloud.iter().map(|p| p.z).collect::<Vec<_>>();
        heights.sort_by_key(|z| FloatOrd(*z));
        let median_z = heights[heights.len() / 2];
        println!("\tMean height: {:.3}", mean_z);
        println!("\tMedian height: {:.3}", median_z);

        let area = extents.span.x * extents.span.y;
        if area > 0.0 {
            println!("\tDensity: {:.1} points per square unit", cloud.len() as f64 / area);
            println!(
                "\tPoints per 10x10 window: {:.0}",
                cloud.len() as f64 / area * 100.0
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = get_args()?;
    let files = get_all_input_files(&args.input_path)?;
    if files.is_empty() {
        println!("No point cloud files found in {}", args.input_path.display());
        return Ok(());
    }
    for file in &files {
        print_file_info(file, args.detailed)?;
    }
    Ok(())
}
