#![warn(clippy::all)]

use std::{path::PathBuf, time::Instant};

use anyhow::{anyhow, Result};
use clap::{App, Arg};
use log::{info, warn};
use lofty_io::{
    batch::{convert_folder, ConvertOptions},
    pcd::{PCDDataKind, PCDScalar, PCDWriteOptions},
};

struct Args {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub options: ConvertOptions,
}

fn get_args() -> Result<Args> {
    let matches = App::new("lofty laz to pcd")
        .version("0.1")
        .about("Converts all LAS and LAZ files below a folder into PCD files")
        .arg(
            Arg::with_name("INPUT")
                .short("i")
                .long("input")
                .takes_value(true)
                .value_name("INPUT")
                .help("Folder that is searched recursively for .laz and .las files")
                .required(true),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Folder for the .pcd files. Created if it does not exist")
                .required(true),
        )
        .arg(
            Arg::with_name("ASCII")
                .long("ascii")
                .help("Write ascii instead of binary PCD data"),
        )
        .arg(
            Arg::with_name("SINGLE_PRECISION")
                .long("single-precision")
                .help("Store coordinates as 4 byte floats instead of 8 byte floats"),
        )
        .get_matches();

    let input_dir = PathBuf::from(matches.value_of("INPUT").unwrap());
    if !input_dir.is_dir() {
        return Err(anyhow!("Input path {} is no directory!", input_dir.display()));
    }
    let pcd = PCDWriteOptions {
        data: if matches.is_present("ASCII") {
            PCDDataKind::Ascii
        } else {
            PCDDataKind::Binary
        },
        precision: if matches.is_present("SINGLE_PRECISION") {
            PCDScalar::F32
        } else {
            PCDScalar::F64
        },
    };

    Ok(Args {
        input_dir,
        output_dir: PathBuf::from(matches.value_of("OUTPUT").unwrap()),
        options: ConvertOptions { pcd },
    })
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = get_args()?;
    if args.options.pcd.precision == PCDScalar::F32 {
        warn!("Single precision PCD files lose accuracy for georeferenced coordinates");
    }

    let t_start = Instant::now();
    let reports = convert_folder(&args.input_dir, &args.output_dir, &args.options)?;
    let total_points = reports.iter().map(|report| report.point_count).sum::<usize>();
    for report in &reports {
        println!(
            "{} -> {} ({} points)",
            report.source.display(),
            report.destination.display(),
            report.point_count
        );
    }
    info!(
        "Converted {} files with {} points in {:.2}s",
        reports.len(),
        total_points,
        t_start.elapsed().as_secs_f64()
    );
    Ok(())
}
