#![warn(clippy::all)]

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{App, Arg};
use log::info;
use lofty_io::batch::copy_filtered;

struct Args {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub exclusion: String,
    pub extension: String,
}

fn get_args() -> Result<Args> {
    let matches = App::new("lofty copy laz")
        .version("0.1")
        .about("Copies all files of one type from a folder tree into a single folder, skipping files by name")
        .arg(
            Arg::with_name("INPUT")
                .short("i")
                .long("input")
                .takes_value(true)
                .value_name("INPUT")
                .help("Folder that is searched recursively")
                .required(true),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Target folder. Created if it does not exist")
                .required(true),
        )
        .arg(
            Arg::with_name("EXCLUDE")
                .short("e")
                .long("exclude")
                .takes_value(true)
                .default_value("TLS")
                .help("Files whose name contains this text are not copied. Pass an empty string to copy all files"),
        )
        .arg(
            Arg::with_name("EXTENSION")
                .long("extension")
                .takes_value(true)
                .default_value("laz")
                .help("Extension of the copied files"),
        )
        .get_matches();

    let input_dir = PathBuf::from(matches.value_of("INPUT").unwrap());
    if !input_dir.is_dir() {
        return Err(anyhow!("Input path {} is no directory!", input_dir.display()));
    }

    Ok(Args {
        input_dir,
        output_dir: PathBuf::from(matches.value_of("OUTPUT").unwrap()),
        exclusion: matches.value_of("EXCLUDE").unwrap_or_default().to_owned(),
        extension: matches.value_of("EXTENSION").unwrap_or("laz").to_owned(),
    })
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = get_args()?;
    let copied = copy_filtered(
        &args.input_dir,
        &args.output_dir,
        &args.extension,
        &args.exclusion,
    )?;
    for file in &copied {
        println!("{}", file.display());
    }
    info!(
        "Copied {} .{} files into {}",
        copied.len(),
        args.extension,
        args.output_dir.display()
    );
    Ok(())
}
