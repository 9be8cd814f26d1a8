//! Folder-level operations: converting all LAS/LAZ files of a folder tree into PCD files, and copying the files
//! of one type into a single flat folder

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;
use log::info;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::{
    base::{PointReader, PointWriter},
    las::LASReader,
    pcd::{PCDWriteOptions, PCDWriter},
};

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ex| ex.to_str())
        .map(|ex| ex.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Returns all files below `root` whose extension equals `extension` (case-insensitive, without the leading dot).
/// The paths are sorted lexicographically
pub fn find_files_with_extension<P: AsRef<Path>>(root: P, extension: &str) -> Result<Vec<PathBuf>> {
    let extension = extension.trim_start_matches('.');
    let mut files = WalkDir::new(root.as_ref())
        .into_iter()
        .filter_map(|entry| -> Option<Result<PathBuf>> {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && has_extension(entry.path(), extension) {
                        Some(Ok(entry.into_path()))
                    } else {
                        None
                    }
                }
                Err(why) => Some(Err(why.into())),
            }
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Could not search directory {}", root.as_ref().display()))?;
    files.sort();
    Ok(files)
}

/// Options for `convert_folder`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub pcd: PCDWriteOptions,
}

/// Outcome of converting a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub point_count: usize,
}

/// Converts a single LAS/LAZ file into a PCD file
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    let cloud = LASReader::from_path(source.as_ref())?.read_all()?;
    let mut writer = PCDWriter::from_path(destination.as_ref(), options.pcd)?;
    writer.write(&cloud)?;
    writer.flush()?;
    Ok(ConversionReport {
        source: source.as_ref().to_path_buf(),
        destination: destination.as_ref().to_path_buf(),
        point_count: cloud.len(),
    })
}

/// Converts every `.las` and `.laz` file below `source_dir` into a `.pcd` file with the same file stem inside
/// `destination_dir`, which is created if it does not exist. Files are converted in parallel; the reports are in
/// the lexicographic order of the source files
///
/// # Errors
///
/// If two source files share a file stem, as their PCD files would overwrite each other. If any file fails to
/// convert. The error names the offending file
pub fn convert_folder<P: AsRef<Path>, Q: AsRef<Path>>(
    source_dir: P,
    destination_dir: Q,
    options: &ConvertOptions,
) -> Result<Vec<ConversionReport>> {
    let destination_dir = destination_dir.as_ref();
    fs::create_dir_all(destination_dir).with_context(|| {
        format!("Could not create output directory {}", destination_dir.display())
    })?;

    let sources = find_files_with_extension(source_dir.as_ref(), "laz")?
        .into_iter()
        .merge(find_files_with_extension(source_dir.as_ref(), "las")?)
        .collect::<Vec<_>>();
    info!(
        "Converting {} files from {} into {}",
        sources.len(),
        source_dir.as_ref().display(),
        destination_dir.display()
    );

    let jobs = sources
        .into_iter()
        .map(|source| {
            let stem = source
                .file_stem()
                .ok_or_else(|| anyhow!("File {} has no file name", source.display()))?;
            let mut file_name = stem.to_os_string();
            file_name.push(".pcd");
            let destination = destination_dir.join(file_name);
            Ok((source, destination))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut sources_by_destination = HashMap::with_capacity(jobs.len());
    for (source, destination) in &jobs {
        if let Some(other) = sources_by_destination.insert(destination, source) {
            bail!(
                "{} and {} would both be converted to {}",
                other.display(),
                source.display(),
                destination.display()
            );
        }
    }

    jobs.par_iter()
        .map(|(source, destination)| {
            let report = convert_file(source, destination, options)
                .with_context(|| format!("Failed to convert {}", source.display()))?;
            info!(
                "Converted {} ({} points)",
                report.source.display(),
                report.point_count
            );
            Ok(report)
        })
        .collect()
}

/// Copies every file below `source_dir` with the given extension whose file name does not contain `exclusion`
/// into `destination_dir` (created if it does not exist). The folder structure is flattened. Returns the paths of
/// the copied files inside `destination_dir`
pub fn copy_filtered<P: AsRef<Path>, Q: AsRef<Path>>(
    source_dir: P,
    destination_dir: Q,
    extension: &str,
    exclusion: &str,
) -> Result<Vec<PathBuf>> {
    let destination_dir = destination_dir.as_ref();
    fs::create_dir_all(destination_dir).with_context(|| {
        format!("Could not create output directory {}", destination_dir.display())
    })?;

    let mut copied = vec![];
    for source in find_files_with_extension(source_dir, extension)? {
        let file_name = match source.file_name() {
            Some(name) => name,
            None => continue,
        };
        if !exclusion.is_empty() && file_name.to_string_lossy().contains(exclusion) {
            info!("Skipping {}", source.display());
            continue;
        }
        let destination = destination_dir.join(file_name);
        fs::copy(&source, &destination).with_context(|| {
            format!(
                "Could not copy {} to {}",
                source.display(),
                destination.display()
            )
        })?;
        copied.push(destination);
    }
    info!("Copied {} files into {}", copied.len(), destination_dir.display());
    Ok(copied)
}
