use std::path::Path;

use anyhow::{anyhow, bail, Result};
use lofty_core::{containers::PointCloud, math::AABB};

use crate::{
    las::{LASReader, LASWriter},
    pcd::{PCDReader, PCDWriteOptions, PCDWriter},
};

use super::{PointReader, PointWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SupportedFileExtensions {
    Las,
    Pcd,
}

/// Returns a lookup value for the file extension of the given file path
fn get_extension_lookup(path: &Path) -> Result<Option<SupportedFileExtensions>> {
    let extension = match path.extension() {
        Some(ex) => ex,
        None => return Ok(None),
    };
    let extension_str = extension.to_str().ok_or_else(|| {
        anyhow!(
            "File extension of path {} is no valid Unicode string",
            path.display()
        )
    })?;
    match extension_str.to_lowercase().as_str() {
        "las" | "laz" => Ok(Some(SupportedFileExtensions::Las)),
        "pcd" => Ok(Some(SupportedFileExtensions::Pcd)),
        _ => Ok(None),
    }
}

/// `PointReader` that dispatches to the reader matching the file extension
pub enum GenericPointReader {
    LAS(LASReader),
    PCD(PCDReader),
}

impl GenericPointReader {
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match get_extension_lookup(path.as_ref())? {
            Some(SupportedFileExtensions::Las) => Ok(Self::LAS(LASReader::from_path(path)?)),
            Some(SupportedFileExtensions::Pcd) => Ok(Self::PCD(PCDReader::from_path(path)?)),
            None => bail!(
                "Unsupported file format of file {}",
                path.as_ref().display()
            ),
        }
    }

    /// Checks whether the given `path` is a point cloud file that can be read using a `GenericPointReader`. `Err` is
    /// returned only if the file extension of `path` can't be inspected
    pub fn is_supported_file<P: AsRef<Path>>(path: P) -> Result<bool> {
        Ok(get_extension_lookup(path.as_ref())?.is_some())
    }
}

impl PointReader for GenericPointReader {
    fn read_all(&mut self) -> Result<PointCloud> {
        match self {
            GenericPointReader::LAS(reader) => reader.read_all(),
            GenericPointReader::PCD(reader) => reader.read_all(),
        }
    }

    fn point_count(&self) -> Option<usize> {
        match self {
            GenericPointReader::LAS(reader) => reader.point_count(),
            GenericPointReader::PCD(reader) => reader.point_count(),
        }
    }

    fn header_bounds(&self) -> Option<AABB<f64>> {
        match self {
            GenericPointReader::LAS(reader) => reader.header_bounds(),
            GenericPointReader::PCD(reader) => reader.header_bounds(),
        }
    }
}

/// `PointWriter` that dispatches to the writer matching the file extension
pub enum GenericPointWriter {
    LAS(LASWriter),
    PCD(PCDWriter),
}

impl GenericPointWriter {
    pub fn create_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match get_extension_lookup(path.as_ref())? {
            Some(SupportedFileExtensions::Las) => Ok(Self::LAS(LASWriter::from_path(path)?)),
            Some(SupportedFileExtensions::Pcd) => Ok(Self::PCD(PCDWriter::from_path(
                path,
                PCDWriteOptions::default(),
            )?)),
            None => bail!(
                "Unsupported file format of file {}",
                path.as_ref().display()
            ),
        }
    }
}

impl PointWriter for GenericPointWriter {
    fn write(&mut self, cloud: &PointCloud) -> Result<()> {
        match self {
            GenericPointWriter::LAS(writer) => writer.write(cloud),
            GenericPointWriter::PCD(writer) => writer.write(cloud),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            GenericPointWriter::LAS(writer) => writer.flush(),
            GenericPointWriter::PCD(writer) => writer.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lookup() {
        assert_eq!(
            get_extension_lookup(Path::new("a/b/tile.LAZ")).unwrap(),
            Some(SupportedFileExtensions::Las)
        );
        assert_eq!(
            get_extension_lookup(Path::new("cloud.pcd")).unwrap(),
            Some(SupportedFileExtensions::Pcd)
        );
        assert_eq!(get_extension_lookup(Path::new("cloud.ply")).unwrap(), None);
        assert_eq!(get_extension_lookup(Path::new("README")).unwrap(), None);
        assert!(GenericPointReader::open_file("cloud.ply").is_err());
    }
}
