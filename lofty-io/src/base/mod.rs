use std::path::Path;

use anyhow::{Context, Result};
use lofty_core::containers::PointCloud;

mod reader;
pub use self::reader::*;

mod writer;
pub use self::writer::*;

mod io_factory;
pub use self::io_factory::*;

/// Reads all points of the point cloud file at `path`. The file format is determined from the file extension of
/// `path`
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud> {
    let mut reader = GenericPointReader::open_file(path.as_ref()).context(format!(
        "Could not create appropriate reader for point cloud file {}",
        path.as_ref().display()
    ))?;
    reader.read_all().context(format!(
        "Failed to read points from point cloud file {}",
        path.as_ref().display()
    ))
}

/// Writes all points in `cloud` into the file at `path`, using the default options of the format that matches the
/// file extension of `path`
pub fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud, path: P) -> Result<()> {
    let mut writer = GenericPointWriter::create_file(path.as_ref()).context(format!(
        "Could not create appropriate writer for point cloud file {}",
        path.as_ref().display()
    ))?;
    writer.write(cloud).context("Failed to write points")?;
    writer.flush()
}
