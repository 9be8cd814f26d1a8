use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use las::{Header, Read, Reader};
use lofty_core::{
    containers::PointCloud,
    math::AABB,
    nalgebra::{Point3, Vector3},
};

use crate::base::PointReader;

/// Reader for LAS and LAZ files. Only the point positions are read, with scale and offset of the file applied
pub struct LASReader {
    path: PathBuf,
    header: Header,
}

impl LASReader {
    /// Creates a new `LASReader` for the file at the given `path`. Only the header is read here.
    ///
    /// # Errors
    ///
    /// If `path` does not exist, cannot be opened or does not point to a valid LAS/LAZ file, an error is returned.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::from_path(path.as_ref())
            .with_context(|| format!("Could not open LAS file {}", path.as_ref().display()))?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            header: reader.header().clone(),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
}

impl PointReader for LASReader {
    fn read_all(&mut self) -> Result<PointCloud> {
        let mut reader = Reader::from_path(&self.path)
            .with_context(|| format!("Could not open LAS file {}", self.path.display()))?;
        let mut cloud = PointCloud::with_capacity(self.header.number_of_points() as usize);
        for point in reader.points() {
            let point = point?;
            cloud.push(Vector3::new(point.x, point.y, point.z));
        }
        Ok(cloud)
    }

    fn point_count(&self) -> Option<usize> {
        Some(self.header.number_of_points() as usize)
    }

    fn header_bounds(&self) -> Option<AABB<f64>> {
        let bounds = self.header.bounds();
        Some(AABB::from_min_max_unchecked(
            Point3::new(bounds.min.x, bounds.min.y, bounds.min.z),
            Point3::new(bounds.max.x, bounds.max.y, bounds.max.z),
        ))
    }
}
