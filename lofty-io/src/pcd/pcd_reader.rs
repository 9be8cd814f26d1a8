use std::{convert::TryFrom, fs::File, io::BufReader, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use lofty_core::{containers::PointCloud, math::AABB, nalgebra::Vector3};
use pcd_rs::{DynReader, DynRecord, Field, PcdMeta, ValueKind};

use crate::base::PointReader;

/// Upper bound for the number of points reserved up front, as the `POINTS` value of a header can't be trusted
const MAX_PREALLOCATED_POINTS: usize = 1 << 24;

/// Reader for PCD files. Points with non-finite coordinates are skipped
pub struct PCDReader {
    reader: DynReader<BufReader<File>>,
    points: usize,
    /// Indices of the `x`, `y` and `z` fields within a record
    xyz_fields: [usize; 3],
    consumed: bool,
}

fn locate_coordinate(meta: &PcdMeta, name: &str) -> Result<usize> {
    let (index, field) = meta
        .field_defs
        .fields
        .iter()
        .enumerate()
        .find(|(_, field)| field.name == name)
        .ok_or_else(|| anyhow!("PCD file has no '{}' field", name))?;
    match field.kind {
        ValueKind::F32 | ValueKind::F64 if field.count == 1 => Ok(index),
        _ => bail!(
            "PCD field '{}' must be a single 4 or 8 byte float, but is {:?} x {}",
            name,
            field.kind,
            field.count
        ),
    }
}

fn coordinate(record: &DynRecord, index: usize) -> Option<f64> {
    match record.0.get(index)? {
        Field::F32(values) => values.first().map(|value| *value as f64),
        Field::F64(values) => values.first().copied(),
        _ => None,
    }
}

impl PCDReader {
    /// Opens the PCD file at `path` and reads its header
    ///
    /// # Errors
    ///
    /// If the file can't be opened, if the header is malformed, or if it has no floating point `x`, `y` and `z`
    /// fields
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = DynReader::open(path.as_ref())
            .with_context(|| format!("Could not open PCD file {}", path.as_ref().display()))?;
        let meta = reader.meta();
        let xyz_fields = [
            locate_coordinate(meta, "x")?,
            locate_coordinate(meta, "y")?,
            locate_coordinate(meta, "z")?,
        ];
        let points = usize::try_from(meta.num_points)
            .with_context(|| format!("PCD header declares too many points ({})", meta.num_points))?;
        Ok(Self {
            reader,
            points,
            xyz_fields,
            consumed: false,
        })
    }

    pub fn meta(&self) -> &PcdMeta {
        self.reader.meta()
    }
}

impl PointReader for PCDReader {
    fn read_all(&mut self) -> Result<PointCloud> {
        if self.consumed {
            bail!("All points of this PCD file have already been read");
        }
        self.consumed = true;

        let mut cloud = PointCloud::with_capacity(self.points.min(MAX_PREALLOCATED_POINTS));
        let mut records = 0;
        for record in &mut self.reader {
            let record = record.with_context(|| format!("Invalid PCD point {}", records))?;
            let [x, y, z] = self.xyz_fields;
            let position = match (
                coordinate(&record, x),
                coordinate(&record, y),
                coordinate(&record, z),
            ) {
                (Some(x), Some(y), Some(z)) => Vector3::new(x, y, z),
                _ => bail!("PCD point {} has no valid coordinates", records),
            };
            if position.iter().all(|c| c.is_finite()) {
                cloud.push(position);
            }
            records += 1;
        }
        if records != self.points {
            bail!(
                "PCD file ended after {} of {} points",
                records,
                self.points
            );
        }

        let skipped = records - cloud.len();
        if skipped > 0 {
            log::debug!("Skipped {} PCD points with non-finite coordinates", skipped);
        }
        Ok(cloud)
    }

    fn point_count(&self) -> Option<usize> {
        Some(self.points)
    }

    fn header_bounds(&self) -> Option<AABB<f64>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcd::test_file_path;
    use scopeguard::defer;

    fn read_text(name: &str, content: &str) -> Result<PointCloud> {
        let path = test_file_path(name);
        defer! {
            std::fs::remove_file(&path).expect("Could not remove test file");
        }
        std::fs::write(&path, content)?;
        let mut reader = PCDReader::from_path(&path)?;
        reader.read_all()
    }

    #[test]
    fn test_read_ascii_with_extra_fields() -> Result<()> {
        let cloud = read_text(
            "extra_fields",
            "# .PCD v0.7 - Point Cloud Data file format
VERSION 0.7
FIELDS rgb x y z normal
SIZE 4 4 4 8 4
TYPE U F F F F
COUNT 1 1 1 1 3
WIDTH 3
HEIGHT 1
VIEWPOINT 0 0 0 1 0 0 0
POINTS 3
DATA ascii
255 1.5 2.5 3.5 0 0 1
7 -1 -2 -3 0 1 0
9 nan 0 0 1 0 0
",
        )?;
        assert_eq!(
            cloud.positions(),
            &[Vector3::new(1.5, 2.5, 3.5), Vector3::new(-1.0, -2.0, -3.0)]
        );
        Ok(())
    }

    #[test]
    fn test_read_twice_fails() -> Result<()> {
        let path = test_file_path("read_twice");
        defer! {
            std::fs::remove_file(&path).expect("Could not remove test file");
        }
        std::fs::write(
            &path,
            "VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nWIDTH 1\nHEIGHT 1\nVIEWPOINT 0 0 0 1 0 0 0\nPOINTS 1\nDATA ascii\n1 2 3\n",
        )?;
        let mut reader = PCDReader::from_path(&path)?;
        assert_eq!(reader.point_count(), Some(1));
        assert_eq!(reader.read_all()?.len(), 1);
        assert!(reader.read_all().is_err());
        Ok(())
    }

    #[test]
    fn test_truncated_data_fails() {
        let result = read_text(
            "truncated",
            "VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nWIDTH 2\nHEIGHT 1\nVIEWPOINT 0 0 0 1 0 0 0\nPOINTS 2\nDATA ascii\n1 2 3\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_huge_point_count_fails_without_allocating() {
        let result = read_text(
            "huge_count",
            "VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nWIDTH 2305843009213693951\nHEIGHT 1\nVIEWPOINT 0 0 0 1 0 0 0\nPOINTS 2305843009213693951\nDATA ascii\n1 2 3\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unsupported_layouts_fail() {
        let integer_positions = read_text(
            "integer_positions",
            "VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE I I I\nCOUNT 1 1 1\nWIDTH 1\nHEIGHT 1\nVIEWPOINT 0 0 0 1 0 0 0\nPOINTS 1\nDATA ascii\n1 2 3\n",
        );
        assert!(integer_positions.is_err());
        let no_z = read_text(
            "no_z",
            "VERSION 0.7\nFIELDS x y\nSIZE 4 4\nTYPE F F\nCOUNT 1 1\nWIDTH 1\nHEIGHT 1\nVIEWPOINT 0 0 0 1 0 0 0\nPOINTS 1\nDATA ascii\n1 2\n",
        );
        assert!(no_z.is_err());
    }
}
