use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use lofty_core::containers::PointCloud;
use pcd_rs::{DataKind, DynRecord, Field, FieldDef, Schema, ValueKind, WriterInit};

use crate::base::PointWriter;

/// Encoding of the point data following the PCD header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PCDDataKind {
    Ascii,
    Binary,
}

impl From<PCDDataKind> for DataKind {
    fn from(kind: PCDDataKind) -> Self {
        match kind {
            PCDDataKind::Ascii => DataKind::Ascii,
            PCDDataKind::Binary => DataKind::Binary,
        }
    }
}

/// Floating point type of the written `x`, `y` and `z` fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PCDScalar {
    F32,
    F64,
}

impl PCDScalar {
    fn value_kind(&self) -> ValueKind {
        match self {
            PCDScalar::F32 => ValueKind::F32,
            PCDScalar::F64 => ValueKind::F64,
        }
    }

    fn field(&self, value: f64) -> Field {
        match self {
            PCDScalar::F32 => Field::F32(vec![value as f32]),
            PCDScalar::F64 => Field::F64(vec![value]),
        }
    }
}

/// Options for writing PCD files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PCDWriteOptions {
    pub data: PCDDataKind,
    pub precision: PCDScalar,
}

impl Default for PCDWriteOptions {
    fn default() -> Self {
        Self {
            data: PCDDataKind::Binary,
            precision: PCDScalar::F64,
        }
    }
}

/// Writer for PCD files containing only `x`, `y` and `z`. As the PCD header stores the point count, all points
/// have to be passed to a single call of `write`
pub struct PCDWriter {
    path: PathBuf,
    options: PCDWriteOptions,
    has_written: bool,
}

impl PCDWriter {
    /// Creates a writer for the file at `path`. The file is created on the first call to `write` or `flush`
    pub fn from_path<P: AsRef<Path>>(path: P, options: PCDWriteOptions) -> Result<Self> {
        Ok(Self {
            path: path.as_ref().to_owned(),
            options,
            has_written: false,
        })
    }

    pub fn options(&self) -> &PCDWriteOptions {
        &self.options
    }

    fn schema(&self) -> Schema {
        let kind = self.options.precision.value_kind();
        Schema {
            fields: ["x", "y", "z"]
                .iter()
                .map(|name| FieldDef {
                    name: name.to_string(),
                    kind,
                    count: 1,
                })
                .collect(),
        }
    }

    fn write_file(&self, cloud: &PointCloud) -> Result<()> {
        let mut writer = WriterInit {
            width: cloud.len() as u64,
            height: 1,
            viewpoint: Default::default(),
            data_kind: self.options.data.into(),
            schema: Some(self.schema()),
        }
        .create(&self.path)
        .with_context(|| format!("Could not create PCD file {}", self.path.display()))?;

        let precision = self.options.precision;
        for position in cloud {
            let record = DynRecord(position.iter().map(|c| precision.field(*c)).collect());
            writer.push(&record)?;
        }
        writer
            .finish()
            .with_context(|| format!("Could not write PCD file {}", self.path.display()))?;
        Ok(())
    }
}

impl PointWriter for PCDWriter {
    fn write(&mut self, cloud: &PointCloud) -> Result<()> {
        if self.has_written {
            bail!("PCDWriter can only write a single point cloud");
        }
        self.has_written = true;
        self.write_file(cloud)
    }

    fn flush(&mut self) -> Result<()> {
        if !self.has_written {
            self.has_written = true;
            self.write_file(&PointCloud::new())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        base::PointReader,
        pcd::{test_file_path, PCDReader},
    };
    use lofty_core::nalgebra::Vector3;
    use scopeguard::defer;

    fn sample_cloud() -> PointCloud {
        PointCloud::from_positions(vec![
            Vector3::new(0.5, -1.25, 3.0),
            Vector3::new(1234.125, 0.0, -7.75),
            Vector3::new(1.0 / 3.0, 2.0, 1e-3),
        ])
    }

    fn write_and_read(name: &str, cloud: &PointCloud, options: PCDWriteOptions) -> Result<PointCloud> {
        let path = test_file_path(name);
        defer! {
            std::fs::remove_file(&path).expect("Could not remove test file");
        }
        let mut writer = PCDWriter::from_path(&path, options)?;
        writer.write(cloud)?;
        writer.flush()?;
        PCDReader::from_path(&path)?.read_all()
    }

    #[test]
    fn test_write_read_binary() -> Result<()> {
        let cloud = sample_cloud();
        let read = write_and_read("binary", &cloud, PCDWriteOptions::default())?;
        assert_eq!(read, cloud);
        Ok(())
    }

    #[test]
    fn test_write_read_ascii() -> Result<()> {
        let cloud = sample_cloud();
        let options = PCDWriteOptions {
            data: PCDDataKind::Ascii,
            precision: PCDScalar::F64,
        };
        let read = write_and_read("ascii", &cloud, options)?;
        assert_eq!(read.len(), cloud.len());
        for (expected, actual) in cloud.iter().zip(read.iter()) {
            assert!((expected - actual).norm() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_single_precision_fields() -> Result<()> {
        let path = test_file_path("single_precision");
        defer! {
            std::fs::remove_file(&path).expect("Could not remove test file");
        }
        let cloud = sample_cloud();
        let options = PCDWriteOptions {
            data: PCDDataKind::Ascii,
            precision: PCDScalar::F32,
        };
        PCDWriter::from_path(&path, options)?.write(&cloud)?;

        let mut reader = PCDReader::from_path(&path)?;
        assert!(reader
            .meta()
            .field_defs
            .fields
            .iter()
            .all(|field| field.kind == ValueKind::F32));
        assert_eq!(reader.meta().width, 3);

        let read = reader.read_all()?;
        for (expected, actual) in cloud.iter().zip(read.iter()) {
            assert!((expected - actual).norm() < 1e-3);
        }
        Ok(())
    }

    #[test]
    fn test_second_write_fails() -> Result<()> {
        let path = test_file_path("second_write");
        defer! {
            std::fs::remove_file(&path).expect("Could not remove test file");
        }
        let mut writer = PCDWriter::from_path(&path, PCDWriteOptions::default())?;
        writer.write(&sample_cloud())?;
        assert!(writer.write(&sample_cloud()).is_err());
        Ok(())
    }

    #[test]
    fn test_flush_without_points_writes_empty_file() -> Result<()> {
        let read = write_and_read("empty", &PointCloud::new(), PCDWriteOptions::default())?;
        assert!(read.is_empty());
        Ok(())
    }
}
