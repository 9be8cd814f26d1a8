use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use las::{point::Format, Builder, Transform, Write, Writer};
use lofty_core::containers::PointCloud;

use crate::base::PointWriter;

/// Default resolution of written coordinates: 1 mm
pub const DEFAULT_LAS_SCALE: f64 = 0.001;

/// Writer for LAS and LAZ files using point format 0. Files ending in `.laz` are compressed.
///
/// LAS stores coordinates as scaled integers relative to an offset. The offset is taken from the minimum of the
/// first cloud passed to [write](PointWriter::write), so the header is created lazily.
pub struct LASWriter {
    path: PathBuf,
    scale: f64,
    writer: Option<Writer<BufWriter<File>>>,
}

impl LASWriter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_path_and_scale(path, DEFAULT_LAS_SCALE)
    }

    pub fn from_path_and_scale<P: AsRef<Path>>(path: P, scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(anyhow!("LAS coordinate scale must be positive, but was {}", scale));
        }
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            scale,
            writer: None,
        })
    }

    fn is_compressed(&self) -> bool {
        self.path
            .extension()
            .and_then(|ex| ex.to_str())
            .map(|ex| ex.eq_ignore_ascii_case("laz"))
            .unwrap_or(false)
    }

    fn create_writer(&self, cloud: &PointCloud) -> Result<Writer<BufWriter<File>>> {
        let offset = cloud
            .bounds()
            .map(|bounds| *bounds.min())
            .unwrap_or_else(lofty_core::nalgebra::Point3::origin);
        let transform = |offset: f64| Transform {
            scale: self.scale,
            offset: offset.floor(),
        };

        let mut builder = Builder::from((1, 2));
        builder.point_format = Format::new(0)?;
        builder.point_format.is_compressed = self.is_compressed();
        builder.transforms = las::Vector {
            x: transform(offset.x),
            y: transform(offset.y),
            z: transform(offset.z),
        };
        let header = builder.into_header()?;
        let writer = BufWriter::new(
            File::create(&self.path)
                .with_context(|| format!("Could not create file {}", self.path.display()))?,
        );
        Ok(Writer::new(writer, header)?)
    }
}

impl PointWriter for LASWriter {
    fn write(&mut self, cloud: &PointCloud) -> Result<()> {
        if self.writer.is_none() {
            self.writer = Some(self.create_writer(cloud)?);
        }
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| anyhow!("LAS writer was not initialized"))?;
        for position in cloud.iter() {
            writer.write(las::Point {
                x: position.x,
                y: position.y,
                z: position.z,
                ..Default::default()
            })?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.writer.is_none() {
            // an empty file still needs a valid header
            self.writer = Some(self.create_writer(&PointCloud::new())?);
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.close()?;
        }
        Ok(())
    }
}
