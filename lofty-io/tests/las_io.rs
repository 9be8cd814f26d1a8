use anyhow::Result;
use assert_approx_eq::assert_approx_eq;
use common::{assert_same_positions, georeferenced_cloud, test_dir};
use lofty_io::{
    base::{read_point_cloud, write_point_cloud, GenericPointReader, PointReader, PointWriter},
    las::{LASReader, LASWriter},
};
use scopeguard::defer;

mod common;

#[test]
fn test_las_roundtrip_keeps_millimeters() -> Result<()> {
    let dir = test_dir("las_roundtrip");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    let expected = georeferenced_cloud(2_000, 11);
    let path = dir.join("tile.las");
    write_point_cloud(&expected, &path)?;

    let mut reader = LASReader::from_path(&path)?;
    assert_eq!(reader.point_count(), Some(expected.len()));
    let header_bounds = reader.header_bounds().expect("LAS header has bounds");
    let actual = reader.read_all()?;
    assert_same_positions(&expected, &actual, 0.0005 + 1e-9);

    let bounds = expected.bounds().unwrap();
    for axis in 0..3 {
        assert_approx_eq!(header_bounds.min()[axis], bounds.min()[axis], 0.001);
        assert_approx_eq!(header_bounds.max()[axis], bounds.max()[axis], 0.001);
    }
    Ok(())
}

#[test]
fn test_laz_roundtrip() -> Result<()> {
    let dir = test_dir("laz_roundtrip");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    let expected = georeferenced_cloud(5_000, 12);
    let las_path = dir.join("tile.las");
    let laz_path = dir.join("tile.LAZ");
    write_point_cloud(&expected, &las_path)?;
    write_point_cloud(&expected, &laz_path)?;

    let actual = read_point_cloud(&laz_path)?;
    assert_same_positions(&expected, &actual, 0.0005 + 1e-9);
    assert!(std::fs::metadata(&laz_path)?.len() < std::fs::metadata(&las_path)?.len());
    Ok(())
}

#[test]
fn test_custom_scale() -> Result<()> {
    let dir = test_dir("las_scale");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    let expected = georeferenced_cloud(100, 13);
    let path = dir.join("coarse.las");
    {
        let mut writer = LASWriter::from_path_and_scale(&path, 0.1)?;
        writer.write(&expected)?;
        writer.flush()?;
    }
    let actual = read_point_cloud(&path)?;
    assert_same_positions(&expected, &actual, 0.05 + 1e-9);
    assert!(LASWriter::from_path_and_scale(&path, 0.0).is_err());
    Ok(())
}

#[test]
fn test_empty_las_file() -> Result<()> {
    let dir = test_dir("las_empty");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    let path = dir.join("empty.las");
    {
        let mut writer = LASWriter::from_path(&path)?;
        writer.flush()?;
    }
    let mut reader = GenericPointReader::open_file(&path)?;
    assert_eq!(reader.point_count(), Some(0));
    assert!(reader.read_all()?.is_empty());
    Ok(())
}

#[test]
fn test_missing_and_unsupported_files() {
    assert!(read_point_cloud("/definitely/not/existing.laz").is_err());
    assert!(GenericPointReader::open_file("points.xyz").is_err());
    assert!(!GenericPointReader::is_supported_file("points.xyz").unwrap());
    assert!(GenericPointReader::is_supported_file("POINTS.LaZ").unwrap());
}
