use std::io::{BufRead, BufReader};

use anyhow::Result;
use common::{assert_same_positions, georeferenced_cloud, test_dir};
use lofty_io::{
    base::{read_point_cloud, write_point_cloud, GenericPointReader, PointReader, PointWriter},
    pcd::{PCDDataKind, PCDReader, PCDScalar, PCDWriteOptions, PCDWriter},
};
use pcd_rs::DataKind;
use scopeguard::defer;

mod common;

#[test]
fn test_default_pcd_is_binary_double_precision() -> Result<()> {
    let dir = test_dir("pcd_default");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    let expected = georeferenced_cloud(1_000, 21);
    let path = dir.join("cloud.pcd");
    write_point_cloud(&expected, &path)?;

    let header_lines = BufReader::new(std::fs::File::open(&path)?)
        .split(b'\n')
        .map(|line| -> Result<Vec<String>> {
            Ok(String::from_utf8_lossy(&line?)
                .split_whitespace()
                .map(str::to_owned)
                .collect())
        })
        .take_while(|line| !matches!(line, Ok(tokens) if tokens.first().map(String::as_str) == Some("DATA")))
        .collect::<Result<Vec<_>>>()?;
    let header_value = |key: &str| {
        header_lines
            .iter()
            .find(|tokens| tokens.first().map(String::as_str) == Some(key))
            .map(|tokens| tokens[1..].join(" "))
    };
    assert_eq!(header_value("FIELDS").as_deref(), Some("x y z"));
    assert_eq!(header_value("SIZE").as_deref(), Some("8 8 8"));
    assert_eq!(header_value("POINTS").as_deref(), Some("1000"));
    assert_eq!(PCDReader::from_path(&path)?.meta().data, DataKind::Binary);

    let actual = read_point_cloud(&path)?;
    assert_same_positions(&expected, &actual, 0.0);
    Ok(())
}

#[test]
fn test_ascii_single_precision() -> Result<()> {
    let dir = test_dir("pcd_ascii");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    let expected = georeferenced_cloud(200, 22);
    let path = dir.join("cloud.pcd");
    {
        let mut writer = PCDWriter::from_path(
            &path,
            PCDWriteOptions {
                data: PCDDataKind::Ascii,
                precision: PCDScalar::F32,
            },
        )?;
        writer.write(&expected)?;
        writer.flush()?;
    }
    let mut reader = GenericPointReader::open_file(&path)?;
    assert_eq!(reader.point_count(), Some(200));
    assert!(reader.header_bounds().is_none());
    let actual = reader.read_all()?;
    // f32 keeps roughly 7 significant digits, which is about half a meter at these coordinates
    assert_same_positions(&expected, &actual, 1.0);
    Ok(())
}
