use std::path::Path;

use anyhow::Result;
use common::{assert_same_positions, georeferenced_cloud, test_dir};
use lofty_io::{
    base::{read_point_cloud, write_point_cloud},
    batch::{convert_folder, copy_filtered, find_files_with_extension, ConvertOptions},
};
use scopeguard::defer;

mod common;

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"not a point cloud").unwrap();
}

#[test]
fn test_find_files_is_recursive_and_sorted() -> Result<()> {
    let dir = test_dir("batch_find");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    touch(&dir.join("b/site_2.laz"));
    touch(&dir.join("a/nested/site_1.LAZ"));
    touch(&dir.join("a/site_3.las"));
    touch(&dir.join("readme.txt"));

    let found = find_files_with_extension(&dir, ".laz")?;
    assert_eq!(
        found,
        vec![dir.join("a/nested/site_1.LAZ"), dir.join("b/site_2.laz")]
    );
    assert!(find_files_with_extension(&dir, "pcd")?.is_empty());
    Ok(())
}

#[test]
fn test_convert_folder() -> Result<()> {
    let dir = test_dir("batch_convert");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    let source = dir.join("laz");
    let destination = dir.join("pcd").join("out");
    std::fs::create_dir_all(source.join("plot_b"))?;
    let first = georeferenced_cloud(300, 31);
    let second = georeferenced_cloud(500, 32);
    write_point_cloud(&first, source.join("plot_a.2021.laz"))?;
    write_point_cloud(&second, source.join("plot_b").join("uav.las"))?;

    let reports = convert_folder(&source, &destination, &ConvertOptions::default())?;
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].destination, destination.join("plot_a.2021.pcd"));
    assert_eq!(reports[0].point_count, 300);
    assert_eq!(reports[1].destination, destination.join("uav.pcd"));
    assert_eq!(reports[1].point_count, 500);

    let converted = read_point_cloud(destination.join("uav.pcd"))?;
    assert_same_positions(&second, &converted, 0.0005 + 1e-9);
    Ok(())
}

#[test]
fn test_convert_folder_names_broken_file() -> Result<()> {
    let dir = test_dir("batch_convert_broken");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    touch(&dir.join("in/broken.laz"));
    let error = convert_folder(dir.join("in"), dir.join("out"), &ConvertOptions::default())
        .expect_err("Converting a broken file must fail");
    assert!(format!("{:#}", error).contains("broken.laz"));
    Ok(())
}

#[test]
fn test_convert_folder_rejects_colliding_file_stems() -> Result<()> {
    let dir = test_dir("batch_convert_collision");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    touch(&dir.join("in/a/tile.laz"));
    touch(&dir.join("in/b/tile.laz"));
    let error = convert_folder(dir.join("in"), dir.join("out"), &ConvertOptions::default())
        .expect_err("Two sources for one PCD file must fail");
    let message = format!("{:#}", error);
    assert!(message.contains(&dir.join("in/a/tile.laz").display().to_string()));
    assert!(message.contains(&dir.join("in/b/tile.laz").display().to_string()));
    assert!(!dir.join("out/tile.pcd").exists());
    Ok(())
}

#[test]
fn test_copy_filtered_skips_excluded_names() -> Result<()> {
    let dir = test_dir("batch_copy");
    defer! {
        std::fs::remove_dir_all(&dir).expect("Could not remove test directory");
    }
    touch(&dir.join("in/2021/uls_plot1.laz"));
    touch(&dir.join("in/2022/TLS_plot1.laz"));
    touch(&dir.join("in/2022/deep/uls_plot2.laz"));
    touch(&dir.join("in/2022/uls_plot2.las"));

    let copied = copy_filtered(dir.join("in"), dir.join("out"), "laz", "TLS")?;
    assert_eq!(
        copied,
        vec![
            dir.join("out").join("uls_plot1.laz"),
            dir.join("out").join("uls_plot2.laz")
        ]
    );
    assert!(!dir.join("out").join("TLS_plot1.laz").exists());
    Ok(())
}
