//! Point Cloud Data (PCD) files, as written by PCL and Open3D, through the [pcd-rs](https://crates.io/crates/pcd-rs)
//! crate
//!
//! Only the `x`, `y` and `z` fields are read; other fields are skipped. Files are written with `x`, `y` and `z`
//! fields only.

mod pcd_reader;
pub use self::pcd_reader::*;

mod pcd_writer;
pub use self::pcd_writer::*;

#[cfg(test)]
pub(crate) fn test_file_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("lofty_pcd_{}_{}.pcd", name, std::process::id()))
}
