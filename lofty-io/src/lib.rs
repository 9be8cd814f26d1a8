#![warn(clippy::all)]
//! Reading and writing of point cloud files for LOFTY
//!
//! Supports LAS and LAZ through the [las](https://crates.io/crates/las) crate and PCD files through the
//! [pcd-rs](https://crates.io/crates/pcd-rs) crate. The [base] module picks the right format from a file extension,
//! and [batch] converts or copies whole folders of files.

pub mod base;
pub mod batch;
pub mod las;
pub mod pcd;
