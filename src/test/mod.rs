//! Test fixtures: crafted images and a recording attribute runtime.
//!
//! Images are assembled in memory with [`crate::metadata::builder::ImageBuilder`], so tests
//! do not depend on sample binaries.

pub mod factories;
