//! Crafted images and attribute fixtures.

pub mod customattributes;
pub mod images;
