//! Core types and algorithms for perspective document rectification.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! perform file I/O and does not depend on a concrete image codec; rasters
//! are plain row-major RGBA byte buffers that callers decode elsewhere.

mod homography;
mod logger;
mod quad;
mod raster;
mod rotate;
mod warp;

pub use homography::{homography_from_quad, GeometryError, Homography};
pub use quad::{clamp_to_canvas, Corner, Quad};
pub use raster::{RgbaRaster, RgbaRasterView};
pub use rotate::rotate90_cw;
pub use warp::warp_perspective_rgba;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
