//! High-level facade crate for the `docrect-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the engine crates
//! - (feature-gated) adapters between `image` buffers and the engine's
//!   raster types, plus a CLI that drives a whole session end to end.
//!
//! ## Quickstart
//!
//! ```no_run
//! use docrect::{DisplayBounds, OutputSpec};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("photo.jpg")?.decode()?;
//! let session = docrect::convert::begin_session(&img, DisplayBounds::default());
//!
//! // corner edits arrive as controller events; here we accept the
//! // default inset quad and rectify straight away
//! let out = session.commit(&OutputSpec::default())?;
//! println!("rectified {}x{}", out.raster.width, out.raster.height);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `docrect::core`: geometry (quad model, homography estimation,
//!   perspective resampling, rotation).
//! - `docrect::session`: the interactive `EditSession`, controller state
//!   machine, magnified preview, background commit.
//! - `docrect::convert` (feature `image`): adapters from/to `image`
//!   buffers.

pub use docrect_core as core;
pub use docrect_session as session;

pub use docrect_core::{Corner, GeometryError, Homography, Quad, RgbaRaster, RgbaRasterView};
pub use docrect_session::{
    Direction, DisplayBounds, EditSession, EditState, NudgeStep, OutputSpec, PendingCommit,
    PointerKind, RectifiedImage,
};

#[cfg(feature = "image")]
pub mod convert;
