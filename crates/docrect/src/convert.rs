//! Adapters between `image` buffers and the engine raster types.

use docrect_core::{RgbaRaster, RgbaRasterView};
use docrect_session::{DisplayBounds, EditSession};

/// Borrow an `image::RgbaImage` as an engine raster view.
pub fn raster_view(img: &image::RgbaImage) -> RgbaRasterView<'_> {
    RgbaRasterView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Copy a decoded image into an owned engine raster.
pub fn raster_from_image(img: &image::DynamicImage) -> RgbaRaster {
    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    RgbaRaster {
        width,
        height,
        data: rgba.into_raw(),
    }
}

/// Copy an engine raster into an `image::RgbaImage`. `None` only if the
/// raster dimensions are inconsistent with its buffer, which the engine
/// types never produce.
pub fn image_from_raster(raster: &RgbaRaster) -> Option<image::RgbaImage> {
    image::RgbaImage::from_raw(
        raster.width as u32,
        raster.height as u32,
        raster.data.clone(),
    )
}

/// Decode-to-session convenience: wraps the image and starts editing.
pub fn begin_session(img: &image::DynamicImage, bounds: DisplayBounds) -> EditSession {
    EditSession::begin(raster_from_image(img), bounds)
}
