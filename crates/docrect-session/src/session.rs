use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use docrect_core::{
    homography_from_quad, rotate90_cw, warp_perspective_rgba, Corner, GeometryError, Homography,
    Quad, RgbaRaster, RgbaRasterView,
};

use crate::controller::EditState;
use crate::magnifier::{self, MagnifierSettings, MagnifierView};
use crate::pending::PendingCommit;

/// Display area the canvas has to fit into, in display pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayBounds {
    pub max_width: f32,
    pub max_height: f32,
}

impl Default for DisplayBounds {
    fn default() -> Self {
        Self {
            max_width: 1280.0,
            max_height: 720.0,
        }
    }
}

/// Output raster parameters. The defaults target a 300 dpi print of a
/// standard ID card; tests shrink them freely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub width: usize,
    pub height: usize,
    /// Quality hint for a lossy encoder downstream; the engine itself
    /// never encodes.
    pub jpeg_quality: u8,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            width: 1011,
            height: 638,
            jpeg_quality: 90,
        }
    }
}

/// Product of a commit: the rectified pixels, the homography that was
/// applied (output -> source), and the encoder hint carried over from the
/// [`OutputSpec`].
#[derive(Clone, Debug)]
pub struct RectifiedImage {
    pub raster: RgbaRaster,
    pub homography: Homography,
    pub jpeg_quality: u8,
}

/// One editing session over one decoded source raster.
///
/// All coordinates exposed by the session are display-canvas coordinates;
/// they are divided by the scale factor only at commit (and inside the
/// magnifier), so UI layers never deal with source space directly.
pub struct EditSession {
    pub(crate) source: Arc<RgbaRaster>,
    pub(crate) scale_factor: f32,
    pub(crate) canvas_width: f32,
    pub(crate) canvas_height: f32,
    pub(crate) quad: Quad,
    pub(crate) state: EditState,
    pub(crate) magnifier: MagnifierSettings,
    bounds: DisplayBounds,
}

/// Largest scale <= 1 that fits `w x h` inside the bounds, preserving
/// aspect ratio, and the resulting canvas dimensions.
fn fit_canvas(w: usize, h: usize, bounds: DisplayBounds) -> (f32, f32, f32) {
    let scale = (bounds.max_width / w as f32)
        .min(bounds.max_height / h as f32)
        .min(1.0);
    (scale, w as f32 * scale, h as f32 * scale)
}

fn output_rect(w: usize, h: usize) -> [Point2<f32>; 4] {
    let (w, h) = (w as f32, h as f32);
    [
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(w, h),
        Point2::new(0.0, h),
    ]
}

/// Shared by the synchronous and background commit paths.
fn rectify(
    source: &RgbaRaster,
    source_quad: &[Point2<f32>; 4],
    spec: OutputSpec,
) -> Result<RectifiedImage, GeometryError> {
    let started = Instant::now();
    // Solve for output-rectangle -> source directly instead of inverting a
    // forward map.
    let h = homography_from_quad(&output_rect(spec.width, spec.height), source_quad)?;
    let raster = warp_perspective_rgba(&source.view(), &h, spec.width, spec.height);
    debug!(
        "resampled {}x{} in {:.1} ms",
        spec.width,
        spec.height,
        started.elapsed().as_secs_f64() * 1e3
    );
    Ok(RectifiedImage {
        raster,
        homography: h,
        jpeg_quality: spec.jpeg_quality,
    })
}

impl EditSession {
    /// Start editing a decoded source raster: derive the display scale and
    /// place the default inset quadrilateral.
    pub fn begin(source: RgbaRaster, bounds: DisplayBounds) -> Self {
        let (scale_factor, canvas_width, canvas_height) =
            fit_canvas(source.width, source.height, bounds);
        info!(
            "session: source {}x{}, canvas {:.0}x{:.0}, scale {:.3}",
            source.width, source.height, canvas_width, canvas_height, scale_factor
        );
        Self {
            source: Arc::new(source),
            scale_factor,
            canvas_width,
            canvas_height,
            quad: Quad::inset(canvas_width, canvas_height),
            state: EditState::Idle,
            magnifier: MagnifierSettings::default(),
            bounds,
        }
    }

    pub fn source_view(&self) -> RgbaRasterView<'_> {
        self.source.view()
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn canvas_width(&self) -> f32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f32 {
        self.canvas_height
    }

    pub fn quad(&self) -> &Quad {
        &self.quad
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn magnifier_settings(&self) -> &MagnifierSettings {
        &self.magnifier
    }

    /// The edited corners mapped into source-raster coordinates.
    pub fn source_quad(&self) -> [Point2<f32>; 4] {
        self.quad.scaled(1.0 / self.scale_factor).points()
    }

    /// Corner the magnifier focuses on: the active one, or top-left before
    /// any selection (the initial preview the UI shows on load).
    pub(crate) fn focus_corner(&self) -> Corner {
        match self.state {
            EditState::Selected(c) | EditState::Dragging(c) => c,
            EditState::Idle => Corner::TopLeft,
        }
    }

    /// Render the magnified preview at the current focus corner.
    pub fn magnifier_view(&self) -> MagnifierView {
        let focus = self.quad.get(self.focus_corner());
        magnifier::render(
            &self.source.view(),
            &self.quad,
            self.scale_factor,
            focus,
            &self.magnifier,
        )
    }

    /// Change the magnification and re-render synchronously.
    pub fn set_zoom(&mut self, zoom: f32) -> MagnifierView {
        self.magnifier.zoom = zoom.max(1.0);
        self.magnifier_view()
    }

    /// Replace the source with its 90-degree clockwise rotation and reset the
    /// session: fresh scale factor, default inset quad, `Idle` state.
    /// In-progress edits are deliberately discarded.
    pub fn rotate_source(&mut self) {
        let rotated = rotate90_cw(&self.source.view());
        let (scale_factor, canvas_width, canvas_height) =
            fit_canvas(rotated.width, rotated.height, self.bounds);
        info!(
            "rotated source to {}x{}, canvas {:.0}x{:.0}",
            rotated.width, rotated.height, canvas_width, canvas_height
        );
        self.source = Arc::new(rotated);
        self.scale_factor = scale_factor;
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        self.quad = Quad::inset(canvas_width, canvas_height);
        self.state = EditState::Idle;
    }

    /// Rectify the quadrilateral into a fresh output raster.
    ///
    /// Fails with [`GeometryError`] when the corners are degenerate; no
    /// partial raster is produced in that case.
    pub fn commit(&self, spec: &OutputSpec) -> Result<RectifiedImage, GeometryError> {
        rectify(&self.source, &self.source_quad(), *spec)
    }

    /// Run the resample on a worker thread so an input loop stays
    /// responsive; the returned handle delivers the same result `commit`
    /// would. Dropping the handle discards the in-flight work.
    pub fn commit_background(&self, spec: &OutputSpec) -> PendingCommit {
        let source = Arc::clone(&self.source);
        let source_quad = self.source_quad();
        let spec = *spec;
        PendingCommit::spawn(move || rectify(&source, &source_quad, spec))
    }
}
