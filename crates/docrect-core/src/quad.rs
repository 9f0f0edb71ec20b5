use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Fraction of the canvas kept as margin by the default quadrilateral.
const DEFAULT_INSET: f32 = 0.1;

/// Semantic role of a quadrilateral corner.
///
/// Roles are fixed for the lifetime of a quad: corners move, they are never
/// reordered. The rectified output always maps TL->(0,0), TR->(W,0),
/// BR->(W,H), BL->(0,H).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All four corners in overlay order (TL -> TR -> BR -> BL).
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];
}

/// Four named corner points in display-canvas coordinates.
///
/// The quad is *not* required to stay convex or non-self-intersecting while
/// the user drags corners around; a degenerate configuration only surfaces
/// as [`GeometryError`](crate::GeometryError) when a homography is
/// estimated from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub tl: Point2<f32>,
    pub tr: Point2<f32>,
    pub br: Point2<f32>,
    pub bl: Point2<f32>,
}

impl Quad {
    /// Default quad for a fresh canvas: corners inset 10% from each edge.
    pub fn inset(canvas_w: f32, canvas_h: f32) -> Self {
        let dx = canvas_w * DEFAULT_INSET;
        let dy = canvas_h * DEFAULT_INSET;
        Self {
            tl: Point2::new(dx, dy),
            tr: Point2::new(canvas_w - dx, dy),
            br: Point2::new(canvas_w - dx, canvas_h - dy),
            bl: Point2::new(dx, canvas_h - dy),
        }
    }

    pub fn get(&self, corner: Corner) -> Point2<f32> {
        match corner {
            Corner::TopLeft => self.tl,
            Corner::TopRight => self.tr,
            Corner::BottomRight => self.br,
            Corner::BottomLeft => self.bl,
        }
    }

    pub fn set(&mut self, corner: Corner, p: Point2<f32>) {
        match corner {
            Corner::TopLeft => self.tl = p,
            Corner::TopRight => self.tr = p,
            Corner::BottomRight => self.br = p,
            Corner::BottomLeft => self.bl = p,
        }
    }

    /// Corner points in overlay order (TL, TR, BR, BL).
    pub fn points(&self) -> [Point2<f32>; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    /// Uniformly scale every corner, e.g. by `1 / scale_factor` to move
    /// from display space into source-raster space.
    pub fn scaled(&self, s: f32) -> Self {
        let f = |p: Point2<f32>| Point2::new(p.x * s, p.y * s);
        Self {
            tl: f(self.tl),
            tr: f(self.tr),
            br: f(self.br),
            bl: f(self.bl),
        }
    }

    /// True when every corner lies within `[0, w] x [0, h]`.
    pub fn within(&self, w: f32, h: f32) -> bool {
        self.points()
            .iter()
            .all(|p| p.x >= 0.0 && p.x <= w && p.y >= 0.0 && p.y <= h)
    }
}

/// Clamp a point into `[0, w] x [0, h]`.
///
/// This is the single clamp used by every coordinate mutation; anything
/// downstream may assume the invariant instead of re-clamping.
#[inline]
pub fn clamp_to_canvas(p: Point2<f32>, w: f32, h: f32) -> Point2<f32> {
    Point2::new(p.x.clamp(0.0, w), p.y.clamp(0.0, h))
}
