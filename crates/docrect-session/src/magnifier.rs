use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use docrect_core::{Quad, RgbaRasterView};

/// Backdrop shown where the magnified region leaves the source raster.
const BACKDROP: [u8; 4] = [30, 30, 30, 255];
/// Quad edges are drawn twice, dark plus a light copy offset by one pixel,
/// so the outline reads on any background.
const EDGE_DARK: [u8; 4] = [0, 0, 0, 255];
const EDGE_LIGHT: [u8; 4] = [255, 255, 255, 255];
const EDGE_OFFSET: f32 = 1.0;
/// Corner markers: a crimson disc inside a gray ring.
const MARKER_FILL: [u8; 4] = [196, 30, 58, 255];
const MARKER_RING: [u8; 4] = [128, 128, 128, 255];
const MARKER_RADIUS: f32 = 5.0;
const MARKER_RING_WIDTH: f32 = 4.0;

/// Magnifier configuration: a fixed viewport and an adjustable zoom
/// multiplier applied to the source raster.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MagnifierSettings {
    pub viewport_width: usize,
    pub viewport_height: usize,
    pub zoom: f32,
}

impl Default for MagnifierSettings {
    fn default() -> Self {
        Self {
            viewport_width: 400,
            viewport_height: 400,
            zoom: 1.5,
        }
    }
}

/// A rendered preview patch (row-major RGBA, viewport-sized).
#[derive(Clone, Debug)]
pub struct MagnifierView {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
    /// Source-raster coordinate under the viewport center.
    pub center: Point2<f32>,
    pub zoom: f32,
}

/// Render the zoomed window of `source` around `focus` (display
/// coordinates) with the quadrilateral overlay projected into it.
///
/// Pure visualization: reads the model, never writes it. Called again on
/// every focus or zoom change.
pub(crate) fn render(
    source: &RgbaRasterView<'_>,
    quad: &Quad,
    scale_factor: f32,
    focus: Point2<f32>,
    settings: &MagnifierSettings,
) -> MagnifierView {
    let (vw, vh) = (settings.viewport_width, settings.viewport_height);
    let zoom = settings.zoom;

    // focus in source space; the magnified region starts half a viewport
    // (in source pixels) above and left of it
    let cx = focus.x / scale_factor;
    let cy = focus.y / scale_factor;
    let sx = cx - vw as f32 / zoom / 2.0;
    let sy = cy - vh as f32 / zoom / 2.0;

    let mut data = vec![0u8; vw * vh * 4];
    for y in 0..vh {
        for x in 0..vw {
            let u = sx + x as f32 / zoom;
            let v = sy + y as f32 / zoom;
            let px = source
                .pixel(u.round() as i64, v.round() as i64)
                .unwrap_or(BACKDROP);
            let i = (y * vw + x) * 4;
            data[i..i + 4].copy_from_slice(&px);
        }
    }

    // project the display-space corners into viewport coordinates
    let zoomed = quad
        .points()
        .map(|p| Point2::new((p.x / scale_factor - sx) * zoom, (p.y / scale_factor - sy) * zoom));

    for i in 0..4 {
        draw_line(&mut data, vw, vh, zoomed[i], zoomed[(i + 1) % 4], EDGE_DARK);
    }
    for i in 0..4 {
        let a = Point2::new(zoomed[i].x + EDGE_OFFSET, zoomed[i].y + EDGE_OFFSET);
        let b = Point2::new(
            zoomed[(i + 1) % 4].x + EDGE_OFFSET,
            zoomed[(i + 1) % 4].y + EDGE_OFFSET,
        );
        draw_line(&mut data, vw, vh, a, b, EDGE_LIGHT);
    }

    for p in zoomed {
        fill_disc(&mut data, vw, vh, p, MARKER_RADIUS, MARKER_FILL);
        fill_ring(
            &mut data,
            vw,
            vh,
            p,
            MARKER_RADIUS - MARKER_RING_WIDTH / 2.0,
            MARKER_RADIUS + MARKER_RING_WIDTH / 2.0,
            MARKER_RING,
        );
    }

    MagnifierView {
        width: vw,
        height: vh,
        data,
        center: Point2::new(cx, cy),
        zoom,
    }
}

#[inline]
fn put(data: &mut [u8], w: usize, h: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
        return;
    }
    let i = (y as usize * w + x as usize) * 4;
    data[i..i + 4].copy_from_slice(&color);
}

/// Bresenham line, clipped per pixel.
fn draw_line(data: &mut [u8], w: usize, h: usize, a: Point2<f32>, b: Point2<f32>, color: [u8; 4]) {
    let mut x0 = a.x.round() as i32;
    let mut y0 = a.y.round() as i32;
    let x1 = b.x.round() as i32;
    let y1 = b.y.round() as i32;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        put(data, w, h, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn fill_disc(data: &mut [u8], w: usize, h: usize, c: Point2<f32>, r: f32, color: [u8; 4]) {
    let r2 = r * r;
    let x_lo = (c.x - r).floor() as i32;
    let x_hi = (c.x + r).ceil() as i32;
    let y_lo = (c.y - r).floor() as i32;
    let y_hi = (c.y + r).ceil() as i32;
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            let dx = x as f32 - c.x;
            let dy = y as f32 - c.y;
            if dx * dx + dy * dy <= r2 {
                put(data, w, h, x, y, color);
            }
        }
    }
}

fn fill_ring(
    data: &mut [u8],
    w: usize,
    h: usize,
    c: Point2<f32>,
    r_inner: f32,
    r_outer: f32,
    color: [u8; 4],
) {
    let (i2, o2) = (r_inner * r_inner, r_outer * r_outer);
    let x_lo = (c.x - r_outer).floor() as i32;
    let x_hi = (c.x + r_outer).ceil() as i32;
    let y_lo = (c.y - r_outer).floor() as i32;
    let y_hi = (c.y + r_outer).ceil() as i32;
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            let dx = x as f32 - c.x;
            let dy = y as f32 - c.y;
            let d2 = dx * dx + dy * dy;
            if d2 >= i2 && d2 <= o2 {
                put(data, w, h, x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrect_core::RgbaRaster;

    fn gradient(w: usize, h: usize) -> RgbaRaster {
        let mut r = RgbaRaster::new(w, h);
        for y in 0..h {
            for x in 0..w {
                r.put_pixel(x, y, [(x % 251) as u8, (y % 251) as u8, 0, 255]);
            }
        }
        r
    }

    fn view_pixel(m: &MagnifierView, x: usize, y: usize) -> [u8; 4] {
        let i = (y * m.width + x) * 4;
        [m.data[i], m.data[i + 1], m.data[i + 2], m.data[i + 3]]
    }

    #[test]
    fn viewport_has_the_configured_dimensions() {
        let src = gradient(600, 600);
        let m = render(
            &src.view(),
            &Quad::inset(600.0, 600.0),
            1.0,
            Point2::new(300.0, 300.0),
            &MagnifierSettings::default(),
        );
        assert_eq!((m.width, m.height), (400, 400));
        assert_eq!(m.data.len(), 400 * 400 * 4);
        assert!((m.zoom - 1.5).abs() < 1e-6);
    }

    #[test]
    fn center_pixel_samples_the_focus_point() {
        let src = gradient(600, 600);
        // focus far from the quad so no overlay covers the center
        let quad = Quad::inset(600.0, 600.0);
        let focus = Point2::new(300.0, 300.0);
        let settings = MagnifierSettings {
            viewport_width: 100,
            viewport_height: 100,
            zoom: 2.0,
        };
        let m = render(&src.view(), &quad, 1.0, focus, &settings);
        assert_eq!(m.center, Point2::new(300.0, 300.0));
        let got = view_pixel(&m, 50, 50);
        let want = src.view().pixel(300, 300).unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn focus_maps_through_the_scale_factor() {
        let src = gradient(600, 600);
        let m = render(
            &src.view(),
            &Quad::inset(300.0, 300.0),
            0.5,
            Point2::new(150.0, 150.0),
            &MagnifierSettings::default(),
        );
        // display (150,150) at scale 0.5 is source (300,300)
        assert_eq!(m.center, Point2::new(300.0, 300.0));
    }

    #[test]
    fn region_outside_the_source_shows_the_backdrop() {
        let src = gradient(100, 100);
        let m = render(
            &src.view(),
            &Quad::inset(100.0, 100.0),
            1.0,
            Point2::new(0.0, 0.0),
            &MagnifierSettings::default(),
        );
        assert_eq!(view_pixel(&m, 0, 0), BACKDROP);
    }

    #[test]
    fn corner_markers_are_drawn_at_the_projected_corners() {
        let src = gradient(200, 200);
        let quad = Quad::inset(200.0, 200.0);
        let focus = quad.tl;
        let settings = MagnifierSettings::default();
        let m = render(&src.view(), &quad, 1.0, focus, &settings);

        // the focused corner projects to the viewport center
        let cx = m.width / 2;
        let cy = m.height / 2;
        assert_eq!(view_pixel(&m, cx, cy), MARKER_FILL);
        // the ring sits MARKER_RADIUS+ring/2 pixels out
        let ring_x = cx + MARKER_RADIUS as usize + 1;
        assert_eq!(view_pixel(&m, ring_x, cy), MARKER_RING);
    }

    #[test]
    fn higher_zoom_narrows_the_sampled_region() {
        let src = gradient(600, 600);
        let quad = Quad::inset(600.0, 600.0);
        let focus = Point2::new(300.0, 300.0);
        let narrow = MagnifierSettings {
            viewport_width: 100,
            viewport_height: 100,
            zoom: 10.0,
        };
        let m = render(&src.view(), &quad, 1.0, focus, &narrow);
        // leftmost column samples source x = 300 - 100/10/2 = 295
        let got = view_pixel(&m, 0, 50);
        let want = src.view().pixel(295, 300).unwrap();
        assert_eq!(got, want);
    }
}
