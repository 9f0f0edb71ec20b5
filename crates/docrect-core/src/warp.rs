use crate::{Homography, RgbaRaster, RgbaRasterView};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Backward-warp `src` into a fresh `out_w x out_h` raster.
///
/// `h_src_from_out` maps *output* pixel coordinates to *source*
/// coordinates (estimate it with the correspondence roles swapped rather
/// than inverting a forward map). Every output pixel is mapped through the
/// homography and the nearest source pixel is copied with opaque alpha;
/// coordinates that round outside the source stay fully transparent. This
/// can only happen through floating-point round-off at the output
/// boundary when the quad is well-formed, so it is a policy, not an error.
///
/// Sampling is nearest-neighbor by design; there is no interpolated mode.
/// With the `rayon` feature the independent output rows are processed in
/// parallel, which changes nothing about the result.
pub fn warp_perspective_rgba(
    src: &RgbaRasterView<'_>,
    h_src_from_out: &Homography,
    out_w: usize,
    out_h: usize,
) -> RgbaRaster {
    if out_w == 0 || out_h == 0 {
        return RgbaRaster::new(out_w, out_h);
    }
    let mut data = vec![0u8; out_w * out_h * 4];
    let c = h_src_from_out.coeffs();
    let row_bytes = out_w * 4;

    #[cfg(feature = "rayon")]
    {
        data.par_chunks_exact_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| warp_row(src, &c, y, row));
    }

    #[cfg(not(feature = "rayon"))]
    {
        for (y, row) in data.chunks_exact_mut(row_bytes).enumerate() {
            warp_row(src, &c, y, row);
        }
    }

    RgbaRaster {
        width: out_w,
        height: out_h,
        data,
    }
}

fn warp_row(src: &RgbaRasterView<'_>, c: &[f64; 8], y: usize, row: &mut [u8]) {
    let yf = y as f64;
    for (x, px) in row.chunks_exact_mut(4).enumerate() {
        let xf = x as f64;
        let denom = c[6] * xf + c[7] * yf + 1.0;
        let u = (c[0] * xf + c[1] * yf + c[2]) / denom;
        let v = (c[3] * xf + c[4] * yf + c[5]) / denom;

        if let Some(sample) = sample_nearest(src, u, v) {
            px[0] = sample[0];
            px[1] = sample[1];
            px[2] = sample[2];
            px[3] = 255;
        }
        // else: leave the zeroed (fully transparent) pixel
    }
}

/// Nearest source pixel for a fractional coordinate, `None` outside the
/// raster or for non-finite coordinates (a vanishing denominator).
#[inline]
fn sample_nearest(src: &RgbaRasterView<'_>, u: f64, v: f64) -> Option<[u8; 4]> {
    if !u.is_finite() || !v.is_finite() {
        return None;
    }
    src.pixel(u.round() as i64, v.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::homography_from_quad;
    use nalgebra::Point2;

    fn checkerboard(w: usize, h: usize) -> RgbaRaster {
        let mut r = RgbaRaster::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let v = (x as u8).wrapping_mul(31) ^ (y as u8).wrapping_mul(17);
                r.put_pixel(x, y, [v, v.wrapping_add(1), v.wrapping_add(2), 255]);
            }
        }
        r
    }

    fn rect(w: f32, h: f32) -> [Point2<f32>; 4] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
    }

    #[test]
    fn identity_quad_copies_pixels_exactly() {
        let src = checkerboard(24, 16);
        // quad equals the output rectangle: the map reduces to identity
        let h = homography_from_quad(&rect(24.0, 16.0), &rect(24.0, 16.0)).unwrap();
        let out = warp_perspective_rgba(&src.view(), &h, 24, 16);
        assert_eq!(out, src);
    }

    #[test]
    fn axis_aligned_quad_copies_a_subregion() {
        let src = checkerboard(64, 48);
        // output rect -> source rect starting at (10, 6), 1:1 scale
        let quad = [
            Point2::new(10.0, 6.0),
            Point2::new(30.0, 6.0),
            Point2::new(30.0, 22.0),
            Point2::new(10.0, 22.0),
        ];
        let h = homography_from_quad(&rect(20.0, 16.0), &quad).unwrap();
        let out = warp_perspective_rgba(&src.view(), &h, 20, 16);
        for y in 0..16 {
            for x in 0..20 {
                assert_eq!(
                    out.view().pixel(x as i64, y as i64),
                    src.view().pixel(x as i64 + 10, y as i64 + 6),
                    "mismatch at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn out_of_range_samples_become_transparent() {
        let src = checkerboard(8, 8);
        // quad reaching well outside the source raster
        let quad = [
            Point2::new(-20.0, -20.0),
            Point2::new(28.0, -20.0),
            Point2::new(28.0, 28.0),
            Point2::new(-20.0, 28.0),
        ];
        let h = homography_from_quad(&rect(12.0, 12.0), &quad).unwrap();
        let out = warp_perspective_rgba(&src.view(), &h, 12, 12);

        let corner = out.view().pixel(0, 0).unwrap();
        assert_eq!(corner[3], 0, "outside sample must be transparent");
        let inside = out.view().pixel(6, 6).unwrap();
        assert_eq!(inside[3], 255, "inside sample must be opaque");
    }

    #[test]
    fn perspective_quad_produces_fully_opaque_output() {
        let src = checkerboard(100, 80);
        let quad = [
            Point2::new(12.0, 9.0),
            Point2::new(91.0, 15.0),
            Point2::new(84.0, 70.0),
            Point2::new(8.0, 63.0),
        ];
        let h = homography_from_quad(&rect(50.0, 32.0), &quad).unwrap();
        let out = warp_perspective_rgba(&src.view(), &h, 50, 32);
        assert!(
            out.data.chunks_exact(4).all(|px| px[3] == 255),
            "a quad inside the source must map every output pixel"
        );
    }
}
