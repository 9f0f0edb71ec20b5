use crate::{RgbaRaster, RgbaRasterView};

/// Rotate a raster 90 degrees clockwise into a new buffer with swapped
/// dimensions.
///
/// Rotation is a full replacement, never an in-place mutation: callers
/// that hold editing state against the old raster must re-derive it (see
/// `EditSession::rotate_source` in `docrect-session`).
pub fn rotate90_cw(src: &RgbaRasterView<'_>) -> RgbaRaster {
    let (w, h) = (src.width, src.height);
    let mut out = RgbaRaster::new(h, w);
    for oy in 0..w {
        for ox in 0..h {
            // output (ox, oy) takes source (oy, h - 1 - ox)
            let s = ((h - 1 - ox) * w + oy) * 4;
            let d = (oy * h + ox) * 4;
            out.data[d..d + 4].copy_from_slice(&src.data[s..s + 4]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_swap() {
        let src = RgbaRaster::new(7, 3);
        let out = rotate90_cw(&src.view());
        assert_eq!((out.width, out.height), (3, 7));
    }

    #[test]
    fn corner_pixels_land_where_a_clockwise_turn_puts_them() {
        let mut src = RgbaRaster::new(4, 2);
        src.put_pixel(0, 0, [1, 0, 0, 255]); // top-left
        src.put_pixel(3, 0, [2, 0, 0, 255]); // top-right
        src.put_pixel(3, 1, [3, 0, 0, 255]); // bottom-right
        src.put_pixel(0, 1, [4, 0, 0, 255]); // bottom-left

        let out = rotate90_cw(&src.view());
        // clockwise: top-left -> top-right, top-right -> bottom-right, ...
        assert_eq!(out.view().pixel(1, 0), Some([1, 0, 0, 255]));
        assert_eq!(out.view().pixel(1, 3), Some([2, 0, 0, 255]));
        assert_eq!(out.view().pixel(0, 3), Some([3, 0, 0, 255]));
        assert_eq!(out.view().pixel(0, 0), Some([4, 0, 0, 255]));
    }

    #[test]
    fn four_turns_restore_the_original() {
        let mut src = RgbaRaster::new(5, 3);
        for y in 0..3 {
            for x in 0..5 {
                src.put_pixel(x, y, [x as u8, y as u8, (x * y) as u8, 255]);
            }
        }
        let mut r = src.clone();
        for _ in 0..4 {
            r = rotate90_cw(&r.view());
        }
        assert_eq!(r, src);
    }
}
