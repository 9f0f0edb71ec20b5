use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// Error raised when four corner correspondences cannot define a
/// projective map.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("degenerate corner correspondences (collinear or duplicate points)")]
    DegenerateCorners,
}

/// Planar projective transform, stored as a 3x3 matrix scaled so that
/// `h(2,2) = 1`; the remaining 8 entries are the free coefficients.
///
/// The map is `(x, y) -> ((h00*x + h01*y + h02) / d, (h10*x + h11*y + h12) / d)`
/// with `d = h20*x + h21*y + 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_row_slice(&[
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ]))
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    /// The 8 free coefficients in row-major order (`h22` is 1).
    pub fn coeffs(&self) -> [f64; 8] {
        [
            self.h[(0, 0)],
            self.h[(0, 1)],
            self.h[(0, 2)],
            self.h[(1, 0)],
            self.h[(1, 1)],
            self.h[(1, 2)],
            self.h[(2, 0)],
            self.h[(2, 1)],
        ]
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }
}

/// Smallest acceptable magnitude for the product of the elimination pivots.
/// Under Hartley normalization all coordinates are O(1), so a pivot product
/// below this can only come from collinear or duplicate points.
const MIN_PIVOT_PRODUCT: f64 = 1e-10;

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn normalize_points4(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    // Hartley normalization: translate to centroid, scale so the mean
    // distance from it becomes sqrt(2)
    let n = 4.0_f64;
    let mut cx = 0.0_f64;
    let mut cy = 0.0_f64;
    for p in pts {
        cx += p.x as f64;
        cy += p.y as f64;
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0_f64;
    for p in pts {
        let dx = p.x as f64 - cx;
        let dy = p.y as f64 - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;

    let t = hartley_normalization(cx, cy, mean_dist);

    let mut out = [Point2::new(0.0_f64, 0.0_f64); 4];
    for (i, p) in pts.iter().enumerate() {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        out[i] = Point2::new(v[0], v[1]);
    }

    (out, t)
}

fn normalize_homography(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if s.abs() < 1e-12 {
        return None;
    }
    Some(h / s)
}

fn denormalize_homography(
    hn: Matrix3<f64>,
    t_src: Matrix3<f64>,
    t_dst: Matrix3<f64>,
) -> Option<Matrix3<f64>> {
    let t_dst_inv = t_dst.try_inverse()?;
    Some(t_dst_inv * hn * t_src)
}

/// Estimate H such that `dst ~ H * src` from exactly four point
/// correspondences with matching indices.
///
/// Builds the standard 8x8 planar-homography system (two rows per
/// correspondence, `h22` fixed at 1) and solves it by LU with partial
/// pivoting. Collinear or duplicate source points make the system
/// singular; that is reported as [`GeometryError::DegenerateCorners`]
/// instead of letting a vanishing pivot poison the coefficients with
/// `Inf`/`NaN`.
pub fn homography_from_quad(
    src: &[Point2<f32>; 4],
    dst: &[Point2<f32>; 4],
) -> Result<Homography, GeometryError> {
    // Unknowns: [h00 h01 h02 h10 h11 h12 h20 h21], with h22 = 1
    // For each correspondence (x,y)->(u,v):
    // h00 x + h01 y + h02 - u h20 x - u h21 y = u
    // h10 x + h11 y + h12 - v h20 x - v h21 y = v
    let (src_n, t_src) = normalize_points4(src);
    let (dst_n, t_dst) = normalize_points4(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let x = src_n[k].x;
        let y = src_n[k].y;
        let u = dst_n[k].x;
        let v = dst_n[k].y;

        // row 2k
        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        // row 2k+1
        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let lu = a.lu();
    // The LU determinant is the product of the pivots; a vanishing product
    // means at least one elimination step had no usable pivot row.
    if lu.determinant().abs() < MIN_PIVOT_PRODUCT {
        return Err(GeometryError::DegenerateCorners);
    }
    let x = lu.solve(&b).ok_or(GeometryError::DegenerateCorners)?;

    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h = denormalize_homography(hn, t_src, t_dst).ok_or(GeometryError::DegenerateCorners)?;
    let h = normalize_homography(h).ok_or(GeometryError::DegenerateCorners)?;

    Ok(Homography::new(h))
}
