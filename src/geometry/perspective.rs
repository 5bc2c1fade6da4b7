//! # Perspective Transform
//!
//! Quad-to-quad homography between camera space and screen space.
//!
//! The transform is composed through the unit square:
//!
//! ```text
//! camera quad --quad_to_square--> unit square --square_to_quad--> screen quad
//! ```
//!
//! Matrices are 4×4, row-major, applied to row vectors `(x, y, 0, 1)`. The
//! z row/column is unused and fixed to identity.
//!
//! Corner order is top-left, top-right, bottom-left, bottom-right. Any order
//! works as long as source and destination agree.
//!
//! ## Usage
//!
//! ```
//! use wiiboard::geometry::perspective::{PerspectiveTransform, Point, Quad};
//!
//! let camera = Quad::new(
//!     Point::new(0.0, 0.0),
//!     Point::new(200.0, 0.0),
//!     Point::new(0.0, 200.0),
//!     Point::new(200.0, 200.0),
//! );
//! let screen = Quad::new(
//!     Point::new(0.0, 0.0),
//!     Point::new(100.0, 0.0),
//!     Point::new(0.0, 100.0),
//!     Point::new(100.0, 100.0),
//! );
//!
//! let mut transform = PerspectiveTransform::new(camera, screen);
//! let (x, y) = transform.warp(100.0, 100.0)?;
//! assert!((x - 50.0).abs() < 1e-9 && (y - 50.0).abs() < 1e-9);
//! # Ok::<(), wiiboard::error::WiiboardError>(())
//! ```

use crate::error::{Result, WiiboardError};

/// Row-major 4×4 homogeneous matrix.
pub type Matrix4 = [f64; 16];

/// Determinants (and g/h denominators) below this magnitude are degenerate.
const DEGENERATE_EPSILON: f64 = 1e-9;

/// 4×4 identity matrix.
pub const IDENTITY: Matrix4 = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Four corners: top-left, top-right, bottom-left, bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 4]);

impl Default for Quad {
    /// The unit square.
    fn default() -> Self {
        Self::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        )
    }
}

impl Quad {
    #[must_use]
    pub const fn new(top_left: Point, top_right: Point, bottom_left: Point, bottom_right: Point) -> Self {
        Self([top_left, top_right, bottom_left, bottom_right])
    }

    /// Rectangle of `width` × `height` inset by `margin` (a fraction of each side).
    ///
    /// # Examples
    ///
    /// ```
    /// use wiiboard::geometry::perspective::{Point, Quad};
    ///
    /// let quad = Quad::inset_rectangle(1000.0, 800.0, 0.05);
    /// assert_eq!(quad.0[0], Point::new(50.0, 40.0));
    /// assert_eq!(quad.0[3], Point::new(950.0, 760.0));
    /// ```
    #[must_use]
    pub fn inset_rectangle(width: f64, height: f64, margin: f64) -> Self {
        let left = width * margin;
        let right = width * (1.0 - margin);
        let top = height * margin;
        let bottom = height * (1.0 - margin);

        Self::new(
            Point::new(left, top),
            Point::new(right, top),
            Point::new(left, bottom),
            Point::new(right, bottom),
        )
    }
}

/// Camera-to-screen perspective transform with a cached matrix.
///
/// The cached matrix is only valid while `computed` is true; changing either
/// quad clears the flag and the next [`warp`](Self::warp) recomputes.
#[derive(Debug, Clone)]
pub struct PerspectiveTransform {
    source: Quad,
    destination: Quad,
    matrix: Matrix4,
    computed: bool,
}

impl Default for PerspectiveTransform {
    fn default() -> Self {
        Self::new(Quad::default(), Quad::default())
    }
}

impl PerspectiveTransform {
    /// Creates a transform; the matrix is computed lazily.
    #[must_use]
    pub fn new(source: Quad, destination: Quad) -> Self {
        Self {
            source,
            destination,
            matrix: IDENTITY,
            computed: false,
        }
    }

    /// Camera-space quad
    #[must_use]
    pub fn source(&self) -> &Quad {
        &self.source
    }

    /// Screen-space quad
    #[must_use]
    pub fn destination(&self) -> &Quad {
        &self.destination
    }

    /// Whether the cached matrix is valid
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.computed
    }

    /// Combined matrix, if computed
    #[must_use]
    pub fn matrix(&self) -> Option<&Matrix4> {
        self.computed.then_some(&self.matrix)
    }

    /// Sets the camera-space quad and invalidates the cache.
    pub fn set_source(&mut self, source: Quad) {
        self.source = source;
        self.computed = false;
    }

    /// Sets the screen-space quad and invalidates the cache.
    pub fn set_destination(&mut self, destination: Quad) {
        self.destination = destination;
        self.computed = false;
    }

    /// Recomputes the combined matrix from both quads.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateQuad` if either quad cannot be mapped. The cached
    /// matrix is left untouched and stays invalid.
    pub fn compute(&mut self) -> Result<()> {
        self.matrix = combine(&self.source, &self.destination)?;
        self.computed = true;
        Ok(())
    }

    /// Swaps in a new camera-space quad only if it yields a valid transform.
    ///
    /// On error the previous source, matrix and computed flag are all kept.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateQuad` if `source` cannot be mapped.
    pub fn replace_source(&mut self, source: Quad) -> Result<()> {
        let matrix = combine(&source, &self.destination)?;
        self.source = source;
        self.matrix = matrix;
        self.computed = true;
        Ok(())
    }

    /// Maps a camera-space point to screen space, recomputing first if needed.
    ///
    /// # Errors
    ///
    /// - `DegenerateQuad`: the matrix had to be recomputed and could not be
    /// - `SingularWarp`: the point maps to infinity (w = 0)
    pub fn warp(&mut self, x: f64, y: f64) -> Result<(f64, f64)> {
        if !self.computed {
            self.compute()?;
        }
        apply(&self.matrix, x, y)
    }
}

/// Quad-to-square for `source`, multiplied by square-to-quad for `destination`.
fn combine(source: &Quad, destination: &Quad) -> Result<Matrix4> {
    let src = quad_to_square(source)?;
    let dst = square_to_quad(destination)?;
    let combined = multiply(&src, &dst);

    if combined.iter().all(|v| v.is_finite()) {
        Ok(combined)
    } else {
        Err(WiiboardError::DegenerateQuad)
    }
}

/// Matrix mapping the unit square onto `quad`.
///
/// # Errors
///
/// Returns `DegenerateQuad` if the g/h denominator vanishes.
pub fn square_to_quad(quad: &Quad) -> Result<Matrix4> {
    let [p0, p1, p2, p3] = quad.0;
    let (x0, y0, x1, y1, x2, y2, x3, y3) = (p0.x, p0.y, p1.x, p1.y, p2.x, p2.y, p3.x, p3.y);

    let dx1 = x1 - x2;
    let dy1 = y1 - y2;
    let dx2 = x3 - x2;
    let dy2 = y3 - y2;
    let sx = x0 - x1 + x2 - x3;
    let sy = y0 - y1 + y2 - y3;

    let denominator = dx1 * dy2 - dx2 * dy1;
    if denominator.abs() < DEGENERATE_EPSILON {
        return Err(WiiboardError::DegenerateQuad);
    }

    let g = (sx * dy2 - dx2 * sy) / denominator;
    let h = (dx1 * sy - sx * dy1) / denominator;
    let a = x1 - x0 + g * x1;
    let b = x3 - x0 + h * x3;
    let c = x0;
    let d = y1 - y0 + g * y1;
    let e = y3 - y0 + h * y3;
    let f = y0;

    Ok([
        a, d, 0.0, g, //
        b, e, 0.0, h, //
        0.0, 0.0, 1.0, 0.0, //
        c, f, 0.0, 1.0,
    ])
}

/// Matrix mapping `quad` onto the unit square (adjugate inverse of
/// [`square_to_quad`]).
///
/// # Errors
///
/// Returns `DegenerateQuad` if the determinant vanishes.
pub fn quad_to_square(quad: &Quad) -> Result<Matrix4> {
    let m = square_to_quad(quad)?;

    let (a, d, g) = (m[0], m[1], m[3]);
    let (b, e, h) = (m[4], m[5], m[7]);
    let (c, f) = (m[12], m[13]);

    let cof_a = e - f * h;
    let cof_b = c * h - b;
    let cof_c = b * f - c * e;
    let cof_d = f * g - d;
    let cof_e = a - c * g;
    let cof_f = c * d - a * f;
    let cof_g = d * h - e * g;
    let cof_h = b * g - a * h;
    let cof_i = a * e - b * d;

    let det = a * cof_a + b * cof_d + c * cof_g;
    if det.abs() < DEGENERATE_EPSILON || !det.is_finite() {
        return Err(WiiboardError::DegenerateQuad);
    }
    let idet = 1.0 / det;

    Ok([
        cof_a * idet, cof_d * idet, 0.0, cof_g * idet, //
        cof_b * idet, cof_e * idet, 0.0, cof_h * idet, //
        0.0, 0.0, 1.0, 0.0, //
        cof_c * idet, cof_f * idet, 0.0, cof_i * idet,
    ])
}

/// Standard 4×4 product `lhs × rhs`.
#[must_use]
pub fn multiply(lhs: &Matrix4, rhs: &Matrix4) -> Matrix4 {
    let mut out = [0.0; 16];
    for r in 0..4 {
        let ri = r * 4;
        for c in 0..4 {
            out[ri + c] = lhs[ri] * rhs[c]
                + lhs[ri + 1] * rhs[c + 4]
                + lhs[ri + 2] * rhs[c + 8]
                + lhs[ri + 3] * rhs[c + 12];
        }
    }
    out
}

/// Applies `matrix` to `(x, y, 0, 1)` and divides by w.
fn apply(matrix: &Matrix4, x: f64, y: f64) -> Result<(f64, f64)> {
    let out_x = x * matrix[0] + y * matrix[4] + matrix[12];
    let out_y = x * matrix[1] + y * matrix[5] + matrix[13];
    let w = x * matrix[3] + y * matrix[7] + matrix[15];

    if w == 0.0 || !w.is_finite() {
        return Err(WiiboardError::SingularWarp);
    }

    Ok((out_x / w, out_y / w))
}
