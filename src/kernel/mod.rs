//! Stateless geometric primitives: vector helpers, robust predicates, line
//! intersection, point/segment distance, parabola approximation and small
//! polynomial minimizers.

use geo_types::Coord;
use num_traits::NumCast;

use crate::error::{GeometryError, Result};
use crate::VoronoiFloat;

mod minimize;
mod parabola;

pub use minimize::{min_quadratic, min_quartic};
pub use parabola::{approx_parabola, parabola_h};

/// Hand-rolled 2D vector operations on [`Coord`].
///
/// Brings together the small linear-algebra pieces the diagram needs so they
/// are not re-derived inline at every call site.
pub trait VectorOps<Rhs = Self>
where
    Self: Sized,
{
    type Scalar: VoronoiFloat;

    /// `sqrt(x² + y²)`
    fn magnitude(self) -> Self::Scalar;

    /// `x² + y²`
    fn magnitude_squared(self) -> Self::Scalar;

    /// Rotate 90° counter-clockwise around the origin: `(-y, x)`.
    fn left(self) -> Self;

    /// Rotate 90° clockwise around the origin: `(y, -x)`.
    fn right(self) -> Self;

    /// `a · b`
    fn dot_product(self, other: Rhs) -> Self::Scalar;

    /// `a ∧ b = a.x·b.y − a.y·b.x`, the signed parallelogram area.
    fn wedge_product(self, other: Rhs) -> Self::Scalar;

    /// Scale to unit length. Returns `None` for a (near-)zero vector.
    fn try_normalize(self) -> Option<Self>;
}

impl<T: VoronoiFloat> VectorOps for Coord<T> {
    type Scalar = T;

    fn magnitude(self) -> T {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    fn magnitude_squared(self) -> T {
        self.x * self.x + self.y * self.y
    }

    fn left(self) -> Self {
        Coord {
            x: -self.y,
            y: self.x,
        }
    }

    fn right(self) -> Self {
        Coord {
            x: self.y,
            y: -self.x,
        }
    }

    fn dot_product(self, other: Self) -> T {
        self.x * other.x + self.y * other.y
    }

    fn wedge_product(self, other: Self) -> T {
        self.x * other.y - self.y * other.x
    }

    fn try_normalize(self) -> Option<Self> {
        let m = self.magnitude();
        if m.is_zero() || !m.is_finite() {
            return None;
        }
        Some(Coord {
            x: self.x / m,
            y: self.y / m,
        })
    }
}

/// Signed area of the parallelogram spanned by `u` and `v`.
pub fn det2<T: VoronoiFloat>(u: Coord<T>, v: Coord<T>) -> T {
    u.wedge_product(v)
}

fn to_robust<T: VoronoiFloat>(c: Coord<T>) -> robust::Coord<f64> {
    robust::Coord {
        x: <f64 as NumCast>::from(c.x).unwrap(),
        y: <f64 as NumCast>::from(c.y).unwrap(),
    }
}

/// `true` iff `c` lies strictly to the left of the directed line `a → b`.
///
/// Evaluated with the exact predicate from the `robust` crate, so collinear
/// points never report as left of the line.
pub fn is_left<T: VoronoiFloat>(a: Coord<T>, b: Coord<T>, c: Coord<T>) -> bool {
    robust::orient2d(to_robust(a), to_robust(b), to_robust(c)) > 0.
}

/// `true` iff `(a, b, c)` is counter-clockwise.
pub fn is_ccw<T: VoronoiFloat>(a: Coord<T>, b: Coord<T>, c: Coord<T>) -> bool {
    is_left(a, b, c)
}

/// `true` iff `x` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `(a, b, c)`.
///
/// The orientation precondition is checked: calling this with a clockwise
/// triangle is a programming error and aborts.
pub fn in_circle<T: VoronoiFloat>(a: Coord<T>, b: Coord<T>, c: Coord<T>, x: Coord<T>) -> bool {
    debug_assert!(
        is_ccw(a, b, c),
        "in_circle requires a counter-clockwise triangle"
    );
    robust::incircle(to_robust(a), to_robust(b), to_robust(c), to_robust(x)) > 0.
}

/// Intersection of the infinite lines `ab` and `cd`.
///
/// Unlike segment intersection this ignores the extents of the four points;
/// parallel (concurrent-direction) lines are an error.
pub fn line_inter<T: VoronoiFloat>(
    a: Coord<T>,
    b: Coord<T>,
    c: Coord<T>,
    d: Coord<T>,
) -> Result<Coord<T>> {
    let u = b - a;
    let v = d - c;
    let den = u.wedge_product(v);
    if den.is_zero() {
        return Err(GeometryError::ConcurrentLines);
    }
    let t = (c - a).wedge_product(v) / den;
    Ok(a + u * t)
}

/// Parameter in `[0, 1]` of the projection of `c` onto the line through
/// `a` and `b`, unclamped.
pub fn seg_param<T: VoronoiFloat>(a: Coord<T>, b: Coord<T>, c: Coord<T>) -> T {
    let u = b - a;
    let len2 = u.magnitude_squared();
    debug_assert!(!len2.is_zero(), "zero-length segment");
    (c - a).dot_product(u) / len2
}

/// Squared distance of `c` to the closed segment `[a, b]`.
pub fn seg_distance_sq<T: VoronoiFloat>(a: Coord<T>, b: Coord<T>, c: Coord<T>) -> T {
    let u = b - a;
    // |a + t·u − c|² is quadratic in t; minimize it on [0, 1]
    let quad = (
        u.magnitude_squared(),
        u.dot_product(a - c),
        (a - c).magnitude_squared(),
    );
    min_quadratic(quad, (T::zero(), T::one())).1
}

/// Circumcenter of the triangle `(a, b, c)`, or `None` when degenerate.
pub fn circumcenter<T: VoronoiFloat>(a: Coord<T>, b: Coord<T>, c: Coord<T>) -> Option<Coord<T>> {
    let two = T::one() + T::one();
    let ab = b - a;
    let ac = c - a;
    let den = two * ab.wedge_product(ac);
    if den.is_zero() {
        return None;
    }
    let ab2 = ab.magnitude_squared();
    let ac2 = ac.magnitude_squared();
    Some(Coord {
        x: a.x + (ac.y * ab2 - ab.y * ac2) / den,
        y: a.y + (ab.x * ac2 - ac.x * ab2) / den,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn wedge_and_det_agree() {
        let u = coord! { x: 3.0, y: 1.0 };
        let v = coord! { x: 1.0, y: 2.0 };
        assert_eq!(det2(u, v), 5.0);
        assert_eq!(u.wedge_product(v), -v.wedge_product(u));
    }

    #[test]
    fn left_right_rotations() {
        let u = coord! { x: 1.0, y: 0.0 };
        assert_eq!(u.left(), coord! { x: 0.0, y: 1.0 });
        assert_eq!(u.right(), coord! { x: 0.0, y: -1.0 });
        assert_eq!(u.left().right(), u);
    }

    #[test]
    fn is_left_strict_on_collinear() {
        let a = coord! { x: 0.0, y: 0.0 };
        let b = coord! { x: 2.0, y: 0.0 };
        assert!(is_left(a, b, coord! { x: 1.0, y: 1.0 }));
        assert!(!is_left(a, b, coord! { x: 1.0, y: 0.0 }));
        assert!(!is_left(a, b, coord! { x: 1.0, y: -1.0 }));
    }

    #[test]
    fn in_circle_unit_triangle() {
        let a = coord! { x: 0.0, y: 0.0 };
        let b = coord! { x: 1.0, y: 0.0 };
        let c = coord! { x: 0.5, y: 1.0 };
        assert!(in_circle(a, b, c, coord! { x: 0.5, y: 0.5 }));
        assert!(!in_circle(a, b, c, coord! { x: 5.0, y: 5.0 }));
    }

    #[test]
    fn line_inter_diagonals() {
        let p = line_inter(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 2.0, y: 2.0 },
            coord! { x: 0.0, y: 2.0 },
            coord! { x: 2.0, y: 0.0 },
        )
        .unwrap();
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 1.0);
    }

    #[test]
    fn line_inter_parallel_errors() {
        let r = line_inter(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 0.0, y: 1.0 },
            coord! { x: 1.0, y: 1.0 },
        );
        assert_eq!(r, Err(GeometryError::ConcurrentLines));
    }

    #[test]
    fn seg_distance_interior_and_endpoint() {
        let a = coord! { x: 0.0, y: 0.0 };
        let b = coord! { x: 10.0, y: 0.0 };
        assert_relative_eq!(seg_distance_sq(a, b, coord! { x: 5.0, y: 3.0 }), 9.0);
        assert_relative_eq!(seg_distance_sq(a, b, coord! { x: -3.0, y: 4.0 }), 25.0);
    }

    #[test]
    fn circumcenter_right_triangle() {
        let cc = circumcenter(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 2.0, y: 0.0 },
            coord! { x: 0.0, y: 2.0 },
        )
        .unwrap();
        assert_relative_eq!(cc.x, 1.0);
        assert_relative_eq!(cc.y, 1.0);
    }
}
