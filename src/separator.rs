//! Parametrized bisectors of two sites ("separators") and their branch
//! bookkeeping.
//!
//! A separator is the locus of points equidistant from two sites. Each one
//! carries an `origin`, a `tangent`, a `normal` and the perigee radius
//! `rmin`, and exposes `evaluate(branch, r)` — the point at distance `r` from
//! both sites on the chosen branch — plus a chordal `approximate` for
//! parabolic arcs. Orientation convention: walking the `+` branch away from
//! the perigee, the second-named site lies to the right.

use geo_types::{Coord, Line};

use crate::error::{GeometryError, Result};
use crate::kernel::{approx_parabola, line_inter, seg_param, VectorOps};
use crate::VoronoiFloat;

/// One of the two infinite halves of a separator.
///
/// `Zero` is the collapsed branch of a parallel bisector — a valid
/// topological state — while `Bad` marks an uninitialized or unresolvable
/// branch. The discriminants are chosen so that negation is closed:
/// `-Bad = Bad`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(i8)]
pub enum Branch {
    Bad = -128,
    Minus = -1,
    Zero = 0,
    Plus = 1,
}

impl Branch {
    pub fn is_bad(self) -> bool {
        self == Branch::Bad
    }

    /// The multiplicative sign of the branch; `Bad` has none.
    pub(crate) fn factor<T: VoronoiFloat>(self) -> T {
        match self {
            Branch::Plus => T::one(),
            Branch::Minus => -T::one(),
            Branch::Zero => T::zero(),
            Branch::Bad => {
                debug_assert!(false, "evaluating a Bad branch");
                T::zero()
            }
        }
    }

    fn from_sign<T: VoronoiFloat>(s: T) -> Self {
        if s < T::zero() {
            Branch::Minus
        } else {
            Branch::Plus
        }
    }
}

impl std::ops::Neg for Branch {
    type Output = Branch;

    fn neg(self) -> Branch {
        match self {
            Branch::Plus => Branch::Minus,
            Branch::Minus => Branch::Plus,
            other => other,
        }
    }
}

/// Position of the supporting-line intersection along a segment.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Position {
    Before,
    Within,
    After,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Kind {
    /// Perpendicular bisector of two points: `origin ± √(r²−rmin²)·tangent`.
    PointPoint,
    /// Point/segment parabola: `origin + r·normal ± √(r−rmin)·tangent`.
    Parabola,
    /// Point on a segment endpoint: the straight half-line pair
    /// `origin ± r·tangent`, `rmin = 0`.
    Degenerate,
    /// Two non-parallel segments: `origin + r·tangent` (+) and
    /// `origin + r·normal` (−).
    HalfLines,
    /// Two parallel supporting lines: the strip midline; branches collapse.
    Parallel,
}

/// The parametrized bisector of two sites.
#[derive(Clone, Copy, Debug)]
pub struct Separator<T: VoronoiFloat> {
    kind: Kind,
    origin: Coord<T>,
    tangent: Coord<T>,
    normal: Coord<T>,
    rmin: T,
}

impl<T: VoronoiFloat> Separator<T> {
    /// Bisector of two distinct points.
    pub fn of_points(a: Coord<T>, b: Coord<T>) -> Self {
        let half = T::from(0.5).unwrap();
        let ab = b - a;
        let tangent = ab.left().try_normalize().expect("coincident point sites");
        Separator {
            kind: Kind::PointPoint,
            origin: (a + b) * half,
            tangent,
            normal: Coord::zero(),
            rmin: ab.magnitude() * half,
        }
    }

    /// Bisector of a segment (first site) and a point (second site).
    ///
    /// A point strictly inside the segment is invalid input. A point on the
    /// supporting line but not inside — an endpoint, or collinear beyond the
    /// segment — yields the degenerate perpendicular half-line pair through
    /// it; anything else yields a parabola arc with the segment's supporting
    /// line as directrix and the point as focus.
    pub fn of_segment_point(seg: Line<T>, p: Coord<T>) -> Result<Self> {
        let u = (seg.end - seg.start)
            .try_normalize()
            .expect("zero-length segment site");
        let n = u.left();
        let sd = n.dot_product(p - seg.start);
        if sd.is_zero() {
            let t = seg_param(seg.start, seg.end, p);
            if t > T::zero() && t < T::one() {
                return Err(GeometryError::PointInSegment);
            }
            // direction from p towards the segment body
            let w = if t < T::from(0.5).unwrap() { u } else { -u };
            return Ok(Separator {
                kind: Kind::Degenerate,
                origin: p,
                tangent: w.right(),
                normal: Coord::zero(),
                rmin: T::zero(),
            });
        }
        let two = T::one() + T::one();
        let h = sd.abs();
        let normal = if sd > T::zero() { n } else { -n };
        Ok(Separator {
            kind: Kind::Parabola,
            origin: p - normal * h,
            tangent: normal.left() * (two * h).sqrt(),
            normal,
            rmin: h / two,
        })
    }

    /// Bisector of two segments.
    ///
    /// Parallel supporting lines give the strip-midline variant; otherwise a
    /// half-line pair rooted at the line intersection, with the branch rays
    /// picked from the quadrants facing the two segment bodies.
    pub fn of_segments(s1: Line<T>, s2: Line<T>) -> Result<Self> {
        let u1 = (s1.end - s1.start)
            .try_normalize()
            .expect("zero-length segment site");
        let u2 = (s2.end - s2.start)
            .try_normalize()
            .expect("zero-length segment site");
        let n1 = u1.left();
        let n2 = u2.left();

        if u1.wedge_product(u2).is_zero() {
            let two = T::one() + T::one();
            let gap = n1.dot_product(s2.start - s1.start);
            // coincident supporting lines are only meaningful for the two
            // oriented halves of one split segment; other collinear pairs
            // would need a branch resolution that is deliberately left open
            let split_pair = s1.start == s2.end && s1.end == s2.start;
            if gap.is_zero() && !split_pair {
                return Err(GeometryError::NotImplemented("collinear segment sites"));
            }
            let nan = T::nan();
            return Ok(Separator {
                kind: Kind::Parallel,
                origin: s1.start + n1 * (gap / two),
                tangent: u1,
                normal: Coord { x: nan, y: nan },
                rmin: gap.abs() / two,
            });
        }

        segments_position(s1, s2)?;
        let origin = line_inter(s1.start, s1.end, s2.start, s2.end)?;
        let (d1, d2) = segments_quadrants(s1, s2, origin, n1, n2);
        let dd = d1 * d2;
        let v = (n1 * d1 + n2 * d2) / (T::one() + dd * n1.dot_product(n2));
        // the sign test is antisymmetric in the naming order, so reversing
        // the separator equals rebuilding it with the sites swapped
        let w = n1 * d1 - n2 * d2;
        let tangent = if v.wedge_product(w) < T::zero() { v } else { -v };
        Ok(Separator {
            kind: Kind::HalfLines,
            origin,
            tangent,
            normal: -tangent,
            rmin: T::zero(),
        })
    }

    /// The same separator with its two sites named in the other order;
    /// branches swap.
    pub fn reverse(self) -> Self {
        match self.kind {
            Kind::HalfLines => Separator {
                tangent: self.normal,
                normal: self.tangent,
                ..self
            },
            _ => Separator {
                tangent: -self.tangent,
                ..self
            },
        }
    }

    /// Smallest distance realized on the separator.
    pub fn rmin(&self) -> T {
        self.rmin
    }

    pub fn is_parallel(&self) -> bool {
        self.kind == Kind::Parallel
    }

    /// `true` when branches are straight lines (everything but the parabola).
    pub fn is_straight(&self) -> bool {
        self.kind != Kind::Parabola
    }

    /// The point at distance `r` from both sites on branch `b`.
    pub fn evaluate(&self, b: Branch, r: T) -> Coord<T> {
        let s: T = b.factor();
        match self.kind {
            Kind::PointPoint | Kind::Parallel => {
                debug_assert!(r >= self.rmin - self.slack(r));
                let d = (r * r - self.rmin * self.rmin).max(T::zero()).sqrt();
                self.origin + self.tangent * (s * d)
            }
            Kind::Parabola => {
                debug_assert!(r >= self.rmin - self.slack(r));
                let d = (r - self.rmin).max(T::zero()).sqrt();
                self.origin + self.normal * r + self.tangent * (s * d)
            }
            Kind::Degenerate => self.origin + self.tangent * (s * r),
            Kind::HalfLines => {
                debug_assert!(b == Branch::Plus || b == Branch::Minus);
                let ray = if b == Branch::Plus {
                    self.tangent
                } else {
                    self.normal
                };
                self.origin + ray * r
            }
        }
    }

    /// Radii subdividing the branch-`b` arc between `r1` and `r2` so that the
    /// polyline through the evaluated points has Hausdorff error below `tol`.
    /// Straight separators need no interior samples.
    pub fn approximate(&self, b: Branch, r1: T, r2: T, tol: T) -> Vec<T> {
        if self.kind != Kind::Parabola {
            return vec![r1, r2];
        }
        let s: T = b.factor();
        let scale = self.tangent.magnitude();
        let a = self.rmin + self.rmin;
        let x1 = s * (r1 - self.rmin).max(T::zero()).sqrt() * scale;
        let x2 = s * (r2 - self.rmin).max(T::zero()).sqrt() * scale;
        approx_parabola(a, x1, x2, tol)
            .into_iter()
            .map(|x| self.rmin + (x / scale) * (x / scale))
            .collect()
    }

    /// Angle of the initial normal (the apex direction for a parabola); falls
    /// back to the tangent's angle for separators without a normal.
    pub fn atan(&self) -> T {
        let v = if self.normal.magnitude_squared().is_zero() || self.normal.x.is_nan() {
            self.tangent
        } else {
            self.normal
        };
        v.y.atan2(v.x)
    }

    /// Classify a point known to lie on the separator onto a branch.
    /// Perigee ties resolve to `Plus`.
    pub fn which_branch(&self, p: Coord<T>) -> Branch {
        match self.kind {
            Kind::Parallel => Branch::Zero,
            _ => Branch::from_sign(self.tangent.dot_product(p - self.origin)),
        }
    }

    // comparison slack proportional to the local scale
    fn slack(&self, r: T) -> T {
        let scale = self.origin.magnitude() + self.rmin.abs() + r.abs() + T::one();
        T::from(1e-6).unwrap() * scale
    }
}

/// Where the supporting-line intersection of two non-parallel segments falls
/// along each of them. `(Within, Within)` means the segments cross in their
/// interiors, which is invalid input.
pub fn segments_position<T: VoronoiFloat>(s1: Line<T>, s2: Line<T>) -> Result<(Position, Position)> {
    let x0 = line_inter(s1.start, s1.end, s2.start, s2.end)?;
    let p1 = classify(seg_param(s1.start, s1.end, x0));
    let p2 = classify(seg_param(s2.start, s2.end, x0));
    if p1 == Position::Within && p2 == Position::Within {
        return Err(GeometryError::CrossingSegments);
    }
    Ok((p1, p2))
}

fn classify<T: VoronoiFloat>(t: T) -> Position {
    // endpoints attach outward so that segments sharing a corner never
    // register as crossing
    let eps = T::from(1e-12).unwrap();
    if t <= eps {
        Position::Before
    } else if t >= T::one() - eps {
        Position::After
    } else {
        Position::Within
    }
}

/// Signs `(δ1, δ2)` of the quadrant at the line intersection that faces both
/// segment bodies: the `+` branch of their separator lives in it, the `−`
/// branch in the opposite one.
fn segments_quadrants<T: VoronoiFloat>(
    s1: Line<T>,
    s2: Line<T>,
    origin: Coord<T>,
    n1: Coord<T>,
    n2: Coord<T>,
) -> (T, T) {
    let (p1, p2) = closest_points(s1, s2);
    let d = p2 - p1;
    let mut d1 = n1.dot_product(d);
    let mut d2 = n2.dot_product(-d);
    if d1.is_zero() || d2.is_zero() {
        // shared endpoint (or a touching tip): take the interior-angle
        // quadrant spanned by the far endpoints
        d1 = n1.dot_product(far_endpoint(s2, origin) - origin);
        d2 = n2.dot_product(far_endpoint(s1, origin) - origin);
    }
    (d1.signum(), d2.signum())
}

fn far_endpoint<T: VoronoiFloat>(s: Line<T>, from: Coord<T>) -> Coord<T> {
    if (s.start - from).magnitude_squared() >= (s.end - from).magnitude_squared() {
        s.start
    } else {
        s.end
    }
}

/// Closest pair of points between two non-crossing segments. For such
/// segments the minimum is always attained at an endpoint of one of them.
fn closest_points<T: VoronoiFloat>(s1: Line<T>, s2: Line<T>) -> (Coord<T>, Coord<T>) {
    let clamp = |s: Line<T>, c: Coord<T>| {
        let t = seg_param(s.start, s.end, c).max(T::zero()).min(T::one());
        s.start + (s.end - s.start) * t
    };
    let mut best: Option<(T, Coord<T>, Coord<T>)> = None;
    for (a, b) in [
        (clamp(s1, s2.start), s2.start),
        (clamp(s1, s2.end), s2.end),
        (s1.start, clamp(s2, s1.start)),
        (s1.end, clamp(s2, s1.end)),
    ] {
        let d = (b - a).magnitude_squared();
        if best.map_or(true, |(bd, _, _)| d < bd) {
            best = Some((d, a, b));
        }
    }
    let (_, a, b) = best.unwrap();
    (a, b)
}
