//! The equidistant point of three cyclically-ordered sites.
//!
//! `tripoint(c1, c2, c3)` returns the radius and position of the point at
//! equal distance from the three sites, together with the branch each
//! pairwise separator realizes there. The input order is cyclic:
//! `tripoint(a, b, c) == tripoint(b, c, a)`, while the reversed order names a
//! different (usually nonexistent) vertex. When no valid tripoint exists the
//! sentinel with `NaN` radius and `Bad` branches is returned.
//!
//! One routine per type combination; the caller's triple is rotated into the
//! routine's canonical order and the branch triple rotated back. Candidates
//! from the closed forms are screened geometrically: distances must agree,
//! segment feet must fall inside their slab, oriented (split) segment sites
//! must see the point on their owned side, and the three sites must appear
//! counter-clockwise around the candidate.

use geo_types::Coord;

use crate::diagram::Site;
use crate::error::Result;
use crate::kernel::{line_inter, seg_param, VectorOps};
use crate::separator::{Branch, Separator};
use crate::VoronoiFloat;

/// A solved (or failed) equidistant point.
#[derive(Clone, Copy, Debug)]
pub struct Tripoint<T: VoronoiFloat> {
    /// The equidistant point itself.
    pub pos: Coord<T>,
    /// Common distance from `pos` to the three sites.
    pub r: T,
    /// `branches[i]` is the branch of `separator(cᵢ, cᵢ₊₁)` through `pos`.
    pub branches: [Branch; 3],
}

impl<T: VoronoiFloat> Tripoint<T> {
    /// The "no valid tripoint" sentinel.
    pub fn bad() -> Self {
        Tripoint {
            pos: Coord {
                x: T::nan(),
                y: T::nan(),
            },
            r: T::nan(),
            branches: [Branch::Bad; 3],
        }
    }

    pub fn is_bad(&self) -> bool {
        self.r.is_nan()
    }
}

/// The separator of two sites, named in argument order.
pub(crate) fn site_separator<T: VoronoiFloat>(a: Site<T>, b: Site<T>) -> Result<Separator<T>> {
    match (a, b) {
        (Site::Point(pa), Site::Point(pb)) => Ok(Separator::of_points(pa, pb)),
        (Site::Segment { line, .. }, Site::Point(pb)) => Separator::of_segment_point(line, pb),
        (Site::Point(pa), Site::Segment { line, .. }) => {
            Separator::of_segment_point(line, pa).map(Separator::reverse)
        }
        (Site::Segment { line: la, .. }, Site::Segment { line: lb, .. }) => {
            Separator::of_segments(la, lb)
        }
    }
}

/// Distance from `p` to the site, under slab semantics for segments
/// (supporting-line distance; the slab test itself lives in `validate`).
fn site_line_distance<T: VoronoiFloat>(site: Site<T>, p: Coord<T>) -> T {
    match site {
        Site::Point(q) => (p - q).magnitude(),
        Site::Segment { line, .. } => {
            let u = (line.end - line.start).try_normalize().unwrap();
            u.left().dot_product(p - line.start).abs()
        }
    }
}

/// Nearest point of the site to `p` (the segment foot is clamped).
fn site_foot<T: VoronoiFloat>(site: Site<T>, p: Coord<T>) -> Coord<T> {
    match site {
        Site::Point(q) => q,
        Site::Segment { line, .. } => {
            let t = seg_param(line.start, line.end, p)
                .max(T::zero())
                .min(T::one());
            line.start + (line.end - line.start) * t
        }
    }
}

fn tau<T: VoronoiFloat>() -> T {
    T::PI() + T::PI()
}

/// Screen a candidate equidistant point and, if it survives, read the three
/// branch signs off the pairwise separators.
fn validate<T: VoronoiFloat>(sites: [Site<T>; 3], pos: Coord<T>) -> Option<(T, [Branch; 3])> {
    if !pos.x.is_finite() || !pos.y.is_finite() {
        return None;
    }
    let scale = pos.magnitude()
        + sites
            .iter()
            .map(|s| site_foot(*s, pos).magnitude())
            .fold(T::one(), |a, b| a.max(b));
    let tol = T::from(1e-9).unwrap() * scale;

    // distances to all three sites must agree
    let d = [
        site_line_distance(sites[0], pos),
        site_line_distance(sites[1], pos),
        site_line_distance(sites[2], pos),
    ];
    let r = (d[0] + d[1] + d[2]) / T::from(3.0).unwrap();
    if d.iter().any(|&di| (di - r).abs() > tol) {
        return None;
    }

    // slab and ownership checks for segment sites
    for site in sites {
        if let Site::Segment { line, split } = site {
            let t = seg_param(line.start, line.end, pos);
            let len = (line.end - line.start).magnitude();
            let slack = tol / len;
            if t < -slack || t > T::one() + slack {
                return None;
            }
            if split {
                // an oriented half owns the right side of its direction
                let n = (line.end - line.start).try_normalize().unwrap().left();
                if n.dot_product(pos - line.start) > tol {
                    return None;
                }
            }
        }
    }

    // the three sites must wind counter-clockwise around the point
    let mut angles = [T::zero(); 3];
    let mut degenerate = false;
    for (i, site) in sites.iter().enumerate() {
        let v = site_foot(*site, pos) - pos;
        if v.magnitude() <= tol {
            degenerate = true;
            break;
        }
        angles[i] = v.y.atan2(v.x);
    }
    if !degenerate {
        let rel = |a: T| {
            let mut x = a - angles[0];
            while x < T::zero() {
                x = x + tau::<T>();
            }
            while x >= tau::<T>() {
                x = x - tau::<T>();
            }
            x
        };
        // ties happen when two sites touch the same nearest point; either
        // cyclic reading is then acceptable
        let tie = T::from(1e-9).unwrap();
        if rel(angles[1]) > rel(angles[2]) + tie {
            return None;
        }
    }

    // branch of each separator, in the caller's naming order
    let mut branches = [Branch::Bad; 3];
    for i in 0..3 {
        let sep = site_separator(sites[i], sites[(i + 1) % 3]).ok()?;
        branches[i] = sep.which_branch(pos);
    }
    Some((r, branches))
}

fn build<T: VoronoiFloat>(sites: [Site<T>; 3], pos: Coord<T>) -> Option<Tripoint<T>> {
    validate(sites, pos).map(|(r, branches)| Tripoint { pos, r, branches })
}

/// The equidistant point of three cyclically-ordered sites, or the sentinel.
pub fn tripoint<T: VoronoiFloat>(c1: Site<T>, c2: Site<T>, c3: Site<T>) -> Tripoint<T> {
    let sites = [c1, c2, c3];
    let is_seg = |s: &Site<T>| matches!(s, Site::Segment { .. });
    let nsegs = sites.iter().filter(|s| is_seg(s)).count();

    // rotate the triple into the canonical order of the routine
    let rot = match nsegs {
        0 | 3 => 0,
        1 => (0..3).find(|&k| is_seg(&sites[k])).unwrap(),
        2 => (0..3).find(|&k| !is_seg(&sites[(k + 2) % 3])).unwrap(),
        _ => unreachable!(),
    };
    let canon = [sites[rot], sites[(rot + 1) % 3], sites[(rot + 2) % 3]];

    let solved = match nsegs {
        0 => ppp(canon),
        1 => lpp(canon),
        2 => llp(canon),
        _ => lll(canon),
    };

    match solved {
        Some(mut tp) => {
            // canonical pair j is the caller's pair (j + rot) mod 3
            let mut branches = [Branch::Bad; 3];
            for j in 0..3 {
                branches[(j + rot) % 3] = tp.branches[j];
            }
            tp.branches = branches;
            tp
        }
        None => Tripoint::bad(),
    }
}

fn coords<T: VoronoiFloat>(s: Site<T>) -> Option<Coord<T>> {
    match s {
        Site::Point(p) => Some(p),
        Site::Segment { .. } => None,
    }
}

/// Three points: the circumcenter of a positively-oriented triangle.
fn ppp<T: VoronoiFloat>(sites: [Site<T>; 3]) -> Option<Tripoint<T>> {
    let (p1, p2, p3) = (
        coords(sites[0]).unwrap(),
        coords(sites[1]).unwrap(),
        coords(sites[2]).unwrap(),
    );
    if !crate::kernel::is_ccw(p1, p2, p3) {
        return None;
    }
    let cc = crate::kernel::circumcenter(p1, p2, p3)?;
    build(sites, cc)
}

/// Segment, point, point, reduced to the frame where the segment runs along
/// the x-axis.
fn lpp<T: VoronoiFloat>(sites: [Site<T>; 3]) -> Option<Tripoint<T>> {
    let line = match sites[0] {
        Site::Segment { line, .. } => line,
        _ => unreachable!(),
    };
    let p2 = coords(sites[1]).unwrap();
    let p3 = coords(sites[2]).unwrap();

    let o = line.start;
    let u = (line.end - line.start).try_normalize()?;
    let mut n = u.left();
    let (x2, mut y2) = ((p2 - o).dot_product(u), (p2 - o).dot_product(n));
    let (x3, mut y3) = ((p3 - o).dot_product(u), (p3 - o).dot_product(n));

    // a point on the supporting line: the separator is the perpendicular
    // through it and the tripoint sits on that perpendicular
    if y2.is_zero() || y3.is_zero() {
        if y2.is_zero() && y3.is_zero() {
            return None;
        }
        let (pp, pq) = if y2.is_zero() { (p2, p3) } else { (p3, p2) };
        let yq = n.dot_product(pq - pp);
        if yq.is_zero() {
            return None;
        }
        let t = (pq - pp).magnitude_squared() / (yq + yq);
        return build(sites, pp + n * t);
    }

    if (y2 > T::zero()) != (y3 > T::zero()) {
        return None;
    }
    if y2 < T::zero() {
        n = -n;
        y2 = -y2;
        y3 = -y3;
    }

    let two = T::one() + T::one();
    let mut candidates: [Option<T>; 2] = [None, None];
    if y2 == y3 {
        candidates[0] = Some((x2 + x3) / two);
    } else {
        // y3·((ξ−x2)² + y2²) = y2·((ξ−x3)² + y3²), quadratic in ξ
        let a = y3 - y2;
        let b = -(x2 * y3 - x3 * y2);
        let c = x2 * x2 * y3 - x3 * x3 * y2 + y2 * y3 * (y2 - y3);
        let disc = b * b - a * c;
        if disc < T::zero() {
            return None;
        }
        let root = disc.sqrt();
        candidates[0] = Some((-b + root) / a);
        candidates[1] = Some((-b - root) / a);
    }

    for xi in candidates.into_iter().flatten() {
        let eta = ((xi - x2) * (xi - x2) + y2 * y2) / (y2 + y2);
        let pos = o + u * xi + n * eta;
        if let Some(tp) = build(sites, pos) {
            return Some(tp);
        }
    }
    None
}

/// Segment, segment, point: candidates on the bisector rays of the two
/// supporting lines, intersected with the parabolic locus around the point.
fn llp<T: VoronoiFloat>(sites: [Site<T>; 3]) -> Option<Tripoint<T>> {
    let (l1, l2) = match (sites[0], sites[1]) {
        (Site::Segment { line: l1, .. }, Site::Segment { line: l2, .. }) => (l1, l2),
        _ => unreachable!(),
    };
    let p3 = coords(sites[2]).unwrap();

    let u1 = (l1.end - l1.start).try_normalize()?;
    let u2 = (l2.end - l2.start).try_normalize()?;
    let n1 = u1.left();
    let n2 = u2.left();

    if u1.wedge_product(u2).is_zero() {
        // parallel supporting lines: the tripoint, if any, is on the strip
        // midline at the fixed half-gap radius
        let two = T::one() + T::one();
        let gap = n1.dot_product(l2.start - l1.start);
        if gap.is_zero() {
            return None;
        }
        let rmin = gap.abs() / two;
        let om = l1.start + n1 * (gap / two);
        let w = om - p3;
        let b = u1.dot_product(w);
        let c = w.magnitude_squared() - rmin * rmin;
        let disc = b * b - c;
        if disc < T::zero() {
            return None;
        }
        for s in [T::one(), -T::one()] {
            let t = -b + s * disc.sqrt();
            if let Some(tp) = build(sites, om + u1 * t) {
                return Some(tp);
            }
        }
        return None;
    }

    let x0 = line_inter(l1.start, l1.end, l2.start, l2.end).ok()?;
    for (d1, d2) in [
        (T::one(), T::one()),
        (T::one(), -T::one()),
        (-T::one(), T::one()),
        (-T::one(), -T::one()),
    ] {
        let v = (n1 * d1 + n2 * d2) / (T::one() + d1 * d2 * n1.dot_product(n2));
        let a = v.magnitude_squared() - T::one();
        if a.is_zero() {
            continue;
        }
        let b = v.dot_product(x0 - p3);
        let c = (x0 - p3).magnitude_squared();
        let disc = b * b - a * c;
        if disc < T::zero() {
            continue;
        }
        for s in [-T::one(), T::one()] {
            let t = (-b + s * disc.sqrt()) / a;
            if t < T::zero() {
                continue;
            }
            if let Some(tp) = build(sites, x0 + v * t) {
                return Some(tp);
            }
        }
    }
    None
}

/// Three segments: the in- or excenter of the triangle their supporting
/// lines cut out, found by scanning the quadrant sign triples.
fn lll<T: VoronoiFloat>(sites: [Site<T>; 3]) -> Option<Tripoint<T>> {
    let lines = sites.map(|s| match s {
        Site::Segment { line, .. } => line,
        _ => unreachable!(),
    });
    let dirs: Vec<_> = lines
        .iter()
        .map(|l| (l.end - l.start).try_normalize().unwrap())
        .collect();
    let norms: Vec<_> = dirs.iter().map(|u| u.left()).collect();

    // parallel pair: the tripoint sits on the pair's midline where the third
    // line reaches the half-gap distance
    for i in 0..3 {
        let j = (i + 1) % 3;
        let k = (i + 2) % 3;
        if dirs[i].wedge_product(dirs[j]).is_zero() {
            if dirs[i].wedge_product(dirs[k]).is_zero() {
                return None;
            }
            let two = T::one() + T::one();
            let gap = norms[i].dot_product(lines[j].start - lines[i].start);
            if gap.is_zero() {
                return None;
            }
            let rmin = gap.abs() / two;
            let om = lines[i].start + norms[i] * (gap / two);
            let den = norms[k].dot_product(dirs[i]);
            for s in [T::one(), -T::one()] {
                let t = (s * rmin - norms[k].dot_product(om - lines[k].start)) / den;
                if let Some(tp) = build(sites, om + dirs[i] * t) {
                    return Some(tp);
                }
            }
            return None;
        }
    }

    for bits in 0..8u8 {
        let d: Vec<T> = (0..3)
            .map(|i| {
                if bits & (1 << i) == 0 {
                    T::one()
                } else {
                    -T::one()
                }
            })
            .collect();
        // δ1·d(x, l1) = δ2·d(x, l2) = δ3·d(x, l3), two linear equations
        let w12 = norms[0] * d[0] - norms[1] * d[1];
        let w13 = norms[0] * d[0] - norms[2] * d[2];
        let rhs12 = d[0] * norms[0].dot_product(lines[0].start)
            - d[1] * norms[1].dot_product(lines[1].start);
        let rhs13 = d[0] * norms[0].dot_product(lines[0].start)
            - d[2] * norms[2].dot_product(lines[2].start);
        let det = w12.wedge_product(w13);
        if det.is_zero() {
            continue;
        }
        let pos = Coord {
            x: (rhs12 * w13.y - rhs13 * w12.y) / det,
            y: (rhs13 * w12.x - rhs12 * w13.x) / det,
        };
        let r = d[0] * norms[0].dot_product(pos - lines[0].start);
        if r <= T::zero() {
            continue;
        }
        if let Some(tp) = build(sites, pos) {
            return Some(tp);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, Line};

    fn pt(x: f64, y: f64) -> Site<f64> {
        Site::Point(coord! { x: x, y: y })
    }

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> Site<f64> {
        Site::Segment {
            line: Line::new(coord! { x: ax, y: ay }, coord! { x: bx, y: by }),
            split: false,
        }
    }

    /// Property 4: the three separators evaluated at their branch and the
    /// common radius must reproduce the tripoint.
    fn assert_consistent(sites: [Site<f64>; 3], tp: &Tripoint<f64>) {
        for i in 0..3 {
            let sep = site_separator(sites[i], sites[(i + 1) % 3]).unwrap();
            if tp.branches[i] == Branch::Zero {
                continue;
            }
            let p = sep.evaluate(tp.branches[i], tp.r);
            assert_relative_eq!(p.x, tp.pos.x, max_relative = 1e-9, epsilon = 1e-9);
            assert_relative_eq!(p.y, tp.pos.y, max_relative = 1e-9, epsilon = 1e-9);
        }
    }

    #[test]
    fn equilateral_triangle() {
        let h = 3f64.sqrt() / 2.0;
        let sites = [pt(0.0, 0.0), pt(1.0, 0.0), pt(0.5, h)];
        let tp = tripoint(sites[0], sites[1], sites[2]);
        assert!(!tp.is_bad());
        assert_relative_eq!(tp.r, 1.0 / 3f64.sqrt(), max_relative = 1e-12);
        assert_eq!(tp.branches, [Branch::Plus; 3]);
        assert_consistent(sites, &tp);
    }

    #[test]
    fn reversed_triangle_is_bad() {
        let h = 3f64.sqrt() / 2.0;
        assert!(tripoint(pt(0.5, h), pt(1.0, 0.0), pt(0.0, 0.0)).is_bad());
    }

    #[test]
    fn cyclic_rotation_agrees() {
        let sites = [pt(0.0, 0.0), pt(4.0, 1.0), pt(1.0, 3.0)];
        let a = tripoint(sites[0], sites[1], sites[2]);
        let b = tripoint(sites[1], sites[2], sites[0]);
        assert!(!a.is_bad() && !b.is_bad());
        assert_relative_eq!(a.r, b.r, max_relative = 1e-12);
        assert_relative_eq!(a.pos.x, b.pos.x, max_relative = 1e-12);
        // pair (c2, c3) is pair 0 of the rotated call
        assert_eq!(a.branches[1], b.branches[0]);
        assert_eq!(a.branches[2], b.branches[1]);
        assert_eq!(a.branches[0], b.branches[2]);
    }

    #[test]
    fn segment_and_two_points() {
        let s = seg(0.0, 0.0, 10.0, 0.0);
        let sites = [s, pt(6.0, 2.0), pt(2.0, 2.0)];
        let tp = tripoint(sites[0], sites[1], sites[2]);
        assert!(!tp.is_bad());
        assert_relative_eq!(tp.r, 2.0, max_relative = 1e-12);
        assert_relative_eq!(tp.pos.x, 4.0, max_relative = 1e-12);
        assert_relative_eq!(tp.pos.y, 2.0, max_relative = 1e-12);
        assert_consistent(sites, &tp);
        // the mirrored order has no vertex
        assert!(tripoint(sites[0], sites[2], sites[1]).is_bad());
    }

    #[test]
    fn segment_with_unequal_point_heights() {
        let s = seg(0.0, 0.0, 10.0, 0.0);
        let sites = [s, pt(7.0, 3.0), pt(2.0, 1.0)];
        let tp = tripoint(sites[0], sites[1], sites[2]);
        assert!(!tp.is_bad());
        // equidistance holds by construction of the quadratic
        assert_relative_eq!(tp.pos.y, tp.r, max_relative = 1e-9);
        assert_relative_eq!(
            (tp.pos - coord! { x: 7.0, y: 3.0 }).magnitude(),
            tp.r,
            max_relative = 1e-9
        );
        assert_consistent(sites, &tp);
    }

    #[test]
    fn point_on_segment_endpoint() {
        let s = seg(0.0, 0.0, 10.0, 0.0);
        let sites = [s, pt(3.0, 4.0), pt(0.0, 0.0)];
        // the tripoint must lie on the perpendicular at the shared endpoint
        let tp = tripoint(sites[0], sites[2], sites[1]);
        let tp = if tp.is_bad() {
            tripoint(sites[0], sites[1], sites[2])
        } else {
            tp
        };
        assert!(!tp.is_bad());
        assert_relative_eq!(tp.pos.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(tp.pos.y.abs(), tp.r, max_relative = 1e-9);
    }

    #[test]
    fn two_segments_and_a_point() {
        let s1 = seg(0.0, 0.0, 10.0, 0.0);
        let s2 = seg(0.0, 10.0, 0.0, 0.0);
        let p = pt(4.0, 4.0);
        let sites = [s2, s1, p];
        let tp = tripoint(sites[0], sites[1], sites[2]);
        assert!(!tp.is_bad());
        assert_relative_eq!(tp.r, 8.0 - 32f64.sqrt(), max_relative = 1e-9);
        assert_relative_eq!(tp.pos.x, tp.pos.y, max_relative = 1e-9);
        assert_consistent(sites, &tp);
    }

    #[test]
    fn three_segments_incenter() {
        // 6-8-10 right triangle
        let ab = seg(0.0, 0.0, 8.0, 0.0);
        let bc = seg(8.0, 0.0, 8.0, 6.0);
        let ca = seg(8.0, 6.0, 0.0, 0.0);
        let sites = [ab, bc, ca];
        let tp = tripoint(sites[0], sites[1], sites[2]);
        assert!(!tp.is_bad());
        assert_relative_eq!(tp.r, 2.0, max_relative = 1e-9);
        assert_relative_eq!(tp.pos.x, 6.0, max_relative = 1e-9);
        assert_relative_eq!(tp.pos.y, 2.0, max_relative = 1e-9);
        assert_consistent(sites, &tp);
    }

    #[test]
    fn points_on_opposite_sides_of_segment() {
        let s = seg(0.0, 0.0, 10.0, 0.0);
        assert!(tripoint(s, pt(5.0, 2.0), pt(5.0, -2.0)).is_bad());
    }

    #[test]
    fn collinear_split_halves_are_sentinel() {
        let a = Site::Segment {
            line: Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }),
            split: true,
        };
        let b = Site::Segment {
            line: Line::new(coord! { x: 10.0, y: 0.0 }, coord! { x: 0.0, y: 0.0 }),
            split: true,
        };
        assert!(tripoint(a, b, pt(5.0, 3.0)).is_bad());
    }
}
