//! Axial extrusion: sweeping a closed `(r, z)` profile along a trajectory.
//!
//! Every profile vertex becomes the offset chain of the trajectory at its
//! (signed) radius, lifted to its height. Profile edges at constant radius
//! connect two such chains with quadrilaterals; slanted edges are built cell
//! by cell along the inner chain, each face bounded by the inner arc, the
//! outer arc and transverse slices sampled along the separators, then
//! ear-cut into triangles.

use std::collections::HashMap;

use geo_types::{Coord, LineString};
use num_traits::NumCast;

use crate::error::Result;
use crate::kernel::VectorOps;
use crate::offset::{Crossing, OffsetDiagram, Step};
use crate::separator::Branch;
use crate::VoronoiFloat;

/// An indexed triangle mesh produced by [`extrude`].
#[derive(Clone, Debug, Default)]
pub struct ExtrudedMesh<T: VoronoiFloat> {
    pub positions: Vec<[T; 3]>,
    pub triangles: Vec<[usize; 3]>,
}

impl<T: VoronoiFloat> ExtrudedMesh<T> {
    /// Total surface area, for sanity checks and tests.
    pub fn area(&self) -> T {
        let mut sum = T::zero();
        let two = T::one() + T::one();
        for t in &self.triangles {
            let [a, b, c] = t.map(|i| self.positions[i]);
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let n = [
                u[1] * v[2] - u[2] * v[1],
                u[2] * v[0] - u[0] * v[2],
                u[0] * v[1] - u[1] * v[0],
            ];
            sum = sum + (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() / two;
        }
        sum
    }
}

struct MeshBuilder<T: VoronoiFloat> {
    mesh: ExtrudedMesh<T>,
    dedup: HashMap<(u64, u64, u64), usize>,
}

impl<T: VoronoiFloat> MeshBuilder<T> {
    fn new() -> Self {
        MeshBuilder {
            mesh: ExtrudedMesh {
                positions: Vec::new(),
                triangles: Vec::new(),
            },
            dedup: HashMap::new(),
        }
    }

    fn vertex(&mut self, p: [T; 3]) -> usize {
        let key = (
            <f64 as NumCast>::from(p[0]).unwrap().to_bits(),
            <f64 as NumCast>::from(p[1]).unwrap().to_bits(),
            <f64 as NumCast>::from(p[2]).unwrap().to_bits(),
        );
        if let Some(&i) = self.dedup.get(&key) {
            return i;
        }
        self.mesh.positions.push(p);
        let i = self.mesh.positions.len() - 1;
        self.dedup.insert(key, i);
        i
    }

    fn triangle(&mut self, a: usize, b: usize, c: usize) {
        if a != b && b != c && a != c {
            self.mesh.triangles.push([a, b, c]);
        }
    }

    /// Ear-cut a simple planar ring of `(x, y, z)` vertices (the `z` rides
    /// along; triangulation happens in the plane).
    fn polygon(&mut self, ring: &[[T; 3]]) {
        if ring.len() < 3 {
            return;
        }
        let flat: Vec<f64> = ring
            .iter()
            .flat_map(|p| {
                [
                    <f64 as NumCast>::from(p[0]).unwrap(),
                    <f64 as NumCast>::from(p[1]).unwrap(),
                ]
            })
            .collect();
        let Ok(indices) = earcutr::earcut(&flat, &Vec::new(), 2) else {
            return;
        };
        let verts: Vec<usize> = ring.iter().map(|p| self.vertex(*p)).collect();
        for tri in indices.chunks_exact(3) {
            self.triangle(verts[tri[0]], verts[tri[1]], verts[tri[2]]);
        }
    }
}

/// One profile vertex after radius-zero splitting.
#[derive(Clone, Copy, Debug)]
struct ProfileVertex<T> {
    r: T,
    z: T,
}

/// Insert a vertex wherever an edge of the closed loop crosses `r = 0`, so
/// that every edge lies in one half-plane.
fn split_profile<T: VoronoiFloat>(profile: &LineString<T>) -> Vec<ProfileVertex<T>> {
    let mut coords: Vec<Coord<T>> = profile.0.clone();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    let n = coords.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let p = coords[i];
        let q = coords[(i + 1) % n];
        out.push(ProfileVertex { r: p.x, z: p.y });
        if (p.x > T::zero() && q.x < T::zero()) || (p.x < T::zero() && q.x > T::zero()) {
            let t = p.x / (p.x - q.x);
            out.push(ProfileVertex {
                r: T::zero(),
                z: p.y + (q.y - p.y) * t,
            });
        }
    }
    out
}

/// Sweep the closed `profile` loops (coordinates are `(r, z)`) along the
/// trajectory `(points, segments)`. Returns one mesh per profile loop.
pub fn extrude<T: VoronoiFloat>(
    points: &[Coord<T>],
    segments: &[[usize; 2]],
    profiles: &[LineString<T>],
    atol: T,
) -> Result<Vec<ExtrudedMesh<T>>> {
    let headroom = profiles
        .iter()
        .flat_map(|p| p.0.iter())
        .fold(T::one(), |acc, c| acc.max(c.x.abs() + T::one()));
    let od = OffsetDiagram::new(points, segments, headroom)?;

    let mut meshes = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let verts = split_profile(profile);
        let mut builder = MeshBuilder::new();
        let n = verts.len();
        for i in 0..n {
            let p = verts[i];
            let q = verts[(i + 1) % n];
            if p.r == q.r {
                ring_faces(&od, &mut builder, p, q, atol);
            } else {
                band_faces(&od, &mut builder, p, q, atol);
            }
        }
        debug!(
            "extruded loop: {} vertices, {} triangles",
            builder.mesh.positions.len(),
            builder.mesh.triangles.len()
        );
        meshes.push(builder.mesh);
    }
    Ok(meshes)
}

/// A profile edge at constant radius: connect the two identical chains at
/// their two heights with quadrilaterals.
fn ring_faces<T: VoronoiFloat>(
    od: &OffsetDiagram<T>,
    builder: &mut MeshBuilder<T>,
    p: ProfileVertex<T>,
    q: ProfileVertex<T>,
    atol: T,
) {
    for chain in od.chains(p.r, atol) {
        for w in chain.line.0.windows(2) {
            let v0 = builder.vertex([w[0].x, w[0].y, p.z]);
            let v1 = builder.vertex([w[1].x, w[1].y, p.z]);
            let v2 = builder.vertex([w[1].x, w[1].y, q.z]);
            let v3 = builder.vertex([w[0].x, w[0].y, q.z]);
            builder.triangle(v0, v1, v2);
            builder.triangle(v0, v2, v3);
        }
    }
}

/// A slanted profile edge: one face polygon per cell crossed by the inner
/// chain, bounded by the inner arc, the outer arc (when the outer level
/// still reaches the cell) and transverse separator slices.
fn band_faces<T: VoronoiFloat>(
    od: &OffsetDiagram<T>,
    builder: &mut MeshBuilder<T>,
    p: ProfileVertex<T>,
    q: ProfileVertex<T>,
    atol: T,
) {
    // orient so the band grows outward: 0 ≤ d1 < d2
    let (inner, outer) = if p.r.abs() <= q.r.abs() { (p, q) } else { (q, p) };
    let d1 = inner.r.abs();
    let d2 = outer.r.abs();
    let want_left = inner.r + outer.r < T::zero();
    let aff = |r: T| inner.z + (outer.z - inner.z) * (r - d1) / (d2 - d1);

    for chain in od.chains_side(d1, want_left, atol) {
        for step in &chain.steps {
            if let Some(ring) = band_polygon(od, step, d1, d2, atol) {
                let lifted: Vec<[T; 3]> = ring
                    .into_iter()
                    .map(|(c, r)| [c.x, c.y, aff(r)])
                    .collect();
                builder.polygon(&lifted);
            }
        }
        // a chain with no steps is a free-standing circle: connect it to
        // the nearest outer circle directly
        if chain.steps.is_empty() {
            let inner_line = chain.line;
            let ic = centroid(&inner_line);
            let outer_chains = od.chains_side(d2, want_left, atol);
            if let Some(nearest) = outer_chains.iter().min_by(|a, b| {
                let da = (centroid(&a.line) - ic).magnitude_squared();
                let db = (centroid(&b.line) - ic).magnitude_squared();
                da.partial_cmp(&db).unwrap()
            }) {
                zipper(builder, &inner_line, &nearest.line, inner.z, outer.z);
            }
        }
    }
}

fn centroid<T: VoronoiFloat>(ls: &LineString<T>) -> Coord<T> {
    let n = T::from(ls.0.len().max(1) as f64).unwrap();
    let sum = ls
        .0
        .iter()
        .fold(Coord::zero(), |acc, c| acc + *c);
    sum / n
}

/// Join two closed sampled circles with quads, pairing by index fraction.
fn zipper<T: VoronoiFloat>(
    builder: &mut MeshBuilder<T>,
    a: &LineString<T>,
    b: &LineString<T>,
    za: T,
    zb: T,
) {
    let n = a.0.len().max(b.0.len());
    if n < 2 {
        return;
    }
    let pick = |ls: &LineString<T>, k: usize| {
        let m = ls.0.len();
        ls.0[(k * m) / n.max(1) % m]
    };
    for k in 0..n - 1 {
        let a0 = pick(a, k);
        let a1 = pick(a, k + 1);
        let b0 = pick(b, k);
        let b1 = pick(b, k + 1);
        let v0 = builder.vertex([a0.x, a0.y, za]);
        let v1 = builder.vertex([a1.x, a1.y, za]);
        let v2 = builder.vertex([b1.x, b1.y, zb]);
        let v3 = builder.vertex([b0.x, b0.y, zb]);
        builder.triangle(v0, v1, v2);
        builder.triangle(v0, v2, v3);
    }
}

enum ClimbEnd<T: VoronoiFloat> {
    /// Reached the outer level on some edge of the ring.
    Outer(Crossing<T>),
    /// Wrapped over the far side of the cell back to the start edge without
    /// ever reaching the outer level (the cell is swallowed by the band).
    Wrapped,
    /// A multi-arc cell; give up on this face.
    Degenerate,
}

/// Walk the region ring of `step.cell` away from a crossing at `d1`,
/// sampling every separator span (a transverse slice) until the boundary
/// either reaches `d2` or wraps around to `stop_edge`.
fn climb<T: VoronoiFloat>(
    od: &OffsetDiagram<T>,
    start: Crossing<T>,
    stop: Crossing<T>,
    d1: T,
    d2: T,
    atol: T,
    ccw: bool,
    out: &mut Vec<(Coord<T>, T)>,
) -> ClimbEnd<T> {
    let d = od.diagram();
    let eps = T::from(1e-9).unwrap() * (T::one() + d2);
    let mut e = start.edge;
    let mut b = start.branch;
    let mut at = d1;
    for _ in 0..10_000 {
        let sep = d.separators[e.index()].unwrap();
        let (b1, b2, r1, r2) = od.span(e);
        let (b_far, r_far) = if ccw { (b2, r2) } else { (b1, r1) };

        let pieces: Vec<(Branch, T, T)> = if b == b_far {
            vec![(b, at, r_far)]
        } else {
            vec![(b, at, sep.rmin()), (b_far, sep.rmin(), r_far)]
        };
        let stopping = e == stop.edge && (e != start.edge || at != d1);
        for (br, ra, rb) in pieces {
            if rb < d1 - eps && !stopping {
                return ClimbEnd::Degenerate;
            }
            if ra <= d2 && d2 <= rb {
                for r in sep.approximate(br, ra, d2, atol) {
                    out.push((sep.evaluate(br, r), r));
                }
                return ClimbEnd::Outer(Crossing {
                    edge: e,
                    branch: br,
                    point: sep.evaluate(br, d2),
                });
            }
            let rb_clamped = if stopping && br == stop.branch {
                rb.max(d1)
            } else {
                rb
            };
            for r in sep.approximate(br, ra, rb_clamped, atol) {
                out.push((sep.evaluate(br, r), r));
            }
            if stopping && br == stop.branch && rb_clamped <= d1 + eps {
                return ClimbEnd::Wrapped;
            }
        }
        let e_next = if ccw {
            d.table.ring_ccw(e)
        } else {
            d.table.ring_cw(e)
        };
        e = e_next;
        let (nb1, nb2, nr1, nr2) = od.span(e);
        if ccw {
            b = nb1;
            at = nr1;
        } else {
            b = nb2;
            at = nr2;
        }
    }
    ClimbEnd::Degenerate
}

/// The boundary of `{d1 ≤ distance ≤ d2} ∩ region(step.cell)` as a planar
/// ring with per-vertex radius, or `None` when the cell configuration is
/// degenerate.
fn band_polygon<T: VoronoiFloat>(
    od: &OffsetDiagram<T>,
    step: &Step<T>,
    d1: T,
    d2: T,
    atol: T,
) -> Option<Vec<(Coord<T>, T)>> {
    let mut ring: Vec<(Coord<T>, T)> = vec![(step.entry.point, d1)];
    let mut inner = vec![step.entry.point];
    od.emit_within(step.cell, step.entry.point, step.exit.point, d1, atol, &mut inner);
    for p in inner.into_iter().skip(1) {
        ring.push((p, d1));
    }
    ring.push((step.exit.point, d1));

    // up the exit side
    let mut up_exit: Vec<(Coord<T>, T)> = Vec::new();
    match climb(od, step.exit, step.entry, d1, d2, atol, true, &mut up_exit) {
        ClimbEnd::Degenerate => return None,
        ClimbEnd::Wrapped => {
            // the cell tops out below the outer level: the climb already
            // traced the whole far boundary back down to the entry crossing
            ring.extend(up_exit);
            dedup_ring(&mut ring);
            return Some(ring);
        }
        ClimbEnd::Outer(out_exit) => {
            ring.extend(up_exit);
            // up the entry side, then reversed: down to the inner entry
            let mut up_entry: Vec<(Coord<T>, T)> = Vec::new();
            let out_entry =
                match climb(od, step.entry, step.exit, d1, d2, atol, false, &mut up_entry) {
                    ClimbEnd::Outer(x) => x,
                    _ => return None,
                };
            // the outer arc between the two outer crossings, reversed
            let mut outer_arc = vec![out_entry.point];
            od.emit_within(step.cell, out_entry.point, out_exit.point, d2, atol, &mut outer_arc);
            outer_arc.push(out_exit.point);
            for p in outer_arc.into_iter().rev().skip(1) {
                ring.push((p, d2));
            }
            for (p, r) in up_entry.into_iter().rev().skip(1) {
                ring.push((p, r));
            }
            dedup_ring(&mut ring);
            Some(ring)
        }
    }
}

fn dedup_ring<T: VoronoiFloat>(ring: &mut Vec<(Coord<T>, T)>) {
    ring.dedup_by(|a, b| {
        (a.0 - b.0).magnitude() <= T::from(1e-12).unwrap() * (T::one() + a.0.magnitude())
    });
    if ring.len() > 1 {
        let first = ring[0];
        let last = *ring.last().unwrap();
        if (first.0 - last.0).magnitude() <= T::from(1e-12).unwrap() * (T::one() + first.0.magnitude())
        {
            ring.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, line_string};

    fn straight_trajectory() -> (Vec<Coord<f64>>, Vec<[usize; 2]>) {
        (
            vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }],
            vec![[0, 1]],
        )
    }

    #[test]
    fn profile_split_inserts_zero_crossings() {
        let profile = line_string![
            (x: -0.5, y: -1.0),
            (x: 1.0, y: -0.5),
            (x: 0.5, y: 1.0),
            (x: -1.0, y: 0.5),
        ];
        let verts = split_profile(&profile);
        assert_eq!(verts.len(), 6);
        let zeros = verts.iter().filter(|v| v.r == 0.0).count();
        assert_eq!(zeros, 2);
    }

    #[test]
    fn constant_radius_profile_makes_a_tube() {
        let (points, segments) = straight_trajectory();
        // a rectangle at constant radii 0.5 and 1.0
        let profile = vec![line_string![
            (x: 0.5, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.5, y: 1.0),
        ]];
        let meshes = extrude(&points, &segments, &profile, 1e-2).unwrap();
        assert_eq!(meshes.len(), 1);
        let mesh = &meshes[0];
        assert!(!mesh.triangles.is_empty());
        assert!(mesh.positions.iter().all(|p| p.iter().all(|c| c.is_finite())));
        // two cylindrical rings one unit tall plus two flat bands
        let area = mesh.area();
        assert!(area > 0.0);
        // the constant-radius rings alone: perimeter(offset 0.5) + perimeter(offset 1.0)
        let p_in = crate::offset(&points, &segments, 0.5, 1e-2).unwrap();
        let per_in: f64 = p_in[0]
            .0
            .windows(2)
            .map(|w| (w[1] - w[0]).magnitude())
            .sum();
        assert!(area > per_in, "tube area covers at least the inner ring");
    }

    #[test]
    fn slanted_profile_builds_band_faces() {
        let (points, segments) = straight_trajectory();
        // a triangle with one slanted edge from radius 0.5 to 1.5
        let profile = vec![line_string![
            (x: 0.5, y: 0.0),
            (x: 1.5, y: 0.0),
            (x: 1.5, y: 1.0),
        ]];
        let meshes = extrude(&points, &segments, &profile, 1e-2).unwrap();
        let mesh = &meshes[0];
        assert!(!mesh.triangles.is_empty());
        assert!(mesh.area() > 0.0);
    }

    #[test]
    fn profile_crossing_the_axis_is_mirrored() {
        let (points, segments) = straight_trajectory();
        let profile = vec![line_string![
            (x: -0.5, y: -1.0),
            (x: 1.0, y: -0.5),
            (x: 0.5, y: 1.0),
            (x: -1.0, y: 0.5),
        ]];
        let meshes = extrude(&points, &segments, &profile, 5e-2).unwrap();
        assert_eq!(meshes.len(), 1);
        let mesh = &meshes[0];
        assert!(!mesh.triangles.is_empty());
        assert!(mesh.positions.iter().all(|p| p.iter().all(|c| c.is_finite())));
    }
}
