//! Offset curves extracted from the frozen diagram.
//!
//! At query radius `r` the offset curve is the level set `{d = |r|}` of the
//! distance field, restricted to the side the sign selects: positive radii
//! walk the right-side half cells (the outside of a counter-clockwise
//! figure), negative radii the left-side halves. The curve is assembled as
//! chains of cell crossings: within a segment cell it is a straight stretch,
//! within a point cell a circular arc interpolated under the absolute
//! tolerance, and it hops cells wherever a separator crosses the level.

use std::collections::HashSet;

use geo_types::{Coord, LineString};

use crate::corner_table::{Cell, Edge};
use crate::diagram::{Site, VoronoiDiagram};
use crate::error::Result;
use crate::kernel::VectorOps;
use crate::separator::Branch;
use crate::VoronoiFloat;

/// A diagram frozen for offset queries: node radii are square-rooted once
/// and every query reuses the same topology.
pub struct OffsetDiagram<T: VoronoiFloat> {
    diagram: VoronoiDiagram<T>,
    pub(crate) radii: Vec<T>,
}

/// One traversal of the level set through a separator.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Crossing<T: VoronoiFloat> {
    /// The crossed edge, oriented so its `left` cell is the one being walked.
    pub(crate) edge: Edge,
    /// Branch of that edge's separator carrying the crossing.
    pub(crate) branch: Branch,
    pub(crate) point: Coord<T>,
}

/// One cell traversed by a chain, between two crossings.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Step<T: VoronoiFloat> {
    pub(crate) cell: Cell,
    pub(crate) entry: Crossing<T>,
    pub(crate) exit: Crossing<T>,
}

/// A maximal sequence of adjacent cell crossings, closed or tied to
/// trajectory endpoints.
pub(crate) struct Chain<T: VoronoiFloat> {
    pub(crate) line: LineString<T>,
    pub(crate) steps: Vec<Step<T>>,
}

impl<T: VoronoiFloat> OffsetDiagram<T> {
    /// Build the diagram of `points` and `segments` with enough headroom to
    /// answer offsets up to `extra_radius`.
    pub fn new(points: &[Coord<T>], segments: &[[usize; 2]], extra_radius: T) -> Result<Self> {
        let diagram = VoronoiDiagram::with_options(
            points,
            segments,
            extra_radius,
            crate::diagram::DEFAULT_SEED,
        )?;
        Ok(Self::from_diagram(diagram))
    }

    /// Freeze an already-built diagram.
    pub fn from_diagram(diagram: VoronoiDiagram<T>) -> Self {
        let radii = diagram.radii_sq.iter().map(|&r2| r2.sqrt()).collect();
        OffsetDiagram { diagram, radii }
    }

    pub fn diagram(&self) -> &VoronoiDiagram<T> {
        &self.diagram
    }

    /// All offset chains at the signed `radius`, interpolated so arcs stay
    /// within `atol` of the true curve.
    pub fn offset(&self, radius: T, atol: T) -> Vec<LineString<T>> {
        self.chains(radius, atol).into_iter().map(|c| c.line).collect()
    }

    pub(crate) fn chains(&self, radius: T, atol: T) -> Vec<Chain<T>> {
        self.chains_side(radius.abs(), radius < T::zero(), atol)
    }

    /// Chains at `level` on an explicit side; lets a zero level still pick a
    /// side (both sides coincide geometrically but traverse different cells).
    pub(crate) fn chains_side(&self, level: T, want_left: bool, atol: T) -> Vec<Chain<T>> {
        let mut visited: HashSet<(u32, i8)> = HashSet::new();
        let mut chains = Vec::new();

        for &(right, left) in &self.diagram.halves {
            let seed = if want_left { left } else { right };
            for x in self.cell_crossings(seed, level) {
                if visited.contains(&canonical(&self.diagram, &x)) {
                    continue;
                }
                chains.push(self.walk_chain(seed, x, level, atol, &mut visited));
            }
        }

        // isolated points: their circles may be whole (no crossings) or
        // merge with neighbouring cells through bisector crossings
        for pi in 0..self.diagram.num_points {
            if self.diagram.neighbours[pi] != 0 {
                continue;
            }
            let c = Cell(3 + pi as u32);
            let crossings = self.cell_crossings(c, level);
            if crossings.is_empty() {
                if level > T::zero() {
                    chains.push(Chain {
                        line: self.full_circle(c, level, atol),
                        steps: Vec::new(),
                    });
                }
                continue;
            }
            for x in crossings {
                if visited.contains(&canonical(&self.diagram, &x)) {
                    continue;
                }
                chains.push(self.walk_chain(c, x, level, atol, &mut visited));
            }
        }

        debug!(
            "offset at {level:?} ({}): {} chains",
            if want_left { "left" } else { "right" },
            chains.len()
        );
        chains
    }

    /// The crossings on the region ring of `c`, in counter-clockwise ring
    /// order (the order the offset curve encounters them).
    pub(crate) fn cell_crossings(&self, c: Cell, level: T) -> Vec<Crossing<T>> {
        let d = &self.diagram;
        let start = d.table.next(d.table.anyedge(c));
        debug_assert!(d.table.left(start) == c);
        let mut out = Vec::new();
        let mut e = start;
        loop {
            for branch in self.edge_cross(e, level) {
                let sep = d.separators[e.index()].unwrap();
                out.push(Crossing {
                    edge: e,
                    branch,
                    point: sep.evaluate(branch, level),
                });
            }
            e = d.table.ring_ccw(e);
            if e == start {
                break;
            }
            assert!(out.len() < 100_000, "runaway ring walk");
        }
        out
    }

    /// Which branches of `separator(e)` cross the level set within the
    /// portion of the separator the edge realizes, ordered from `node(e)`
    /// towards `node(opposite(e))`.
    pub(crate) fn edge_cross(&self, e: Edge, level: T) -> Vec<Branch> {
        let d = &self.diagram;
        let sep = match d.separators[e.index()] {
            Some(s) if !s.is_parallel() => s,
            _ => return Vec::new(), // a parallel bisector never crosses
        };
        let (b1, b2, r1, r2) = self.span(e);
        if b1.is_bad() || b2.is_bad() {
            return Vec::new();
        }
        if !r1.is_finite() && !r2.is_finite() {
            return Vec::new();
        }
        let rmin = sep.rmin();

        let mut out = Vec::new();
        if b1 == b2 {
            // monotone along a single branch
            if (r1 <= level && level < r2) || (r2 <= level && level < r1) {
                out.push(b1);
            }
        } else {
            // spans the perigee: each side crosses once if deep enough
            if rmin <= level && level < r1 {
                out.push(b1);
            }
            if rmin < level && level < r2 {
                out.push(b2);
            }
        }
        out
    }

    /// The sub-arc of `separator(e)` realized by edge `e`, as
    /// `(branch, radius)` pairs at `node(e)` and `node(opposite(e))`.
    /// A node at the perigee sits on both branches and is read from the far
    /// end so the span is well ordered.
    pub(crate) fn span(&self, e: Edge) -> (Branch, Branch, T, T) {
        let d = &self.diagram;
        let f = d.table.opposite(e);
        let mut b1 = d.branches[e.index()];
        let mut b2 = -d.branches[f.index()];
        let r1 = self.radii[d.table.node(e).index()];
        let r2 = self.radii[d.table.node(f).index()];
        if let Some(sep) = d.separators[e.index()] {
            let near = T::from(1e-9).unwrap() * (sep.rmin() + T::one());
            if (r1 - sep.rmin()).abs() <= near {
                b1 = b2;
            } else if (r2 - sep.rmin()).abs() <= near {
                b2 = b1;
            }
        }
        (b1, b2, r1, r2)
    }

    /// Walk one chain starting from crossing `x0` into cell `c0`. Closed
    /// chains come back to `x0`; open chains stop at trajectory endpoints
    /// (point cells with a segment count other than two) and are extended
    /// backward from the start.
    fn walk_chain(
        &self,
        c0: Cell,
        x0: Crossing<T>,
        level: T,
        atol: T,
        visited: &mut HashSet<(u32, i8)>,
    ) -> Chain<T> {
        let d = &self.diagram;
        let mut pts: Vec<Coord<T>> = vec![x0.point];
        let mut steps: Vec<Step<T>> = Vec::new();
        visited.insert(canonical(d, &x0));

        let mut cell = c0;
        let mut entry = x0;
        let fuel = d.table.num_edges() * 4 + 16;
        let mut closed = false;
        for _ in 0..fuel {
            let list = self.cell_crossings(cell, level);
            let i = list
                .iter()
                .position(|x| x.edge == entry.edge && x.branch == entry.branch)
                .expect("entry crossing missing from its ring");
            let exit = list[(i + 1) % list.len()];

            self.emit_within(cell, entry.point, exit.point, level, atol, &mut pts);
            push_point(&mut pts, exit.point);
            steps.push(Step { cell, entry, exit });
            if canonical(d, &exit) == canonical(d, &x0) {
                closed = true;
                break;
            }
            visited.insert(canonical(d, &exit));

            let e2 = d.table.opposite(exit.edge);
            let next_cell = d.table.left(e2);
            if self.is_terminal(next_cell) {
                break;
            }
            cell = next_cell;
            entry = Crossing {
                edge: e2,
                branch: -exit.branch,
                point: exit.point,
            };
        }

        if !closed {
            // grow the open chain backward from the start
            let mut prefix_rev: Vec<Coord<T>> = Vec::new();
            let mut steps_rev: Vec<Step<T>> = Vec::new();
            let mut exit = x0;
            let mut cell = d.table.left(d.table.opposite(exit.edge));
            while !self.is_terminal(cell) {
                let seen = Crossing {
                    edge: d.table.opposite(exit.edge),
                    branch: -exit.branch,
                    point: exit.point,
                };
                let list = self.cell_crossings(cell, level);
                let i = list
                    .iter()
                    .position(|x| x.edge == seen.edge && x.branch == seen.branch)
                    .expect("exit crossing missing from its ring");
                let entry = list[(i + list.len() - 1) % list.len()];

                let mut arc: Vec<Coord<T>> = vec![entry.point];
                self.emit_within(cell, entry.point, seen.point, level, atol, &mut arc);
                for p in arc.into_iter().rev() {
                    push_point(&mut prefix_rev, p);
                }
                steps_rev.push(Step {
                    cell,
                    entry,
                    exit: seen,
                });
                visited.insert(canonical(d, &entry));

                exit = entry;
                cell = d.table.left(d.table.opposite(exit.edge));
                assert!(prefix_rev.len() < fuel * 4, "runaway backward walk");
            }
            if !prefix_rev.is_empty() {
                prefix_rev.reverse();
                for p in pts {
                    push_point(&mut prefix_rev, p);
                }
                pts = prefix_rev;
                steps_rev.reverse();
                steps_rev.extend(steps);
                steps = steps_rev;
            }
        }

        Chain {
            line: LineString::new(pts),
            steps,
        }
    }

    pub(crate) fn is_terminal(&self, c: Cell) -> bool {
        if self.diagram.is_fake_cell(c) {
            return false;
        }
        match self.diagram.site(c) {
            Site::Point(_) => {
                let pi = c.index() - 3;
                pi < self.diagram.num_points && self.diagram.neighbours[pi] != 2
            }
            Site::Segment { .. } => false,
        }
    }

    /// The curve between two crossings of one cell: a straight stretch in a
    /// segment cell, a counter-clockwise arc around a point site. Interior
    /// points only; the caller pushes the endpoints.
    pub(crate) fn emit_within(
        &self,
        c: Cell,
        from: Coord<T>,
        to: Coord<T>,
        level: T,
        atol: T,
        pts: &mut Vec<Coord<T>>,
    ) {
        let center = match self.diagram.site(c) {
            Site::Point(p) => p,
            Site::Segment { .. } => return,
        };
        if level <= T::from(1e-12).unwrap() {
            return;
        }
        let a0 = (from - center).y.atan2((from - center).x);
        let a1 = (to - center).y.atan2((to - center).x);
        let mut sweep = a1 - a0;
        let tau = T::PI() + T::PI();
        while sweep <= T::zero() {
            sweep = sweep + tau;
        }
        while sweep > tau {
            sweep = sweep - tau;
        }
        let eight = T::from(8.0).unwrap();
        let steps = (sweep * (level / (eight * atol)).sqrt()).ceil();
        let n = <usize as num_traits::NumCast>::from(steps).unwrap_or(1).max(1);
        for k in 1..n {
            let a = a0 + sweep * T::from(k as f64).unwrap() / T::from(n as f64).unwrap();
            push_point(
                pts,
                Coord {
                    x: center.x + level * a.cos(),
                    y: center.y + level * a.sin(),
                },
            );
        }
    }

    /// A free-standing circle around an isolated point site.
    fn full_circle(&self, c: Cell, level: T, atol: T) -> LineString<T> {
        let center = match self.diagram.site(c) {
            Site::Point(p) => p,
            Site::Segment { .. } => unreachable!(),
        };
        let tau = T::PI() + T::PI();
        let eight = T::from(8.0).unwrap();
        let steps = (tau * (level / (eight * atol)).sqrt()).ceil();
        let n = <usize as num_traits::NumCast>::from(steps).unwrap_or(8).max(8);
        let mut pts = Vec::with_capacity(n + 1);
        for k in 0..=n {
            let a = tau * T::from(k as f64).unwrap() / T::from(n as f64).unwrap();
            pts.push(Coord {
                x: center.x + level * a.cos(),
                y: center.y + level * a.sin(),
            });
        }
        let first = pts[0];
        *pts.last_mut().unwrap() = first;
        LineString::new(pts)
    }
}

fn canonical<T: VoronoiFloat>(d: &VoronoiDiagram<T>, x: &Crossing<T>) -> (u32, i8) {
    let f = d.table.opposite(x.edge);
    if x.edge <= f {
        (x.edge.0, x.branch as i8)
    } else {
        (f.0, (-x.branch) as i8)
    }
}

fn push_point<T: VoronoiFloat>(pts: &mut Vec<Coord<T>>, p: Coord<T>) {
    if let Some(last) = pts.last() {
        if (*last - p).magnitude() <= T::from(1e-12).unwrap() * (T::one() + p.magnitude()) {
            return;
        }
    }
    pts.push(p);
}

/// The offset of the figure `(points, segments)` at one signed radius.
///
/// Positive radii offset outward (the right side of the oriented segments),
/// negative inward. Arcs are sampled within `atol`.
pub fn offset<T: VoronoiFloat>(
    points: &[Coord<T>],
    segments: &[[usize; 2]],
    radius: T,
    atol: T,
) -> Result<Vec<LineString<T>>> {
    let od = OffsetDiagram::new(points, segments, radius.abs() + T::one())?;
    Ok(od.offset(radius, atol))
}

/// Offsets at several radii, sharing one diagram across the queries.
pub fn offset_many<T: VoronoiFloat>(
    points: &[Coord<T>],
    segments: &[[usize; 2]],
    radii: &[T],
    atol: T,
) -> Result<Vec<Vec<LineString<T>>>> {
    let headroom = radii
        .iter()
        .fold(T::one(), |acc, r| acc.max(r.abs() + T::one()));
    let od = OffsetDiagram::new(points, segments, headroom)?;
    Ok(radii.iter().map(|&r| od.offset(r, atol)).collect())
}
