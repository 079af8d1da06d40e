//! Incremental construction of the point/segment Voronoi diagram.
//!
//! Construction is batch: all sites are known up front. Points go in first
//! through Bowyer–Watson insertion in a seeded random order; segments follow,
//! each one splayed into its root node and grown by capturing every node
//! that is closer to the new segment than to its current sites; finally each
//! segment cell is split into its right- and left-side halves. Geometric
//! attributes (separators, branches, node positions and radii) are
//! recomputed for exactly the elements each topological change touches.

use geo_types::{Coord, Line};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::corner_table::{Cell, CornerTable, Edge, Node};
use crate::error::Result;
use crate::kernel::{in_circle, is_left, seg_distance_sq, seg_param, VectorOps};
use crate::separator::{Branch, Separator};
use crate::tripoint::{site_separator, tripoint};
use crate::VoronoiFloat;

/// A generator of the diagram: a point, or an (oriented) segment.
#[derive(Clone, Copy, Debug)]
pub enum Site<T: VoronoiFloat> {
    Point(Coord<T>),
    /// Until splitting, a segment owns both sides of its supporting line;
    /// afterwards each oriented half owns the right side of its direction.
    Segment { line: Line<T>, split: bool },
}

const FIND_NODE_CAP: usize = 1_000;
pub(crate) const DEFAULT_SEED: u64 = 0x5eed_0ffe;

/// The frozen-after-construction Voronoi diagram of points and segments.
#[derive(Debug)]
pub struct VoronoiDiagram<T: VoronoiFloat> {
    pub(crate) table: CornerTable,
    pub(crate) sites: Vec<Site<T>>,
    /// Per edge: the separator of `(head, left)`, named in that order.
    pub(crate) separators: Vec<Option<Separator<T>>>,
    /// Per edge: which branch of its separator the edge's node lies on.
    pub(crate) branches: Vec<Branch>,
    /// Per node: the Voronoi vertex.
    pub(crate) positions: Vec<Coord<T>>,
    /// Per node: squared common distance to the three incident sites.
    pub(crate) radii_sq: Vec<T>,
    /// Nodes whose attributes were set directly (the zero-radius nodes
    /// created by segment splitting) and must not be recomputed.
    pub(crate) pinned: Vec<bool>,
    /// Per input point: number of incident segments.
    pub(crate) neighbours: Vec<u32>,
    pub(crate) fake_node: Node,
    pub(crate) num_points: usize,
    /// Per input segment: the two oriented half cells after splitting.
    pub(crate) halves: Vec<(Cell, Cell)>,
    pub(crate) scale: T,
}

impl<T: VoronoiFloat> VoronoiDiagram<T> {
    /// Build the diagram of `points` and `segments` (pairs of point
    /// indices). Headroom for offset queries defaults to the input's
    /// bounding-box diagonal; use [`VoronoiDiagram::with_options`] for more.
    ///
    /// Points must be pairwise distinct and segments may share endpoints but
    /// not cross in their interiors; a detected crossing is an error, other
    /// degeneracies are not resolved.
    pub fn new(points: &[Coord<T>], segments: &[[usize; 2]]) -> Result<Self> {
        let diag = bbox_diagonal(points);
        Self::with_options(points, segments, diag, DEFAULT_SEED)
    }

    /// Build with explicit offset headroom (`extra_radius`) and RNG seed.
    /// The seed only shuffles the insertion order; the result is the same
    /// diagram for any seed.
    pub fn with_options(
        points: &[Coord<T>],
        segments: &[[usize; 2]],
        extra_radius: T,
        seed: u64,
    ) -> Result<Self> {
        for s in segments {
            assert!(s[0] < points.len() && s[1] < points.len(), "segment index");
            assert!(s[0] != s[1], "zero-length segment");
        }

        let mut span = T::one();
        for p in points {
            span = span.max(p.x.abs()).max(p.y.abs());
        }
        span = span + extra_radius.abs() + T::one();
        let m = span * T::from(3.0).unwrap();

        // three fake point cells and the back-pointing fake node bootstrap
        // the topology so point location never leaves defined territory
        let sites: Vec<Site<T>> = (0..3)
            .map(|k| {
                let angle = T::from(k as f64 * 120.0 + 90.0).unwrap().to_radians();
                Site::Point(Coord {
                    x: m * angle.cos(),
                    y: m * angle.sin(),
                })
            })
            .collect();
        let mut table = CornerTable::new(3);
        let inner = table.new_node([Cell(0), Cell(1), Cell(2)]);
        let fake_node = table.new_node([Cell(0), Cell(2), Cell(1)]);
        table.set_opposite(table.side(inner, 0), table.side(fake_node, 0));
        table.set_opposite(table.side(inner, 1), table.side(fake_node, 2));
        table.set_opposite(table.side(inner, 2), table.side(fake_node, 1));
        for i in 0..3 {
            let e = table.side(inner, i);
            table.set_anyedge(table.tail(e), e);
        }

        let mut neighbours = vec![0u32; points.len()];
        for s in segments {
            neighbours[s[0]] += 1;
            neighbours[s[1]] += 1;
        }

        let mut diagram = VoronoiDiagram {
            table,
            sites,
            separators: Vec::new(),
            branches: Vec::new(),
            positions: Vec::new(),
            radii_sq: Vec::new(),
            pinned: Vec::new(),
            neighbours,
            fake_node,
            num_points: points.len(),
            halves: Vec::new(),
            scale: m,
        };

        diagram.sync_vectors();
        diagram.pinned[fake_node.index()] = true;
        diagram.radii_sq[fake_node.index()] = T::infinity();
        diagram.refresh_node(inner)?;
        for i in 0..3 {
            diagram.branches[diagram.table.side(fake_node, i).index()] = Branch::Plus;
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        diagram.insert_points(points, &mut rng)?;
        diagram.insert_segments(points, segments)?;
        diagram.split_segments(points, segments)?;

        debug!(
            "diagram built: {} nodes, {} cells",
            diagram.table.num_nodes(),
            diagram.table.num_cells()
        );
        Ok(diagram)
    }

    pub(crate) fn site(&self, c: Cell) -> Site<T> {
        self.sites[c.index()]
    }

    fn site_coord(&self, c: Cell) -> Coord<T> {
        match self.site(c) {
            Site::Point(p) => p,
            Site::Segment { .. } => unreachable!("point phase saw a segment"),
        }
    }

    pub(crate) fn is_fake_cell(&self, c: Cell) -> bool {
        c.index() < 3
    }

    /// `(nodes, half_edges, cells)`; `nodes − edges/2 + cells = 2` holds,
    /// counting the three fake cells and the fake node.
    pub fn census(&self) -> (usize, usize, usize) {
        self.table.census()
    }

    // ---- attribute upkeep ------------------------------------------------

    fn sync_vectors(&mut self) {
        let ne = self.table.num_edges();
        let nn = self.table.num_nodes();
        self.separators.resize(ne, None);
        self.branches.resize(ne, Branch::Bad);
        self.positions.resize(
            nn,
            Coord {
                x: T::nan(),
                y: T::nan(),
            },
        );
        self.radii_sq.resize(nn, T::nan());
        self.pinned.resize(nn, false);
    }

    /// Recompute the separator of one edge from its two cells.
    fn edge_data(&mut self, e: Edge) -> Result<()> {
        let h = self.table.head(e);
        let l = self.table.left(e);
        if h == l {
            self.separators[e.index()] = None;
            return Ok(());
        }
        let sep = site_separator(self.site(h), self.site(l))?;
        self.separators[e.index()] = Some(sep);
        Ok(())
    }

    /// Recompute separators, branches, position and radius around one node.
    fn refresh_node(&mut self, q: Node) -> Result<()> {
        for i in 0..3 {
            self.edge_data(self.table.side(q, i))?;
        }
        if q == self.fake_node || self.pinned[q.index()] {
            return Ok(());
        }
        let [c0, c1, c2] = self.table.cells(q);
        let tp = tripoint(self.site(c0), self.site(c1), self.site(c2));
        self.positions[q.index()] = tp.pos;
        self.radii_sq[q.index()] = tp.r * tp.r;
        // the branch of pair (cᵢ, cᵢ₊₁) belongs to the corner at cᵢ₊₂
        for i in 0..3 {
            let e = self.table.side(q, (i + 2) % 3);
            self.branches[e.index()] = tp.branches[i];
        }
        #[cfg(debug_assertions)]
        {
            if !tp.is_bad() {
                for i in 0..3 {
                    let e = self.table.side(q, i);
                    if let (Some(sep), b) = (self.separators[e.index()], self.branches[e.index()])
                    {
                        if b != Branch::Zero && !b.is_bad() {
                            let p = sep.evaluate(b, tp.r);
                            let tol = T::from(1e-6).unwrap() * self.scale;
                            debug_assert!(
                                (p - tp.pos).magnitude() <= tol,
                                "separator evaluation disagrees with the tripoint"
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn refresh_nodes_of(&mut self, edges: &[Edge]) -> Result<()> {
        self.sync_vectors();
        let mut seen: Vec<Node> = Vec::with_capacity(edges.len() * 2);
        for &e in edges {
            for q in [self.table.node(e), self.table.node(self.table.opposite(e))] {
                if !seen.contains(&q) {
                    seen.push(q);
                    self.refresh_node(q)?;
                }
            }
        }
        Ok(())
    }

    // ---- point insertion -------------------------------------------------

    /// Walk from a random start node to the triangle containing `p`.
    fn find_node(&self, p: Coord<T>, rng: &mut SmallRng) -> Node {
        let mut q = loop {
            let q = Node(rng.gen_range(0..self.table.num_nodes() as u32));
            if q != self.fake_node {
                break q;
            }
        };
        for _ in 0..FIND_NODE_CAP {
            let mut crossed = false;
            for i in 0..3 {
                let e = self.table.side(q, i);
                let a = self.site_coord(self.table.head(e));
                let b = self.site_coord(self.table.left(e));
                // outside across the directed side head → left
                if is_left(b, a, p) {
                    let next = self.table.node(self.table.opposite(e));
                    assert!(next != self.fake_node, "point escaped the bootstrap hull");
                    q = next;
                    crossed = true;
                    break;
                }
            }
            if !crossed {
                return q;
            }
        }
        panic!("point location did not terminate");
    }

    fn insert_points(&mut self, points: &[Coord<T>], rng: &mut SmallRng) -> Result<()> {
        // cells are numbered in input order, insertion happens shuffled
        for p in points {
            self.table.add_cell();
            self.sites.push(Site::Point(*p));
        }
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.shuffle(rng);
        for &pi in &order {
            let p = points[pi];
            let cell = Cell(3 + pi as u32);

            let q = self.find_node(p, rng);
            let exposed = self.table.insert(q, cell);
            self.refresh_nodes_of(&exposed)?;

            let mut stack: Vec<Edge> = exposed.to_vec();
            let mut fuel = 3 * self.table.num_nodes() + 64;
            while let Some(e) = stack.pop() {
                assert!(fuel > 0, "delaunay flipping did not terminate");
                fuel -= 1;
                let f = self.table.opposite(e);
                let qf = self.table.node(f);
                if qf == self.fake_node {
                    continue;
                }
                let [a, b, c] = self.table.cells(qf);
                if in_circle(
                    self.site_coord(a),
                    self.site_coord(b),
                    self.site_coord(c),
                    p,
                ) {
                    let fresh = self.table.flip(e);
                    self.refresh_nodes_of(&fresh)?;
                    stack.extend(fresh);
                }
            }
        }
        trace!("inserted {} points", points.len());
        Ok(())
    }

    // ---- segment insertion -----------------------------------------------

    /// Root node for a new segment: among the nodes around the segment's
    /// tail point, the one whose vertex projects inside the segment and is
    /// closest to it (falling back to plain closest).
    fn find_root_node(&self, a: Cell, pa: Coord<T>, pb: Coord<T>) -> Node {
        let mut best: Option<(bool, T, Node)> = None;
        for e in self.table.star(a) {
            let q = self.table.node(e);
            if q == self.fake_node {
                continue;
            }
            let v = self.positions[q.index()];
            if !v.x.is_finite() {
                continue;
            }
            let t = seg_param(pa, pb, v);
            let influenced = t > T::zero() && t < T::one();
            let d = seg_distance_sq(pa, pb, v);
            let key = (!influenced, d, q);
            if best.map_or(true, |(bi, bd, _)| (key.0, key.1) < (bi, bd)) {
                best = Some(key);
            }
        }
        best.expect("segment endpoint with no incident node").2
    }

    /// A node falls to the new segment when it is closer to the segment
    /// than to its current three sites.
    fn edge_capture(&self, e: Edge, pa: Coord<T>, pb: Coord<T>) -> bool {
        let f = self.table.opposite(e);
        let qf = self.table.node(f);
        if qf == self.fake_node {
            return false;
        }
        let v = self.positions[qf.index()];
        let r_sq = self.radii_sq[qf.index()];
        if !v.x.is_finite() || !r_sq.is_finite() {
            return false;
        }
        let tol = T::from(1e-12).unwrap() * self.scale * self.scale;
        seg_distance_sq(pa, pb, v) < r_sq - tol
    }

    fn insert_segments(&mut self, points: &[Coord<T>], segments: &[[usize; 2]]) -> Result<()> {
        for seg in segments {
            let pa = points[seg[0]];
            let pb = points[seg[1]];
            let cell = self.table.add_cell();
            self.sites.push(Site::Segment {
                line: Line::new(pa, pb),
                split: false,
            });

            let root = self.find_root_node(Cell(3 + seg[0] as u32), pa, pb);
            let exposed = self.table.insert(root, cell);
            self.refresh_nodes_of(&exposed)?;

            let mut stack: Vec<Edge> = exposed.to_vec();
            let mut fuel = 3 * self.table.num_nodes() + 64;
            while let Some(e) = stack.pop() {
                assert!(fuel > 0, "segment capture did not terminate");
                fuel -= 1;
                if self.edge_capture(e, pa, pb) {
                    let fresh = self.table.flip(e);
                    self.refresh_nodes_of(&fresh)?;
                    stack.extend(fresh);
                }
            }
            trace!("inserted segment {:?}", seg);
        }
        Ok(())
    }

    // ---- segment splitting -----------------------------------------------

    /// Replace each segment cell by its right- and left-side halves, joined
    /// by two zero-radius nodes at the segment endpoints.
    fn split_segments(&mut self, points: &[Coord<T>], segments: &[[usize; 2]]) -> Result<()> {
        for (si, seg) in segments.iter().enumerate() {
            let s = Cell((3 + self.num_points + si) as u32);
            let a = Cell(3 + seg[0] as u32);
            let b = Cell(3 + seg[1] as u32);
            let pa = points[seg[0]];
            let pb = points[seg[1]];

            let ring = self.table.star(s);
            let m = ring.len();
            let k_a = (0..m)
                .find(|&k| self.table.head(ring[k]) == a)
                .expect("segment not adjacent to its tail endpoint");
            let k_b = (0..m)
                .find(|&k| self.table.head(ring[k]) == b)
                .expect("segment not adjacent to its head endpoint");

            // arc1 runs from just after a's triangle up to b's
            let arc1: Vec<Edge> = (1..=((k_b + m - k_a) % m))
                .map(|d| ring[(k_a + d) % m])
                .collect();
            let arc2: Vec<Edge> = (1..=((k_a + m - k_b) % m))
                .map(|d| ring[(k_b + d) % m])
                .collect();
            assert!(!arc1.is_empty() && !arc2.is_empty(), "degenerate ring");

            // decide which arc lies right of a → b from the farthest vertex
            let side_of = |diag: &Self, arc: &[Edge]| {
                let far = arc
                    .iter()
                    .map(|&e| diag.positions[diag.table.node(e).index()])
                    .filter(|v| v.x.is_finite())
                    .max_by(|u, v| {
                        seg_distance_sq(pa, pb, *u)
                            .partial_cmp(&seg_distance_sq(pa, pb, *v))
                            .unwrap()
                    })
                    .expect("arc without located vertices");
                is_left(pa, pb, far)
            };
            let arc1_left = side_of(self, &arc1);
            assert!(
                arc1_left != side_of(self, &arc2),
                "segment ring arcs on one side"
            );

            // the kept cell becomes the right half, the new one the left
            let s_left = self.table.add_cell();
            self.sites[s.index()] = Site::Segment {
                line: Line::new(pa, pb),
                split: true,
            };
            self.sites.push(Site::Segment {
                line: Line::new(pb, pa),
                split: true,
            });
            self.halves.push((s, s_left));

            let renamed = if arc1_left { &arc1 } else { &arc2 };
            for &e in renamed {
                let q = self.table.node(e);
                self.table.replace_cell_in_node(q, s, s_left);
                self.table.set_anyedge(s_left, e);
            }
            let kept = if arc1_left { &arc2 } else { &arc1 };
            self.table.set_anyedge(s, kept[0]);

            // stitch the two zero-radius endpoint nodes in
            let e_a = ring[k_a]; // triangle with a as head
            let e_a1 = ring[(k_a + 1) % m]; // triangle with a as left
            let e_b = ring[k_b];
            let e_b1 = ring[(k_b + 1) % m];
            // x: the half owning a's head-side triangle; y: the other
            let (x, y) = if arc1_left { (s, s_left) } else { (s_left, s) };
            let q1 = self.table.new_node([a, x, y]);
            let q2 = self.table.new_node([b, y, x]);
            let (pa1, pk) = (self.table.prev(e_a), self.table.next(e_a1));
            let (pb1, pl) = (self.table.prev(e_b), self.table.next(e_b1));
            self.table.set_opposite(self.table.side(q1, 1), pk);
            self.table.set_opposite(self.table.side(q1, 2), pa1);
            self.table.set_opposite(self.table.side(q2, 1), pl);
            self.table.set_opposite(self.table.side(q2, 2), pb1);
            self.table
                .set_opposite(self.table.side(q1, 0), self.table.side(q2, 0));

            self.sync_vectors();
            for (q, p) in [(q1, pa), (q2, pb)] {
                self.pinned[q.index()] = true;
                self.positions[q.index()] = p;
                self.radii_sq[q.index()] = T::zero();
            }
        }

        // geometry of every edge and node is refreshed once the cell
        // renaming has settled
        self.sync_vectors();
        for qi in 0..self.table.num_nodes() {
            let q = Node(qi as u32);
            if self.pinned[qi] {
                for i in 0..3 {
                    let e = self.table.side(q, i);
                    self.edge_data(e)?;
                    self.branches[e.index()] = match self.separators[e.index()] {
                        Some(sep) if sep.is_parallel() => Branch::Zero,
                        Some(sep) if q != self.fake_node => {
                            sep.which_branch(self.positions[qi])
                        }
                        _ => Branch::Plus,
                    };
                }
            } else {
                self.refresh_node(q)?;
            }
        }
        Ok(())
    }

    // ---- verification ----------------------------------------------------

    /// Assert the structural and geometric invariants of the finished
    /// diagram. Cheap enough for tests; panics on violation.
    pub fn check_consistency(&self) {
        self.table.check();
        let (n, e, c) = self.census();
        assert_eq!(n as isize - e as isize / 2 + c as isize, 2, "euler count");
        let tol = T::from(1e-6).unwrap() * self.scale;
        for qi in 0..self.table.num_nodes() {
            let q = Node(qi as u32);
            if q == self.fake_node || self.pinned[qi] {
                continue;
            }
            let r_sq = self.radii_sq[qi];
            assert!(r_sq.is_finite(), "node without a radius: {q:?}");
            let r = r_sq.sqrt();
            for i in 0..3 {
                let e = self.table.side(q, i);
                let sep = self.separators[e.index()].expect("edge without separator");
                let b = self.branches[e.index()];
                assert!(!b.is_bad(), "unresolved branch on {e:?}");
                let p = if b != Branch::Zero {
                    let p = sep.evaluate(b, r);
                    assert!(
                        (p - self.positions[qi]).magnitude() <= tol,
                        "separator and node disagree at {e:?}"
                    );
                    Some(p)
                } else {
                    None
                };
                // reversal symmetry against the opposite edge
                let f = self.table.opposite(e);
                if let Some(fsep) = self.separators[f.index()] {
                    let pr = fsep.reverse().evaluate(b, r);
                    if let Some(p) = p {
                        assert!(
                            (pr - p).magnitude() <= tol,
                            "separator of opposite edge is not the reverse"
                        );
                    }
                }
            }
        }
    }
}

fn bbox_diagonal<T: VoronoiFloat>(points: &[Coord<T>]) -> T {
    let mut lo = Coord {
        x: T::infinity(),
        y: T::infinity(),
    };
    let mut hi = Coord {
        x: T::neg_infinity(),
        y: T::neg_infinity(),
    };
    for p in points {
        lo.x = lo.x.min(p.x);
        lo.y = lo.y.min(p.y);
        hi.x = hi.x.max(p.x);
        hi.y = hi.y.max(p.y);
    }
    if points.is_empty() {
        return T::one();
    }
    ((hi.x - lo.x) * (hi.x - lo.x) + (hi.y - lo.y) * (hi.y - lo.y))
        .sqrt()
        .max(T::one())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn two_points_make_two_real_cells() {
        let points = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }];
        let d = VoronoiDiagram::new(&points, &[]).unwrap();
        d.check_consistency();
        let (_, _, cells) = d.census();
        assert_eq!(cells, 5); // three fake cells and the two real ones

        // the separator between the two real cells has its perigee at the
        // midpoint, five units from either point
        let mut found = false;
        for ei in 0..d.table.num_edges() {
            let e = Edge(ei as u32);
            let (h, l) = (d.table.head(e), d.table.left(e));
            if (h, l) == (Cell(3), Cell(4)) || (h, l) == (Cell(4), Cell(3)) {
                let sep = d.separators[e.index()].unwrap();
                assert_relative_eq!(sep.rmin(), 5.0, max_relative = 1e-12);
                let mid = sep.evaluate(Branch::Plus, 5.0);
                assert_relative_eq!(mid.x, 5.0, max_relative = 1e-9);
                assert_relative_eq!(mid.y, 0.0, epsilon = 1e-9);
                found = true;
            }
        }
        assert!(found, "the two point cells are not adjacent");
    }

    #[test]
    fn grid_of_points_is_consistent() {
        let mut points = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                points.push(coord! { x: i as f64 * 2.0 + (j as f64) * 0.1, y: j as f64 * 2.0 });
            }
        }
        let d = VoronoiDiagram::new(&points, &[]).unwrap();
        d.check_consistency();
    }

    #[test]
    fn seed_does_not_change_cell_count() {
        let points = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 4.0, y: 0.0 },
            coord! { x: 4.0, y: 3.0 },
            coord! { x: 0.0, y: 3.0 },
        ];
        let a = VoronoiDiagram::with_options(&points, &[], 1.0, 7).unwrap();
        let b = VoronoiDiagram::with_options(&points, &[], 1.0, 1234).unwrap();
        assert_eq!(a.census().2, b.census().2);
        a.check_consistency();
        b.check_consistency();
    }

    #[test]
    fn single_segment_splits_into_halves() {
        let points = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }];
        let d = VoronoiDiagram::new(&points, &[[0, 1]]).unwrap();
        d.check_consistency();
        assert_eq!(d.halves.len(), 1);
        let (r, l) = d.halves[0];
        assert!(matches!(d.site(r), Site::Segment { split: true, .. }));
        assert!(matches!(d.site(l), Site::Segment { split: true, .. }));
        // the left half runs b → a
        match (d.site(r), d.site(l)) {
            (Site::Segment { line: lr, .. }, Site::Segment { line: ll, .. }) => {
                assert_eq!(lr.start, ll.end);
                assert_eq!(lr.end, ll.start);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn open_polyline_builds() {
        let points = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 5.0, y: 1.0 },
            coord! { x: 5.0, y: 9.0 },
        ];
        let d = VoronoiDiagram::new(&points, &[[0, 1], [1, 2], [2, 3]]).unwrap();
        d.check_consistency();
        assert_eq!(d.neighbours, vec![1, 2, 2, 1]);
    }

    #[test]
    fn unit_square_builds() {
        let points = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 0.0, y: 1.0 },
        ];
        let d = VoronoiDiagram::new(&points, &[[0, 1], [1, 2], [2, 3], [3, 0]]).unwrap();
        d.check_consistency();
        assert_eq!(d.halves.len(), 4);
    }

    #[test]
    fn crossing_segments_error_out() {
        let points = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 0.0, y: 1.0 },
        ];
        let r = VoronoiDiagram::new(&points, &[[0, 1], [2, 3]]);
        assert_eq!(r.unwrap_err(), crate::GeometryError::CrossingSegments);
    }
}
