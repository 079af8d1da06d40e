//! An index-based corner table for the triangulation underlying the diagram.
//!
//! Nodes are triangles of three cells; an edge is one corner of a triangle
//! (encoded as `3·node + slot`). For a node holding counter-clockwise cells
//! `(c0, c1, c2)`, the edge at slot `i` has `tail = cᵢ`, `head = cᵢ₊₁` and
//! `left = cᵢ₊₂`; its `opposite` is the corner of the adjacent node across
//! the side `{head, left}`, so `head` and `left` swap across `opposite` and
//! `left(opposite(e)) = head(e)` whenever the cells are distinct.
//!
//! All references are plain indices into the owning table; there are no
//! pointer cycles to manage.

/// A site index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct Cell(pub u32);

/// A triangle index (a Voronoi vertex in the dual reading).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct Node(pub u32);

/// A corner index (a directed Voronoi edge in the dual reading).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct Edge(pub u32);

impl Cell {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Node {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Edge {
    const NONE: Edge = Edge(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

const STAR_CAP: usize = 10_000;

#[derive(Clone, Debug)]
pub(crate) struct CornerTable {
    cells_of: Vec<[Cell; 3]>,
    opposite: Vec<Edge>,
    anyedge: Vec<Edge>,
}

impl CornerTable {
    pub fn new(num_cells: usize) -> Self {
        CornerTable {
            cells_of: Vec::new(),
            opposite: Vec::new(),
            anyedge: vec![Edge::NONE; num_cells],
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.cells_of.len()
    }

    pub fn num_edges(&self) -> usize {
        self.opposite.len()
    }

    pub fn num_cells(&self) -> usize {
        self.anyedge.len()
    }

    pub fn add_cell(&mut self) -> Cell {
        self.anyedge.push(Edge::NONE);
        Cell(self.anyedge.len() as u32 - 1)
    }

    pub fn node(&self, e: Edge) -> Node {
        Node(e.0 / 3)
    }

    pub fn side(&self, q: Node, i: usize) -> Edge {
        Edge(q.0 * 3 + i as u32)
    }

    pub fn next(&self, e: Edge) -> Edge {
        Edge(e.0 - e.0 % 3 + (e.0 % 3 + 1) % 3)
    }

    pub fn prev(&self, e: Edge) -> Edge {
        Edge(e.0 - e.0 % 3 + (e.0 % 3 + 2) % 3)
    }

    pub fn cells(&self, q: Node) -> [Cell; 3] {
        self.cells_of[q.index()]
    }

    pub fn tail(&self, e: Edge) -> Cell {
        self.cells_of[(e.0 / 3) as usize][(e.0 % 3) as usize]
    }

    pub fn head(&self, e: Edge) -> Cell {
        self.tail(self.next(e))
    }

    pub fn left(&self, e: Edge) -> Cell {
        self.tail(self.prev(e))
    }

    pub fn opposite(&self, e: Edge) -> Edge {
        self.opposite[e.index()]
    }

    pub fn set_opposite(&mut self, e: Edge, f: Edge) {
        self.opposite[e.index()] = f;
        self.opposite[f.index()] = e;
    }

    pub fn anyedge(&self, c: Cell) -> Edge {
        let e = self.anyedge[c.index()];
        debug_assert!(e != Edge::NONE, "cell without an edge");
        e
    }

    pub fn set_anyedge(&mut self, c: Cell, e: Edge) {
        debug_assert!(self.tail(e) == c);
        self.anyedge[c.index()] = e;
    }

    /// Next outgoing edge counter-clockwise around `tail(e)`.
    pub fn swing(&self, e: Edge) -> Edge {
        self.prev(self.opposite(self.prev(e)))
    }

    /// All outgoing edges of `c`, one per incident node, in swing order.
    pub fn star(&self, c: Cell) -> Vec<Edge> {
        let start = self.anyedge(c);
        let mut out = vec![start];
        let mut e = self.swing(start);
        while e != start {
            assert!(out.len() < STAR_CAP, "unclosed star around {c:?}");
            debug_assert!(self.tail(e) == c);
            out.push(e);
            e = self.swing(e);
        }
        out
    }

    /// Next edge counter-clockwise along the region ring of `left(e)`.
    pub fn ring_ccw(&self, e: Edge) -> Edge {
        self.prev(self.opposite(e))
    }

    /// Next edge clockwise along the region ring of `left(e)`.
    pub fn ring_cw(&self, e: Edge) -> Edge {
        self.opposite(self.next(e))
    }

    pub fn new_node(&mut self, cells: [Cell; 3]) -> Node {
        self.cells_of.push(cells);
        self.opposite.extend([Edge::NONE; 3]);
        Node(self.cells_of.len() as u32 - 1)
    }

    pub fn set_cells(&mut self, q: Node, cells: [Cell; 3]) {
        self.cells_of[q.index()] = cells;
    }

    /// Swap one cell of a node for another (used when splitting segment
    /// cells into their two oriented halves).
    pub fn replace_cell_in_node(&mut self, q: Node, from: Cell, to: Cell) {
        let cells = &mut self.cells_of[q.index()];
        let slot = cells
            .iter()
            .position(|&c| c == from)
            .expect("cell not in node");
        cells[slot] = to;
    }

    /// Splay node `q` into three nodes sharing the new cell `c`.
    ///
    /// Returns the three edges at `c` whose sides are the former sides of
    /// `q`; their opposites are the untouched outside neighbours.
    pub fn insert(&mut self, q: Node, c: Cell) -> [Edge; 3] {
        let [a, b, d] = self.cells(q);
        let o_a = self.opposite(self.side(q, 0));
        let o_b = self.opposite(self.side(q, 1));
        let o_d = self.opposite(self.side(q, 2));

        let t0 = q;
        self.set_cells(t0, [a, b, c]);
        let t1 = self.new_node([b, d, c]);
        let t2 = self.new_node([d, a, c]);

        let (e0, e1, e2) = (self.side(t0, 2), self.side(t1, 2), self.side(t2, 2));
        self.set_opposite(e0, o_d);
        self.set_opposite(e1, o_a);
        self.set_opposite(e2, o_b);
        self.set_opposite(self.side(t0, 0), self.side(t1, 1));
        self.set_opposite(self.side(t0, 1), self.side(t2, 0));
        self.set_opposite(self.side(t1, 0), self.side(t2, 1));

        self.set_anyedge(a, self.side(t0, 0));
        self.set_anyedge(b, self.side(t1, 0));
        self.set_anyedge(d, self.side(t2, 0));
        self.set_anyedge(c, e0);

        [e0, e1, e2]
    }

    /// Diagonal flip of the side `{head(e), left(e)}` shared by `node(e)`
    /// and `node(opposite(e))`.
    ///
    /// Returns the two edges at `tail(e)` whose sides were the far sides of
    /// the removed neighbour triangle.
    pub fn flip(&mut self, e: Edge) -> [Edge; 2] {
        let f = self.opposite(e);
        let q = self.node(e);
        let qq = self.node(f);
        debug_assert!(q != qq);

        let t = self.tail(e);
        let h = self.head(e);
        let l = self.left(e);
        let tt = self.tail(f);
        debug_assert!(self.head(f) == l && self.left(f) == h);

        let a = self.opposite(self.next(e));
        let b = self.opposite(self.prev(e));
        let c = self.opposite(self.next(f));
        let d = self.opposite(self.prev(f));
        debug_assert!([a, b, c, d]
            .iter()
            .all(|&x| self.node(x) != q && self.node(x) != qq));

        self.set_cells(q, [t, h, tt]);
        self.set_cells(qq, [tt, l, t]);

        self.set_opposite(self.side(q, 0), c);
        self.set_opposite(self.side(q, 1), self.side(qq, 1));
        self.set_opposite(self.side(q, 2), b);
        self.set_opposite(self.side(qq, 0), a);
        self.set_opposite(self.side(qq, 2), d);

        self.set_anyedge(t, self.side(q, 0));
        self.set_anyedge(h, self.side(q, 1));
        self.set_anyedge(tt, self.side(qq, 0));
        self.set_anyedge(l, self.side(qq, 1));

        [self.side(q, 0), self.side(qq, 2)]
    }

    /// Structural invariants; aborts on violation. Called from tests and
    /// after construction in debug builds.
    pub fn check(&self) {
        for i in 0..self.num_edges() {
            let e = Edge(i as u32);
            let f = self.opposite(e);
            assert!(f != Edge::NONE, "unpaired edge {e:?}");
            assert!(self.opposite(f) == e, "opposite is not an involution");
            if self.head(e) != self.left(e) {
                assert!(
                    self.left(f) == self.head(e) && self.head(f) == self.left(e),
                    "side cells do not swap across opposite"
                );
            }
        }
        for q in 0..self.num_nodes() {
            let [a, b, c] = self.cells(Node(q as u32));
            assert!(a != b && b != c && a != c, "node with repeated cells");
        }
        for c in 0..self.num_cells() {
            let e = self.anyedge[c];
            if e != Edge::NONE {
                assert!(self.tail(e) == Cell(c as u32), "stale anyedge");
            }
        }
    }

    /// `(nodes, half_edges, cells)` for the Euler count
    /// `nodes − edges/2 + cells = 2`.
    pub fn census(&self) -> (usize, usize, usize) {
        (self.num_nodes(), self.num_edges(), self.num_cells())
    }
}
