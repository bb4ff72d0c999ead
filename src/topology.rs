use crate::*;

/// An edge between two points, _directed_ as it was first seen.
///
/// Equality is directed, use [`Edge::key`] to match edges regardless of direction.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Edge(pub u32, pub u32);

impl Edge {
    #[inline(always)]
    pub fn ord(self) -> Self {
        if self.0 <= self.1 {
            self
        } else {
            Edge(self.1, self.0)
        }
    }

    /// An undirected key, both directions of an edge produce the same key.
    #[inline(always)]
    pub fn key(self) -> u64 {
        let Edge(a, b) = self.ord();
        ((a as u64) << 32) | b as u64
    }

    pub fn rev(self) -> Self {
        Edge(self.1, self.0)
    }
}

/// The three edges of a triangle, in triangle-local order: `(0,1)`, `(1,2)`, `(2,0)`.
pub fn edges_of(t: TriIdx) -> [Edge; 3] {
    let [a, b, c] = t;
    [Edge(a, b), Edge(b, c), Edge(c, a)]
}

/// Edge and adjacency tables of a triangle list.
///
/// Edges, triangles, (and points) are referenced by dense `u32` ids into flat tables.
/// The tables are _derived_ data; if the triangle list changes structurally the topology
/// must be rebuilt.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Topology {
    /// Unique edges, directed as first seen.
    edges: Vec<Edge>,
    /// triangle -> 3 edge ids, in triangle-local order.
    tri_edges: Vec<[u32; 3]>,
    /// edge -> triangle ids, in the order they were seen.
    edge_tris: Vec<Vec<u32>>,
}

/// Build the edge and adjacency tables.
///
/// # Panics
/// Panics if a triangle references a point outside of `points`.
pub fn build_topology(points: &[Point3], triangles: &[TriIdx]) -> Topology {
    let len = points.len();
    let mut lookup: HashMap<u64, u32> =
        HashMap::with_capacity_and_hasher(triangles.len() * 3 / 2, Default::default());

    let mut topo = Topology {
        edges: Vec::with_capacity(triangles.len() * 3 / 2),
        tri_edges: Vec::with_capacity(triangles.len()),
        edge_tris: Vec::with_capacity(triangles.len() * 3 / 2),
    };

    for (ti, &t) in triangles.iter().enumerate() {
        assert!(
            t.iter().all(|&x| (x as usize) < len),
            "triangle {ti} {t:?} references a point outside of 0..{len}"
        );

        let Topology {
            edges, edge_tris, ..
        } = &mut topo;

        let ids = edges_of(t).map(|e| {
            let id = *lookup.entry(e.key()).or_insert_with(|| {
                edges.push(e);
                edge_tris.push(Vec::with_capacity(2));
                (edges.len() - 1) as u32
            });
            edge_tris[id as usize].push(ti as u32);
            id
        });

        topo.tri_edges.push(ids);
    }

    topo.edges.shrink_to_fit();
    topo.edge_tris.shrink_to_fit();

    log::debug!(
        "built topology: {} triangles, {} edges",
        topo.tri_len(),
        topo.edge_len()
    );

    topo
}

impl Topology {
    pub fn build(mesh: &Mesh) -> Self {
        build_topology(mesh.points(), mesh.tri_indices())
    }

    pub fn tri_len(&self) -> usize {
        self.tri_edges.len()
    }

    pub fn edge_len(&self) -> usize {
        self.edges.len()
    }

    /// The unique edges, each directed as first seen.
    ///
    /// This doubles as the line list for drawing a wireframe.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, edge: u32) -> Edge {
        self.edges[edge as usize]
    }

    /// The edge ids of a triangle, in triangle-local order.
    pub fn tri_edges(&self, tri: u32) -> [u32; 3] {
        self.tri_edges[tri as usize]
    }

    /// The triangles sharing an edge. One for a boundary edge, two for a manifold edge, more for
    /// a non-manifold edge.
    pub fn edge_tris(&self, edge: u32) -> &[u32] {
        &self.edge_tris[edge as usize]
    }

    /// Iterate the `(edge, neighbour)` pairs of triangle `tri`.
    ///
    /// A neighbour sharing more than one edge is yielded once per shared edge.
    pub fn neighbours(&self, tri: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.tri_edges(tri).into_iter().flat_map(move |e| {
            self.edge_tris(e)
                .iter()
                .copied()
                .filter(move |&n| n != tri)
                .map(move |n| (e, n))
        })
    }

    /// Edges used by only one triangle.
    pub fn boundary_edges(&self) -> impl Iterator<Item = u32> + '_ {
        self.edges_with(|n| n == 1)
    }

    /// Edges used by more than two triangles.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = u32> + '_ {
        self.edges_with(|n| n > 2)
    }

    /// Every edge is shared by exactly two triangles.
    pub fn is_closed_manifold(&self) -> bool {
        self.edge_tris.iter().all(|x| x.len() == 2)
    }

    fn edges_with<F>(&self, pred: F) -> impl Iterator<Item = u32> + '_
    where
        F: Fn(usize) -> bool + 'static,
    {
        self.edge_tris
            .iter()
            .enumerate()
            .filter(move |(_, ts)| pred(ts.len()))
            .map(|(i, _)| i as u32)
    }

    /// Refresh the triangle-local edge order of `tri` after its indices were permuted to `t`.
    ///
    /// The edge _set_ of the triangle must be unchanged.
    pub(crate) fn reorder_tri_edges(&mut self, tri: u32, t: TriIdx) {
        let old = self.tri_edges[tri as usize];
        let new = edges_of(t).map(|e| {
            let k = e.key();
            old.into_iter()
                .find(|&id| self.edges[id as usize].key() == k)
                .expect("permuting a triangle keeps its edge set")
        });
        self.tri_edges[tri as usize] = new;
    }
}
