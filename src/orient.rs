use crate::*;
use std::collections::VecDeque;

/// Summary of an orientation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct OrientationReport {
    /// Number of triangles which had their winding reversed.
    pub corrections: usize,
    /// Number of connected components visited (each is seeded at its lowest triangle id).
    pub components: usize,
    /// Edges shared by more than two triangles, where consistency is best effort.
    pub non_manifold_edges: usize,
}

/// Does triangle `t` traverse the directed edge `a -> b`?
fn traverses(t: TriIdx, a: u32, b: u32) -> bool {
    edges_of(t).contains(&Edge(a, b))
}

/// Reverse the winding of `t` by swapping the positions of `a` and `b`.
fn flip_on_edge(t: &mut TriIdx, a: u32, b: u32) {
    let i = t.iter().position(|&x| x == a);
    let j = t.iter().position(|&x| x == b);
    if let (Some(i), Some(j)) = (i, j) {
        t.swap(i, j);
    }
}

/// Make the winding of connected triangles consistent.
///
/// Triangle 0 is the reference. A breadth first traversal over shared edges reverses any
/// neighbour which runs along the shared edge in the _same_ direction as the (already
/// consistent) triangle it was reached from. Once the component of triangle 0 is exhausted the
/// traversal is seeded again at the lowest unvisited triangle.
///
/// `topology` is kept valid: the triangle-local edge order of a reversed triangle is refreshed.
///
/// Edges shared by more than two triangles are only resolved between the visiting triangle and
/// each not yet visited neighbour, so non-manifold fans may be left inconsistent.
///
/// # Panics
/// Panics if `topology` was not built from `triangles`.
pub fn normalize_orientation(
    triangles: &mut [TriIdx],
    topology: &mut Topology,
) -> OrientationReport {
    assert_eq!(
        triangles.len(),
        topology.tri_len(),
        "topology was built from a different triangle list"
    );

    let mut report = OrientationReport {
        non_manifold_edges: topology.non_manifold_edges().count(),
        ..Default::default()
    };

    if report.non_manifold_edges > 0 {
        log::warn!(
            "{} non-manifold edges, orientation is best effort",
            report.non_manifold_edges
        );
    }

    let mut visited = vec![false; triangles.len()];
    let mut queue = VecDeque::new();
    let mut buf = Vec::new();

    for seed in 0..triangles.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        report.components += 1;
        queue.push_back(seed as u32);

        while let Some(a) = queue.pop_front() {
            buf.clear();
            buf.extend(topology.neighbours(a));

            for &(e, b) in &buf {
                if visited[b as usize] {
                    continue;
                }
                visited[b as usize] = true;

                let Edge(v0, v1) = topology.edge(e);
                let ta = triangles[a as usize];
                let tb = &mut triangles[b as usize];
                if traverses(ta, v0, v1) == traverses(*tb, v0, v1) {
                    flip_on_edge(tb, v0, v1);
                    topology.reorder_tri_edges(b, *tb);
                    report.corrections += 1;
                }

                queue.push_back(b);
            }
        }
    }

    log::debug!(
        "orientation: {} corrections over {} components",
        report.corrections,
        report.components
    );

    report
}

/// Count the edges which are traversed in the same direction by more than one triangle.
///
/// A consistently wound manifold mesh has no conflicts.
pub fn winding_conflicts(triangles: &[TriIdx], topology: &Topology) -> usize {
    (0..topology.edge_len() as u32)
        .filter(|&e| {
            let Edge(a, b) = topology.edge(e);
            let (fwd, bwd) = topology
                .edge_tris(e)
                .iter()
                .map(|&t| triangles[t as usize])
                .fold((0, 0), |(f, r), t| {
                    (
                        f + traverses(t, a, b) as usize,
                        r + traverses(t, b, a) as usize,
                    )
                });
            fwd > 1 || bwd > 1
        })
        .count()
}
