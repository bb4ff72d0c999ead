use crate::*;
use std::collections::VecDeque;

/// Slack on the merge cosine so that exactly co-normal triangles always merge, even with a
/// threshold of `1.0`.
pub const COS_TOLERANCE: f64 = 1e-12;

const UNASSIGNED: u32 = u32::MAX;

/// A partition of the triangles into _faces_: connected regions of near coplanar triangles.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Faces {
    /// triangle -> face id.
    tri_face: Vec<u32>,
    /// face id -> triangles, in the order they were reached.
    faces: Vec<Vec<u32>>,
}

/// Greedily merge adjacent triangles into faces.
///
/// Triangles are seeded in id order. From a seed, a breadth first traversal over shared edges
/// accepts any unassigned neighbour whose unit normal has a dot product of at least `merge_cos`
/// with the triangle it was reached from. The partition depends on the seed order; it is
/// deterministic for a given input.
///
/// - `merge_cos = -1` accepts any angle, so each connected component becomes one face.
/// - `merge_cos = 1` only merges co-normal triangles.
///
/// # Panics
/// Panics if `topology` or `normals` do not match `triangles`.
pub fn polygonize(
    triangles: &[TriIdx],
    topology: &Topology,
    normals: &[Point3],
    merge_cos: f64,
) -> Faces {
    let n = triangles.len();
    assert_eq!(n, topology.tri_len(), "topology does not match triangles");
    assert_eq!(n, normals.len(), "normals do not match triangles");

    let mut tri_face = vec![UNASSIGNED; n];
    let mut faces = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..n as u32 {
        if tri_face[seed as usize] != UNASSIGNED {
            continue;
        }

        let face = faces.len() as u32;
        let mut members = vec![seed];
        tri_face[seed as usize] = face;
        queue.push_back(seed);

        while let Some(t) = queue.pop_front() {
            let nt = normals[t as usize];
            for (_, b) in topology.neighbours(t) {
                if tri_face[b as usize] != UNASSIGNED {
                    continue;
                }
                if dot_prod(nt, normals[b as usize]) >= merge_cos - COS_TOLERANCE {
                    tri_face[b as usize] = face;
                    members.push(b);
                    queue.push_back(b);
                }
            }
        }

        faces.push(members);
    }

    log::debug!(
        "polygonized {} triangles into {} faces (merge cos {})",
        n,
        faces.len(),
        merge_cos
    );

    Faces { tri_face, faces }
}

impl Faces {
    /// Number of faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn face_of(&self, tri: u32) -> u32 {
        self.tri_face[tri as usize]
    }

    pub fn triangles(&self, face: u32) -> &[u32] {
        &self.faces[face as usize]
    }

    /// The face id of each triangle.
    pub fn tri_faces(&self) -> &[u32] {
        &self.tri_face
    }

    pub fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    /// The summed triangle area of each face.
    pub fn face_areas(&self, areas: &[f64]) -> Vec<f64> {
        self.faces
            .iter()
            .map(|ts| ts.iter().map(|&t| areas[t as usize]).sum())
            .collect()
    }

    /// The area weighted mean unit normal of each face.
    ///
    /// `None` if the normals of a face cancel out (possible with very loose merge tolerances).
    pub fn face_normals(&self, normals: &[Point3], areas: &[f64]) -> Vec<Option<Point3>> {
        self.faces
            .iter()
            .map(|ts| {
                ts.iter()
                    .map(|&t| normals[t as usize].scale(areas[t as usize]))
                    .fold(Point3::zero(), Point3::add)
                    .try_unit()
            })
            .collect()
    }
}
