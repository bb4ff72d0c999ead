use crate::*;

/// Triangle represented by 3 points (A, B, C).
pub type Tri = [Point3; 3];

/// Triangle represented by 3 indices back into the mesh points.
///
/// The _order_ is the winding, the outward normal follows the right hand rule.
pub type TriIdx = [u32; 3];

/// An indexed triangle mesh.
///
/// `PartialEq` is _derived_ but does _exact_ equality including structural equality. This is
/// **not** the same as value equality (it is a _subset_ of it) so `PartialEq` should not be used
/// for value equality.
#[derive(Debug, PartialEq, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Mesh {
    /// The _distinct_ points.
    points: Vec<Point3>,
    /// Each _triangle_ is a triplet of points.
    ///
    /// Each entry is the _index_ back into the `points`.
    triangles: Vec<TriIdx>,
}

impl Mesh {
    /// Build a mesh from already indexed data. No welding is done.
    ///
    /// # Panics
    /// Panics if a triangle references a point which does not exist.
    pub fn from_raw(points: Vec<Point3>, triangles: Vec<TriIdx>) -> Self {
        let len = points.len();
        for (i, t) in triangles.iter().enumerate() {
            assert!(
                t.iter().all(|&x| (x as usize) < len),
                "triangle {i} {t:?} references a point outside of 0..{len}"
            );
        }

        Self { points, triangles }
    }

    pub fn decompose(self) -> (Vec<Point3>, Vec<TriIdx>) {
        let Self { points, triangles } = self;
        (points, triangles)
    }

    pub fn point_len(&self) -> usize {
        self.points.len()
    }

    pub fn tri_len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn tri_indices(&self) -> &[TriIdx] {
        &self.triangles
    }

    /// The triangle indices, mutable.
    ///
    /// Only for passes which _permute_ the indices of a triangle (orientation), anything
    /// invalidating the edge set must rebuild the [`Topology`].
    pub(crate) fn tri_indices_mut(&mut self) -> &mut [TriIdx] {
        &mut self.triangles
    }

    /// Fetch the points of triangle `idx`.
    pub fn tri(&self, idx: usize) -> Tri {
        self.triangles[idx].map(|i| self.points[i as usize])
    }

    pub fn tris(&self) -> impl ExactSizeIterator<Item = Tri> + '_ {
        self.triangles
            .iter()
            .map(move |t| t.map(|i| self.points[i as usize]))
    }

    /// Append a triangle soup, welding each point against the existing points using the
    /// default [`WELD_TOLERANCE`].
    pub fn extend(&mut self, tris: impl Iterator<Item = Tri>) {
        self.extend_with_tolerance(tris, WELD_TOLERANCE)
    }

    /// Append a triangle soup, welding each point into an existing point if it is within
    /// `tolerance` on _every_ axis.
    ///
    /// A `tolerance` which is not positive disables welding.
    pub fn extend_with_tolerance(&mut self, tris: impl Iterator<Item = Tri>, tolerance: f64) {
        weld::extend(self, tris, tolerance)
    }

    /// Reverse the winding of every triangle.
    pub fn flip_all(&mut self) {
        for t in &mut self.triangles {
            t.swap(1, 2);
        }
    }
}

impl FromIterator<Tri> for Mesh {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Tri>,
    {
        let mut t = Mesh::default();
        t.extend(iter.into_iter());
        t
    }
}

/// The _surface area_ of the mesh.
impl Area for Mesh {
    fn area(&self) -> f64 {
        self.tris()
            .map(|[a, b, c]| xprod(b.sub(a), c.sub(a)).mag() * 0.5)
            .sum()
    }
}

impl Aabb for Mesh {
    type Space = Point3;
    fn aabb(&self) -> Extents3 {
        self.points().iter().copied().collect()
    }
}

/// Same point, with tolerance on each axis.
fn same_point(a: Point3, b: Point3, tolerance: f64) -> bool {
    a.xfm(b, |a, b| (a - b).abs())
        .into_iter()
        .all(|f| f < tolerance)
}

mod weld {
    use super::*;

    type Cell = [i64; 3];

    /// Spatial hash of the points with cells of `tolerance` size.
    ///
    /// Any point within tolerance (per axis) of `p` lives in the cell of `p` or one of the 26
    /// neighbouring cells.
    struct Welder {
        tolerance: f64,
        cells: HashMap<Cell, Vec<u32>>,
    }

    impl Welder {
        fn new(points: &[Point3], tolerance: f64) -> Self {
            let mut w = Welder {
                tolerance,
                cells: HashMap::with_capacity_and_hasher(points.len(), Default::default()),
            };
            for (i, p) in points.iter().enumerate() {
                w.insert(*p, i as u32);
            }
            w
        }

        fn cell(&self, p: Point3) -> Cell {
            // `as` saturates, non-finite points end up in the outer cells
            p.map(|x| (x / self.tolerance).floor() as i64)
        }

        fn insert(&mut self, p: Point3, idx: u32) {
            let cell = self.cell(p);
            self.cells.entry(cell).or_default().push(idx);
        }

        /// Finds the _lowest_ index within tolerance, the same point a linear scan finds.
        fn find(&self, points: &[Point3], p: Point3) -> Option<u32> {
            let [cx, cy, cz] = self.cell(p);
            let mut found: Option<u32> = None;
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let cell = [
                            cx.saturating_add(dx),
                            cy.saturating_add(dy),
                            cz.saturating_add(dz),
                        ];
                        let Some(idxs) = self.cells.get(&cell) else { continue; };
                        let hit = idxs
                            .iter()
                            .copied()
                            .filter(|&i| same_point(points[i as usize], p, self.tolerance))
                            .min();
                        found = match (found, hit) {
                            (Some(a), Some(b)) => Some(a.min(b)),
                            (a, b) => a.or(b),
                        };
                    }
                }
            }
            found
        }
    }

    pub fn extend(mesh: &mut Mesh, tris: impl Iterator<Item = Tri>, tolerance: f64) {
        let weld = tolerance > 0.0 && tolerance.is_finite();
        let mut welder = Welder::new(if weld { mesh.points.as_slice() } else { &[] }, tolerance);

        let Mesh { points, triangles } = mesh;

        let mut get_or_add = |p: Point3| {
            if weld {
                if let Some(i) = welder.find(points, p) {
                    return i;
                }
            }
            let i = points.len() as u32;
            points.push(p);
            if weld {
                welder.insert(p, i);
            }
            i
        };

        for [a, b, c] in tris {
            let t = [get_or_add(a), get_or_add(b), get_or_add(c)];
            triangles.push(t);
        }
    }
}
