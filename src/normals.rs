use crate::*;
use rayon::prelude::*;

/// Per triangle normals and areas.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct FaceNormals {
    /// Unit normals.
    pub normals: Vec<Point3>,
    /// Triangle areas (half the length of the unnormalised normal).
    pub areas: Vec<f64>,
}

/// The unnormalised normal of a triangle: `(b - a) × (c - a)`.
///
/// The length is twice the area of the triangle.
pub fn raw_normal([a, b, c]: Tri) -> Point3 {
    xprod(b.sub(a), c.sub(a))
}

/// Compute the unit normal and area of every triangle.
///
/// Triangles are processed in parallel.
///
/// # Errors
/// Returns [`Error::DegenerateGeometry`] for the _first_ triangle whose normal has a length
/// below `f64::EPSILON` (collinear or coincident points), a NaN normal is never produced.
///
/// # Panics
/// Panics if a triangle references a point outside of `points`.
pub fn compute_normals_and_areas(points: &[Point3], triangles: &[TriIdx]) -> Result<FaceNormals> {
    let raw = triangles
        .par_iter()
        .map(|t| raw_normal(t.map(|i| points[i as usize])))
        .collect::<Vec<_>>();

    let mut normals = Vec::with_capacity(raw.len());
    let mut areas = Vec::with_capacity(raw.len());
    for (triangle, n) in raw.into_iter().enumerate() {
        let unit = n.try_unit().ok_or(Error::DegenerateGeometry { triangle })?;
        normals.push(unit);
        areas.push(n.mag() * 0.5);
    }

    Ok(FaceNormals { normals, areas })
}

impl FaceNormals {
    pub fn compute(mesh: &Mesh) -> Result<Self> {
        compute_normals_and_areas(mesh.points(), mesh.tri_indices())
    }

    pub fn len(&self) -> usize {
        self.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }

    pub fn total_area(&self) -> f64 {
        self.areas.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_normal_is_twice_area() {
        let n = raw_normal([[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 3.0, 0.0]]);
        assert_eq!(n, [0.0, 0.0, 6.0]);
    }

    #[test]
    fn cube_normals() {
        let cube = crate::unit_cube();
        let fnorms = FaceNormals::compute(&cube).unwrap();
        assert_eq!(fnorms.len(), 12);
        assert_eq!(fnorms.normals[0], [0.0, 0.0, -1.0]);
        assert_eq!(fnorms.normals[2], [0.0, 0.0, 1.0]);
        assert_eq!(fnorms.normals[10], [1.0, 0.0, 0.0]);
        assert!(fnorms.areas.iter().all(|&a| (a - 0.5).abs() < 1e-11));

        let x = fnorms.total_area() - 6.0;
        assert!(x.abs() < 1e-11);
    }

    #[test]
    fn degenerate_collinear() {
        let points = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0], [0.0, 1.0, 0.0]];
        let r = compute_normals_and_areas(&points, &[[0, 1, 3], [0, 1, 2]]);
        assert!(matches!(r, Err(Error::DegenerateGeometry { triangle: 1 })));
    }

    #[test]
    fn degenerate_coincident() {
        let points = [[1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [1.0, 2.0, 3.0]];
        let r = compute_normals_and_areas(&points, &[[0, 1, 2]]);
        assert!(matches!(r, Err(Error::DegenerateGeometry { triangle: 0 })));

        // repeated index
        let r = compute_normals_and_areas(&points[..1], &[[0, 0, 0]]);
        assert!(matches!(r, Err(Error::DegenerateGeometry { triangle: 0 })));
    }

    #[test]
    fn normals_never_nan() {
        let points = [[0.0, 0.0, 0.0], [1e-9, 0.0, 0.0], [0.0, 1e-9, 0.0]];
        match compute_normals_and_areas(&points, &[[0, 1, 2]]) {
            Ok(f) => assert!(f.normals.iter().flatten().all(|x| x.is_finite())),
            Err(e) => assert!(matches!(e, Error::DegenerateGeometry { .. })),
        }
    }
}
