// Tests the interop of STL data to mesh structures
use stlmesh::io::stl::*;
use stlmesh::*;

fn read(file: &str) -> Vec<u8> {
    std::fs::read(std::path::Path::new("test").join(file)).unwrap()
}

fn same(p1: Point3, p2: Point3) -> bool {
    p1.sub(p2).mag() < 1e-11
}

fn centroid([a, b, c]: Tri) -> Point3 {
    a.add(b).add(c).scale(1.0 / 3.0)
}

/// Binary STL of a triangle soup, normals left zeroed.
fn binary_soup(tris: &[Tri]) -> Vec<u8> {
    let mut b = vec![0u8; 80];
    b.extend((tris.len() as u32).to_le_bytes());
    for tri in tris {
        b.extend([0u8; 12]);
        for x in tri.iter().flatten() {
            b.extend((*x as f32).to_le_bytes());
        }
        b.extend([0u8; 2]);
    }
    b
}

// 'cube.stl' is a unit cube over [0,1]³, 12 facets, with the 6th facet wound inward.
#[test]
fn test_cube_stl_import() {
    let bytes = read("cube.stl");
    assert_eq!(detect_format(&bytes), StlFormat::Ascii);

    let mesh = read_stl("test/cube.stl").unwrap();
    assert_eq!(mesh.point_len(), 8);
    assert_eq!(mesh.tri_len(), 12);
    assert!(same(mesh.points()[1], [0.0, 1.0, 0.0]));
    assert_eq!(mesh.aabb(), Extents3::from_min_max([0.0; 3], [1.0; 3]));
    assert!((mesh.area() - 6.0).abs() < 1e-11);

    let topo = Topology::build(&mesh);
    assert_eq!(topo.edge_len(), 18);
    assert!(topo.is_closed_manifold());
    assert!(winding_conflicts(mesh.tri_indices(), &topo) > 0);
}

#[test]
fn test_cube_stl_analysis() {
    let a = MeshAnalysis::from_stl(&read("cube.stl"), AnalysisParams::default()).unwrap();

    assert_eq!(a.orientation().corrections, 1);
    assert_eq!(winding_conflicts(a.mesh().tri_indices(), a.topology()), 0);

    // every normal points away from the centre
    let centre = [0.5; 3];
    for (tri, n) in a.mesh().tris().zip(&a.normals().normals) {
        assert!(dot_prod(centroid(tri).sub(centre), *n) > 0.0);
    }

    assert_eq!(a.faces().len(), 6);
    let areas = a.faces().face_areas(&a.normals().areas);
    assert!(areas.iter().all(|x| (x - 1.0).abs() < 1e-11));

    assert_eq!(a.support().supported_count(), 2);
    assert!((a.support().supported_area - 1.0).abs() < 1e-11);
    assert!((a.support().total_area - 6.0).abs() < 1e-11);
    let x = a.support().supported_area + a.support().unsupported_area() - a.support().total_area;
    assert!(x.abs() < 1e-11);
}

#[test]
fn test_cube_stl_round_trip() {
    let mesh = read_stl("test/cube.stl").unwrap();

    let ascii = to_stl_ascii("cube", &mesh);
    assert_eq!(detect_format(&ascii), StlFormat::Ascii);
    assert_eq!(from_stl(&ascii).unwrap(), mesh);

    let binary = to_stl_binary(&mesh);
    assert_eq!(binary.len(), 84 + 50 * 12);
    assert_eq!(detect_format(&binary), StlFormat::Binary);
    assert_eq!(from_stl(&binary).unwrap(), mesh);
}

#[test]
fn format_detection() {
    assert_eq!(detect_format(b"solid x\n...\nendsolid x\n"), StlFormat::Ascii);
    assert_eq!(detect_format(&binary_soup(&[])), StlFormat::Binary);
    assert_eq!(
        detect_format(&binary_soup(&[[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]])),
        StlFormat::Binary
    );
    for len in 0..15 {
        assert_eq!(detect_format(&vec![b's'; len]), StlFormat::Invalid);
    }

    // 100 bytes claiming one facet (needs 134)
    let mut b = vec![0u8; 100];
    b[80..84].copy_from_slice(&1u32.to_le_bytes());
    assert_eq!(detect_format(&b), StlFormat::Invalid);
    assert!(matches!(from_stl(&b), Err(Error::UnrecognizedFormat(_))));
}

#[test]
fn binary_dedup() {
    // two facets sharing an edge, the shared vertices written twice
    let tris = [
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
    ];
    let mesh = from_stl(&binary_soup(&tris)).unwrap();
    assert_eq!(mesh.point_len(), 4);
    assert_eq!(mesh.tri_indices(), &[[0, 1, 2], [1, 3, 2]]);
}

#[test]
fn binary_truncated_is_malformed() {
    let tris = [[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]; 3];
    let b = binary_soup(&tris);
    let err = parse(&b[..b.len() - 10], StlFormat::Binary).unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { record: 2, .. }));
}

#[test]
fn ascii_dedup_tolerance_boundary() {
    fn stl(d: [f64; 3]) -> String {
        let [x, y, z] = d;
        format!(
            "solid t
facet normal 0 0 1
outer loop
vertex 0 0 0
vertex 1 0 0
vertex 0 1 0
endloop
endfacet
facet normal 0 0 1
outer loop
vertex {x} {y} {}
vertex 0 -1 0
vertex 1 0 0
endloop
endfacet
endsolid t
",
            z
        )
    }

    let mesh = from_stl(stl([0.99e-5; 3]).as_bytes()).unwrap();
    assert_eq!(mesh.point_len(), 4);
    assert_eq!(mesh.tri_indices()[1], [0, 3, 1]);

    for axis in 0..3 {
        let mut d = [0.0; 3];
        d[axis] = 1.01e-5;
        let mesh = from_stl(stl(d).as_bytes()).unwrap();
        assert_eq!(mesh.point_len(), 5);
        assert_eq!(mesh.tri_indices()[1], [3, 4, 1]);
    }
}

#[test]
fn split_face_polygonization() {
    // a cube side split in two plus the perpendicular side below it
    let tris = [
        [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]],
        [[0.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0]],
        [[0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
    ];
    let mesh = from_stl(&binary_soup(&tris)).unwrap();
    let params = AnalysisParams::default().with_merge_cos(1.0);
    let mut a = MeshAnalysis::run(mesh, params).unwrap();
    assert_eq!(a.faces().len(), 2);
    assert_eq!(a.faces().triangles(0), &[0, 1]);
    assert_eq!(a.faces().triangles(1), &[2, 3]);

    a.remerge(-1.0);
    assert_eq!(a.faces().len(), 1);
}

#[test]
fn degenerate_facet() {
    let tris = [
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        [[5.0, 5.0, 5.0], [6.0, 6.0, 6.0], [7.0, 7.0, 7.0]],
    ];
    let mesh = from_stl(&binary_soup(&tris)).unwrap();
    let r = MeshAnalysis::run(mesh, AnalysisParams::default());
    assert!(matches!(r, Err(Error::DegenerateGeometry { triangle: 1 })));
}
