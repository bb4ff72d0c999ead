use crate::*;

/// A mesh and everything derived from it, computed stage by stage.
///
/// ```text
/// topology -> orientation -> normals/areas -> faces
///                                          -> support
/// ```
///
/// Each stage reads the outputs of the stages before it. Tuning the merge or overhang threshold
/// only recomputes the affected stage ([`MeshAnalysis::remerge`], [`MeshAnalysis::reclassify`]).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshAnalysis {
    params: AnalysisParams,
    mesh: Mesh,
    topology: Topology,
    orientation: OrientationReport,
    normals: FaceNormals,
    faces: Faces,
    support: SupportReport,
}

impl MeshAnalysis {
    /// Run every stage over `mesh`.
    ///
    /// The mesh's triangles are re-wound to be consistent with triangle 0 (per component).
    ///
    /// # Errors
    /// Returns [`Error::DegenerateGeometry`] if a triangle has no measurable normal.
    pub fn run(mut mesh: Mesh, params: AnalysisParams) -> Result<Self> {
        let mut topology = Topology::build(&mesh);
        let orientation = normalize_orientation(mesh.tri_indices_mut(), &mut topology);
        let normals = FaceNormals::compute(&mesh)?;
        let faces = polygonize(
            mesh.tri_indices(),
            &topology,
            &normals.normals,
            params.merge_cos,
        );
        let support = classify_support(&normals.normals, &normals.areas, params.overhang_cos);

        Ok(Self {
            params,
            mesh,
            topology,
            orientation,
            normals,
            faces,
            support,
        })
    }

    /// Parse an STL buffer (welding with `params.weld_tolerance`) and run every stage.
    #[cfg(feature = "io")]
    pub fn from_stl(bytes: &[u8], params: AnalysisParams) -> Result<Self> {
        let format = io::stl::detect_format(bytes);
        let mesh = io::stl::parse_with_tolerance(bytes, format, params.weld_tolerance)?;
        Self::run(mesh, params)
    }

    /// Recompute the faces with a new merge threshold.
    pub fn remerge(&mut self, merge_cos: f64) {
        self.params.merge_cos = merge_cos;
        self.faces = polygonize(
            self.mesh.tri_indices(),
            &self.topology,
            &self.normals.normals,
            merge_cos,
        );
    }

    /// Recompute the support classification with a new overhang threshold.
    pub fn reclassify(&mut self, overhang_cos: f64) {
        self.params.overhang_cos = overhang_cos;
        self.support = classify_support(&self.normals.normals, &self.normals.areas, overhang_cos);
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// The consistently wound mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn orientation(&self) -> &OrientationReport {
        &self.orientation
    }

    pub fn normals(&self) -> &FaceNormals {
        &self.normals
    }

    pub fn faces(&self) -> &Faces {
        &self.faces
    }

    pub fn support(&self) -> &SupportReport {
        &self.support
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}
