/// Default welding tolerance, in model units, applied per axis.
pub const WELD_TOLERANCE: f64 = 1e-5;

/// Default cosine for merging triangles into a face (≈25.8°).
pub const MERGE_COS: f64 = 0.9;

/// Default overhang cosine (cos 45°).
pub const OVERHANG_COS: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// The tunable parameters of the analysis pipeline.
///
/// Angles are stored as cosines since that is what the stages compare against.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Points closer than this on _every_ axis are welded together.
    pub weld_tolerance: f64,
    /// Adjacent triangles with normalised normals whose dot product is at least this belong to
    /// the same face.
    pub merge_cos: f64,
    /// A triangle needs support if its normalised normal has `z < -overhang_cos`.
    pub overhang_cos: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            weld_tolerance: WELD_TOLERANCE,
            merge_cos: MERGE_COS,
            overhang_cos: OVERHANG_COS,
        }
    }
}

impl AnalysisParams {
    pub fn with_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.weld_tolerance = tolerance;
        self
    }

    pub fn with_merge_cos(mut self, cos: f64) -> Self {
        self.merge_cos = cos;
        self
    }

    pub fn with_overhang_cos(mut self, cos: f64) -> Self {
        self.overhang_cos = cos;
        self
    }

    /// Set the merge tolerance from an angle between normals, in degrees.
    pub fn merge_angle_deg(self, degrees: f64) -> Self {
        self.with_merge_cos(degrees.to_radians().cos())
    }

    /// Set the overhang threshold in degrees: surfaces whose normal is within this angle of
    /// straight down need support. `45.0` is the usual rule of thumb for FDM printing.
    pub fn overhang_angle_deg(self, degrees: f64) -> Self {
        self.with_overhang_cos(degrees.to_radians().cos())
    }
}
