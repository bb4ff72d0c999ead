use crate::*;
use rayon::prelude::*;

/// Which triangles need support material, and the areas involved.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct SupportReport {
    /// `true` if the triangle overhangs and needs support.
    pub flags: Vec<bool>,
    /// The summed area of flagged triangles.
    pub supported_area: f64,
    /// The summed area of all triangles.
    pub total_area: f64,
}

/// Flag the triangles that face down steeply enough to need support when printed.
///
/// A triangle is flagged if the `z` of its unit normal is below `-overhang_cos`. With the usual
/// 45° rule `overhang_cos` is `cos 45°` ([`OVERHANG_COS`]).
///
/// # Panics
/// Panics if `normals` and `areas` differ in length.
pub fn classify_support(normals: &[Point3], areas: &[f64], overhang_cos: f64) -> SupportReport {
    assert_eq!(
        normals.len(),
        areas.len(),
        "normals and areas do not match"
    );

    let flags = normals
        .par_iter()
        .map(|&[_, _, z]| z < -overhang_cos)
        .collect::<Vec<_>>();

    let (supported_area, total_area) =
        flags
            .iter()
            .zip(areas)
            .fold((0.0, 0.0), |(s, t), (&flag, &a)| {
                (if flag { s + a } else { s }, t + a)
            });

    log::debug!(
        "{} of {} triangles need support ({:.3} of {:.3} area)",
        flags.iter().filter(|&&x| x).count(),
        flags.len(),
        supported_area,
        total_area
    );

    SupportReport {
        flags,
        supported_area,
        total_area,
    }
}

impl SupportReport {
    pub fn unsupported_area(&self) -> f64 {
        self.total_area - self.supported_area
    }

    /// The fraction of the surface area which needs support.
    ///
    /// `None` if the total area is not positive.
    pub fn supported_fraction(&self) -> Option<f64> {
        (self.total_area > 0.0).then(|| self.supported_area / self.total_area)
    }

    /// Number of flagged triangles.
    pub fn supported_count(&self) -> usize {
        self.flags.iter().filter(|&&x| x).count()
    }
}
