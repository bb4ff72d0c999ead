use crate::*;

pub type Extents3 = Extents<Point3>;

/// An axis aligned bounding box, stored as the minimum corner (`origin`) and the `size`.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Extents<P> {
    pub origin: P,
    pub size: P,
}

impl<P> Extents<P>
where
    P: Copy + Point + Add,
{
    pub fn zero() -> Self {
        Self {
            origin: P::zero(),
            size: P::zero(),
        }
    }

    pub fn from_min_max(min: P, max: P) -> Self {
        let size = max.sub(min);

        Self { origin: min, size }
    }

    pub fn max(&self) -> P {
        self.origin.add(self.size)
    }

    pub fn centre(&self) -> P {
        self.origin.add(self.size.scale(0.5))
    }

    pub fn union(self, other: Self) -> Self {
        let origin = self.origin.min_all(other.origin);
        let max = self.max().max_all(other.max());
        let size = max.sub(origin);

        Self { origin, size }
    }

    /// The uniform scale which brings the largest dimension of the box down to unit length.
    ///
    /// The scale never magnifies (it is at most `1.0`). Dimensions no larger than
    /// `f64::EPSILON` are ignored.
    /// A viewer multiplies by this (after translating by [`Self::centre`]) to fit the model.
    ///
    /// # Example
    /// ```rust
    /// # use stlmesh::*;
    /// let e = Extents3::from_min_max([0.0, 0.0, 0.0], [4.0, 2.0, 0.0]);
    /// assert_eq!(e.fit_scale(), 0.25);
    ///
    /// let e = Extents3::from_min_max([1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
    /// assert_eq!(e.fit_scale(), 1.0);
    /// ```
    pub fn fit_scale(&self) -> f64 {
        self.size
            .into_iter()
            .filter(|&d| d > f64::EPSILON)
            .map(f64::recip)
            .fold(1.0, f64::min)
    }
}

impl FromIterator<Point3> for Extents3 {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Point3>,
    {
        let mut iter = iter.into_iter();
        let Some(init) = iter.next() else { return Self::zero(); };

        let (min, max) = iter.fold((init, init), |(min, max), p| {
            (min.min_all(p), max.max_all(p))
        });

        Self::from_min_max(min, max)
    }
}

pub trait Aabb {
    type Space;

    fn aabb(&self) -> Extents<Self::Space>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    type P3 = (f64, f64, f64);

    fn to_p(p: P3) -> Point3 {
        [p.0, p.1, p.2]
    }

    #[quickcheck]
    fn from_iter_holds_all_points(pts: Vec<P3>) -> TestResult {
        let pts = pts.into_iter().map(to_p).collect::<Vec<_>>();
        if pts.is_empty() || pts.iter().flatten().any(|x| !x.is_finite() || x.abs() > 1e100) {
            return TestResult::discard();
        }

        let e = pts.iter().copied().collect::<Extents3>();
        let [x0, y0, z0] = e.origin;
        let [x1, y1, z1] = e.max();
        let inside = pts.iter().all(|&[x, y, z]| {
            x >= x0 && y >= y0 && z >= z0 && x <= x1 + 1e-9 * x1.abs().max(1.0)
                && y <= y1 + 1e-9 * y1.abs().max(1.0)
                && z <= z1 + 1e-9 * z1.abs().max(1.0)
        });

        TestResult::from_bool(inside)
    }

    #[test]
    fn empty_iter_is_zero() {
        let e = std::iter::empty::<Point3>().collect::<Extents3>();
        assert_eq!(e, Extents3::zero());
    }

    #[test]
    fn union_test() {
        let a = Extents3::from_min_max([0.0; 3], [1.0; 3]);
        let b = Extents3::from_min_max([-1.0, 0.5, 0.5], [0.5, 3.0, 0.5]);
        let u = a.union(b);
        assert_eq!(u.origin, [-1.0, 0.0, 0.0]);
        assert_eq!(u.max(), [1.0, 3.0, 1.0]);
        assert_eq!(u.centre(), [0.0, 1.5, 0.5]);
    }

    #[test]
    fn fit_scale_test() {
        let e = Extents3::from_min_max([0.0; 3], [10.0, 20.0, 5.0]);
        let x = e.fit_scale() - 0.05;
        assert!(x.abs() < 1e-11);

        // a flat model ignores the zero dimension
        let e = Extents3::from_min_max([0.0; 3], [0.5, 0.25, 0.0]);
        assert_eq!(e.fit_scale(), 1.0);

        let e = Extents3::from_min_max([0.0; 3], [2.0, 0.25, 0.0]);
        assert_eq!(e.fit_scale(), 0.5);
    }
}
