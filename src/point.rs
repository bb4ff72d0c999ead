use std::ops;

pub trait Point: Copy + Sized + IntoIterator<Item = f64> {
    /// Set all the values to this value.
    fn all(v: f64) -> Self;

    /// Set all values to zero.
    fn zero() -> Self {
        Self::all(0.)
    }

    /// Scale point by multiplying all dimensions by `scalar`.
    fn scale(self, scalar: f64) -> Self;

    /// Calculate the magnitude of the vector.
    fn mag(self) -> f64 {
        self.into_iter()
            .zip(self)
            .map(|(a, b)| a * b)
            .sum::<f64>()
            .sqrt()
    }

    /// Normalise the vector by the magnitude.
    ///
    /// A zero length vector produces NaNs, use [`Point::try_unit`] if the vector could be
    /// degenerate.
    fn unit(self) -> Self {
        self.scale(self.mag().recip())
    }

    /// Normalise the vector by the magnitude, returning `None` if the magnitude is below
    /// `f64::EPSILON` (or is not finite).
    fn try_unit(self) -> Option<Self> {
        let m = self.mag();
        (m.is_finite() && m >= f64::EPSILON).then(|| self.scale(m.recip()))
    }

    /// Return the minimum of each dimension.
    fn min_all(self, b: Self) -> Self {
        xfm(self, b, f64::min)
    }

    /// Return the maximum of each dimension.
    fn max_all(self, b: Self) -> Self {
        xfm(self, b, f64::max)
    }

    /// Return the maximum value of all dimensions.
    fn max_of(self) -> f64 {
        self.into_iter().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Perform a transformation on each pair of dimensions.
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self;
}

pub trait Add<Rhs = Self> {
    fn add(self, rhs: Rhs) -> Self;
    fn sub(self, rhs: Rhs) -> Self
    where
        Self: Sized + Copy,
        Rhs: Point,
    {
        self.add(rhs.scale(-1.0))
    }
}

/// 3D Point (X,Y,Z).
///
/// Doubles as a vector (displacements and surface normals).
pub type Point3 = [f64; 3];

impl Add for Point3 {
    fn add(self, rhs: Self) -> Self {
        Self::xfm(self, rhs, ops::Add::add)
    }

    fn sub(self, rhs: Self) -> Self {
        Self::xfm(self, rhs, ops::Sub::sub)
    }
}
impl Point for Point3 {
    fn all(v: f64) -> Self {
        [v; 3]
    }
    fn scale(self, scalar: f64) -> Self {
        self.map(|f| f * scalar)
    }
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self {
        let [ax, ay, az] = self;
        let [bx, by, bz] = b;
        [f(ax, bx), f(ay, by), f(az, bz)]
    }
}

pub fn dot_prod(a: Point3, b: Point3) -> f64 {
    a.into_iter().zip(b).map(|(a, b)| a * b).sum()
}

#[allow(clippy::many_single_char_names)]
pub fn xprod(a: Point3, b: Point3) -> Point3 {
    let [ax, ay, az] = a;
    let [bx, by, bz] = b;
    let x = ay * bz - az * by;
    let y = az * bx - ax * bz;
    let z = ax * by - ay * bx;
    [x, y, z]
}

/// Helper function which effectively transforms to [`Point::xfm`].
#[inline(always)]
pub fn xfm<P: Point, F: Fn(f64, f64) -> f64>(a: P, b: P, f: F) -> P {
    P::xfm(a, b, f)
}
