//! Triangle mesh analysis for STL surfaces.
//!
//! A triangle soup is welded into an indexed [`Mesh`], from which the edge/triangle
//! [`Topology`] is built. The winding is made consistent ([`normalize_orientation`]), normals and
//! areas computed ([`compute_normals_and_areas`]), and the surface is partitioned into near
//! coplanar faces ([`polygonize`]) and classified for print support ([`classify_support`]).
//! [`MeshAnalysis`] runs the stages in order.
//!
//! Reading and writing STL is behind the `io` feature (on by default).
use rustc_hash::FxHashMap as HashMap;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod analysis;
mod error;
mod extents;
#[cfg(feature = "io")]
pub mod io;
mod mesh;
mod normals;
mod orient;
mod params;
mod point;
mod polygonize;
mod support;
mod topology;

pub use analysis::*;
pub use error::*;
pub use extents::*;
pub use mesh::*;
pub use normals::*;
pub use orient::*;
pub use params::*;
pub use point::*;
pub use polygonize::*;
pub use support::*;
pub use topology::*;

/// Area can be calculated from an object.
///
/// Note that area is contextual from the object.
/// For instance, a [`Mesh`] is the _surface area_.
/// If implementing this trait be sure to be **explicit** about the area being calculated.
pub trait Area {
    /// Calculate the area of an object.
    fn area(&self) -> f64;
}

/// A closed unit cube, outward wound. Point `i` is at `[i & 1, (i >> 1) & 1, (i >> 2) & 1]`.
///
/// Triangles come in pairs per side: bottom, top, y = 0, y = 1, x = 0, x = 1.
#[cfg(test)]
fn unit_cube() -> Mesh {
    let points = (0..8u32)
        .map(|i| [i & 1, (i >> 1) & 1, (i >> 2) & 1].map(|x| x as f64))
        .collect();
    let triangles = vec![
        [0, 2, 1],
        [1, 2, 3],
        [4, 5, 6],
        [5, 7, 6],
        [0, 1, 5],
        [0, 5, 4],
        [2, 6, 7],
        [2, 7, 3],
        [0, 4, 6],
        [0, 6, 2],
        [1, 3, 7],
        [1, 7, 5],
    ];
    Mesh::from_raw(points, triangles)
}

/// An `n × n` grid of unit spacing with heights `zs[x + y * n]`, every normal points up.
#[cfg(test)]
fn heightfield(n: u32, zs: &[f64]) -> Mesh {
    let points = (0..n)
        .flat_map(|y| (0..n).map(move |x| (x, y)))
        .map(|(x, y)| [x as f64, y as f64, zs[(x + y * n) as usize]])
        .collect();
    let triangles = (0..n.saturating_sub(1))
        .flat_map(|y| (0..n - 1).map(move |x| x + y * n))
        .flat_map(|a| {
            let (b, c, d) = (a + 1, a + n, a + n + 1);
            [[a, b, d], [a, d, c]]
        })
        .collect();
    Mesh::from_raw(points, triangles)
}
