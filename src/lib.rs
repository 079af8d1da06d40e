//! The `voronoi-offset` crate computes planar Voronoi diagrams generalized to
//! line-segment sites, and uses them to answer polygonal offset and axial
//! extrusion queries.
//!
//! # Types
//!
//! - **[`VoronoiDiagram`]**: the incremental point/segment Voronoi diagram,
//!   built once from a batch of sites and then frozen
//! - **[`OffsetDiagram`]**: a frozen diagram prepared for offset queries at
//!   arbitrary signed radii
//! - **[`Separator`]**: the parametrized bisector of two sites (line,
//!   parabola arc, half-line pair, or parallel strip midline)
//! - **[`Branch`]**: one of the two infinite halves of a separator
//! - **[`ExtrudedMesh`]**: an indexed triangle mesh produced by sweeping a
//!   profile along a trajectory
//!
//! Coordinates use [`geo_types::Coord`]; offset chains are returned as
//! [`geo_types::LineString`]s.
//!
//! # Functions
//!
//! - **[`offset`]**: the offset of a point/segment figure at one signed radius
//! - **[`offset_many`]**: offsets at several radii, sharing one diagram
//! - **[`extrude`]**: sweep a closed `(r, z)` profile along a trajectory,
//!   producing one triangle mesh per profile loop
//!
//! # Example
//!
//! ```
//! use geo_types::coord;
//! use voronoi_offset::offset;
//!
//! // a unit square, offset outward by one half
//! let points = vec![
//!     coord! { x: 0.0, y: 0.0 },
//!     coord! { x: 1.0, y: 0.0 },
//!     coord! { x: 1.0, y: 1.0 },
//!     coord! { x: 0.0, y: 1.0 },
//! ];
//! let segments = vec![[0, 1], [1, 2], [2, 3], [3, 0]];
//! let rings = offset(&points, &segments, 0.5, 1e-2).unwrap();
//! assert_eq!(rings.len(), 1);
//! assert!(rings[0].is_closed());
//! ```
//!
//! # Errors
//!
//! Invalid input surfaces as [`GeometryError`]: crossing segments, a point
//! site inside a segment, parallel lines where an intersection was assumed,
//! or a parallel-bisector degeneracy that is detected and reported rather
//! than resolved. Internal consistency violations abort via assertions.

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate approx;

use geo_types::CoordFloat;

pub use crate::diagram::{Site, VoronoiDiagram};
pub use crate::error::{GeometryError, Result};
pub use crate::extrude::{extrude, ExtrudedMesh};
pub use crate::offset::{offset, offset_many, OffsetDiagram};
pub use crate::separator::{Branch, Separator};
pub use crate::tripoint::{tripoint, Tripoint};

pub(crate) mod corner_table;
pub mod diagram;
mod error;
pub mod extrude;
pub mod kernel;
pub mod offset;
pub mod separator;
pub mod tripoint;

/// A common numeric trait for the diagram and its queries.
///
/// Everything in this crate is generic over the coordinate scalar. If you are
/// writing a function generic over the scalars supported here, constrain it
/// to `VoronoiFloat`; `f32` and `f64` both qualify.
pub trait VoronoiFloat:
    CoordFloat
    + num_traits::Signed
    + num_traits::Bounded
    + num_traits::FloatConst
    + approx::AbsDiffEq<Epsilon = Self>
    + approx::RelativeEq
{
}

impl<T> VoronoiFloat for T where
    T: CoordFloat
        + num_traits::Signed
        + num_traits::Bounded
        + num_traits::FloatConst
        + approx::AbsDiffEq<Epsilon = Self>
        + approx::RelativeEq
{
}
