//! Reference elements for nodal DG discretizations.
//!
//! A [`ReferenceElement`] bundles everything the mesh builders consume:
//! interpolation nodes, differentiation and interpolation matrices,
//! volume and face quadrature, and reference normals.

mod element;
mod quadrature;
mod shape;

pub use element::ReferenceElement;
pub use quadrature::{hex_quadrature, line_quadrature, quad_quadrature, triangle_quadrature};
pub use shape::ElementShape;
