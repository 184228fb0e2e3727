//! Implements the hyperelastic material models and the quadrature point states

mod material_model;
mod neo_hookean;
mod quadrature_point_state;
pub use crate::material::material_model::*;
pub use crate::material::neo_hookean::*;
pub use crate::material::quadrature_point_state::*;
