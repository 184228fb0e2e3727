//! Implements the finite element method for hyperelastic solids

mod bc_fsi;
mod control_convergence;
mod element_solid;
mod elements;
mod linear_system;
mod point_locator;
mod solid_solver;
mod solid_state;
pub use crate::fem::bc_fsi::*;
pub use crate::fem::control_convergence::*;
pub use crate::fem::element_solid::*;
pub use crate::fem::elements::*;
pub use crate::fem::linear_system::*;
pub use crate::fem::point_locator::*;
pub use crate::fem::solid_solver::*;
pub use crate::fem::solid_state::*;
