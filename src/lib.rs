//! Fsisim -- partitioned fluid-structure interaction with hyperelastic solids
//!
//! The solid is advanced by a Newton-Raphson finite element solver over Neo-Hookean
//! quadrature-point states; the fluid is an external collaborator reached through the
//! [fluid::FluidSolver] trait; [fsi::Fsi] exchanges data between the two meshes and
//! drives the partitioned time loop.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

/// Defines a function of (x,t) where x is space and t is time
pub type FnSpaceTime = fn(&[f64], f64) -> f64;

/// Defines a vector function of (x,t) writing its result into the first argument
pub type FnVecSpaceTime = fn(&mut [f64], &[f64], f64);

pub mod analytical;
pub mod base;
pub mod fem;
pub mod fluid;
pub mod fsi;
pub mod material;
pub mod prelude;
