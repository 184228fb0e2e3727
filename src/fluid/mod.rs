//! Implements the fluid side of the coupling and a prescribed (analytical) flow

mod fluid_solver;
mod prescribed_flow;
pub use crate::fluid::fluid_solver::*;
pub use crate::fluid::prescribed_flow::*;
