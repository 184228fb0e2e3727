//! Makes available common structures needed to run a simulation
//!
//! You may write `use fsisim::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{Config, Dof, Essential, ParamSolid, SampleMeshes, Time, DEFAULT_OUT_DIR, DEFAULT_TEST_DIR};
pub use crate::fem::{NewtonStage, SolidSolver, SolidState};
pub use crate::fluid::{CouplingPoint, FluidCoupling, FluidField, FluidSolver, PrescribedFlow, RefineFlag};
pub use crate::fsi::Fsi;
pub use crate::material::{MaterialModel, QuadraturePointState};
pub use crate::{FnSpaceTime, FnVecSpaceTime, StrError};
