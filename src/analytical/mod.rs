//! This module contains analytical solutions to some problems or reference solutions for testing and verifications

mod plane_strain_stretch;

pub use plane_strain_stretch::*;
