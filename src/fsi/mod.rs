//! Implements the coordinator of the partitioned fluid-structure interaction

mod coordinator;
pub use crate::fsi::coordinator::*;
