use super::{Config, TIME_EPSILON};

/// Tracks the simulation time and the schedule of outputs, refinements, and saves
#[derive(Clone, Debug)]
pub struct Time {
    /// Final time
    pub t_fin: f64,

    /// Time step size
    pub dt: f64,

    /// Number of time steps between progress outputs (0 disables)
    pub output_interval: usize,

    /// Number of time steps between mesh adaptations (0 disables)
    pub refinement_interval: usize,

    /// Number of time steps between saving files (0 disables)
    pub save_interval: usize,

    /// Current time
    pub current: f64,

    /// Number of completed time steps
    pub timestep: usize,
}

impl Time {
    /// Allocates a new instance
    pub fn new(config: &Config) -> Self {
        Time {
            t_fin: config.t_fin,
            dt: config.dt,
            output_interval: config.output_interval,
            refinement_interval: config.refinement_interval,
            save_interval: config.save_interval,
            current: 0.0,
            timestep: 0,
        }
    }

    /// Advances the time by one step
    pub fn increment(&mut self) {
        self.current += self.dt;
        self.timestep += 1;
    }

    /// Returns true if there is simulation time left
    pub fn remaining(&self) -> bool {
        self.t_fin - self.current > TIME_EPSILON
    }

    /// Returns true if the mesh should be adapted at the current time step
    pub fn time_to_refine(&self) -> bool {
        Self::scheduled(self.refinement_interval, self.timestep)
    }

    /// Returns true if files should be saved at the current time step
    pub fn time_to_save(&self) -> bool {
        Self::scheduled(self.save_interval, self.timestep)
    }

    /// Returns true if the progress should be printed at the current time step
    pub fn time_to_output(&self) -> bool {
        Self::scheduled(self.output_interval, self.timestep)
    }

    fn scheduled(interval: usize, timestep: usize) -> bool {
        interval > 0 && timestep % interval == 0
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
