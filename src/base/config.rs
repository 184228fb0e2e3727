use crate::StrError;
use russell_sparse::Genie;
use std::fmt;

/// Holds configuration data for the solid solver and the coupling loop
pub struct Config {
    /// Space dimension (2 means plane-strain)
    pub ndim: usize,

    /// Time step size Δt
    pub dt: f64,

    /// Final time
    pub t_fin: f64,

    /// Number of time steps between progress outputs (0 disables)
    pub output_interval: usize,

    /// Number of time steps between fluid mesh adaptations (0 disables)
    pub refinement_interval: usize,

    /// Number of time steps between saving the solid state (0 disables)
    pub save_interval: usize,

    /// Maximum number of Newton-Raphson iterations per time step
    pub n_max_iterations: usize,

    /// Tolerance on the normalized norm of the Newton update
    pub tol_u: f64,

    /// Tolerance on the normalized norm of the residual
    pub tol_f: f64,

    /// Dynamic viscosity of the fluid
    pub viscosity: f64,

    /// Gravity acceleration vector (ndim)
    pub gravity: Vec<f64>,

    /// Minimum refinement level of the fluid mesh
    pub min_mesh_level: usize,

    /// Maximum refinement level of the fluid mesh
    pub max_mesh_level: usize,

    /// Distance to the nearest solid cell center below which fluid cells are refined
    pub refinement_distance: f64,

    /// Number of integration (Gauss) points of the solid cells (None means default)
    pub ngauss: Option<usize>,

    /// Dynamics (Newmark) instead of quasi-static analysis
    pub dynamics: bool,

    /// Newmark β coefficient
    pub newmark_beta: f64,

    /// Newmark γ coefficient
    pub newmark_gamma: f64,

    /// Linear solver type
    pub lin_sol_genie: Genie,

    /// Show messages for each time step
    pub verbose_timesteps: bool,

    /// Show messages for each Newton-Raphson iteration
    pub verbose_iterations: bool,

    /// Directory for the output files (None disables writing files)
    pub out_dir: Option<String>,

    /// Filename stem of the output files
    pub fn_stem: String,
}

impl Config {
    /// Allocates a new instance with default values
    pub fn new(ndim: usize) -> Self {
        Config {
            ndim,
            dt: 0.01,
            t_fin: 1.0,
            output_interval: 1,
            refinement_interval: 0,
            save_interval: 0,
            n_max_iterations: 10,
            tol_u: 1e-6,
            tol_f: 1e-6,
            viscosity: 1.0,
            gravity: vec![0.0; ndim],
            min_mesh_level: 0,
            max_mesh_level: 2,
            refinement_distance: 0.1,
            ngauss: None,
            dynamics: false,
            newmark_beta: 0.25,
            newmark_gamma: 0.5,
            lin_sol_genie: Genie::Umfpack,
            verbose_timesteps: false,
            verbose_iterations: false,
            out_dir: None,
            fn_stem: "fsisim".to_string(),
        }
    }

    /// Sets the time step size and final time
    pub fn set_time(&mut self, dt: f64, t_fin: f64) -> Result<&mut Self, StrError> {
        if dt <= 0.0 {
            return Err("dt must be > 0.0");
        }
        if t_fin < 0.0 {
            return Err("t_fin must be ≥ 0.0");
        }
        self.dt = dt;
        self.t_fin = t_fin;
        Ok(self)
    }

    /// Sets the output, refinement, and save intervals (in number of time steps)
    pub fn set_intervals(&mut self, output: usize, refinement: usize, save: usize) -> &mut Self {
        self.output_interval = output;
        self.refinement_interval = refinement;
        self.save_interval = save;
        self
    }

    /// Sets the Newton-Raphson parameters
    pub fn set_newton(&mut self, n_max_iterations: usize, tol_u: f64, tol_f: f64) -> Result<&mut Self, StrError> {
        if n_max_iterations < 1 {
            return Err("n_max_iterations must be ≥ 1");
        }
        if tol_u <= 0.0 || tol_f <= 0.0 {
            return Err("tolerances must be > 0.0");
        }
        self.n_max_iterations = n_max_iterations;
        self.tol_u = tol_u;
        self.tol_f = tol_f;
        Ok(self)
    }

    /// Sets the fluid viscosity
    pub fn set_viscosity(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value < 0.0 {
            return Err("viscosity must be ≥ 0.0");
        }
        self.viscosity = value;
        Ok(self)
    }

    /// Sets the gravity acceleration vector
    pub fn set_gravity(&mut self, gravity: &[f64]) -> Result<&mut Self, StrError> {
        if gravity.len() != self.ndim {
            return Err("gravity vector must have ndim components");
        }
        self.gravity = gravity.to_vec();
        Ok(self)
    }

    /// Sets the minimum and maximum refinement levels of the fluid mesh
    pub fn set_mesh_levels(&mut self, min_level: usize, max_level: usize) -> Result<&mut Self, StrError> {
        if max_level < min_level {
            return Err("max_mesh_level must be ≥ min_mesh_level");
        }
        self.min_mesh_level = min_level;
        self.max_mesh_level = max_level;
        Ok(self)
    }

    /// Sets the proximity threshold driving the refinement of the fluid mesh
    pub fn set_refinement_distance(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value <= 0.0 {
            return Err("refinement_distance must be > 0.0");
        }
        self.refinement_distance = value;
        Ok(self)
    }

    /// Sets the number of integration points of the solid cells
    pub fn set_ngauss(&mut self, ngauss: Option<usize>) -> &mut Self {
        self.ngauss = ngauss;
        self
    }

    /// Enables dynamics with the Newmark method
    pub fn set_dynamics(&mut self, beta: f64, gamma: f64) -> Result<&mut Self, StrError> {
        if beta <= 0.0 || beta > 0.5 {
            return Err("Newmark β must satisfy 0 < β ≤ 0.5");
        }
        if gamma < 0.5 || gamma > 1.0 {
            return Err("Newmark γ must satisfy 0.5 ≤ γ ≤ 1.0");
        }
        self.dynamics = true;
        self.newmark_beta = beta;
        self.newmark_gamma = gamma;
        Ok(self)
    }

    /// Sets the linear solver
    pub fn set_lin_sol_genie(&mut self, genie: Genie) -> &mut Self {
        self.lin_sol_genie = genie;
        self
    }

    /// Sets the verbosity flags
    pub fn set_verbose(&mut self, timesteps: bool, iterations: bool) -> &mut Self {
        self.verbose_timesteps = timesteps;
        self.verbose_iterations = iterations;
        self
    }

    /// Sets the output directory and filename stem
    pub fn set_output(&mut self, out_dir: &str, fn_stem: &str) -> &mut Self {
        self.out_dir = Some(out_dir.to_string());
        self.fn_stem = fn_stem.to_string();
        self
    }

    /// Returns the path of the file with the solid state at a given time step
    pub fn path_solid_state(&self, timestep: usize) -> Option<String> {
        self.out_dir
            .as_ref()
            .map(|dir| format!("{}/{}-solid-{:0>20}.json", dir, self.fn_stem, timestep))
    }

    /// Returns the Newmark coefficients (α₁, α₂, α₃, α₄, α₅, α₆)
    ///
    /// ```text
    /// α₁ = 1/(β Δt²)   α₂ = 1/(β Δt)   α₃ = 1/(2β) - 1
    /// α₄ = γ/(β Δt)    α₅ = γ/β - 1     α₆ = (γ/(2β) - 1) Δt
    /// ```
    pub fn newmark_coefficients(&self) -> (f64, f64, f64, f64, f64, f64) {
        let (beta, gamma, dt) = (self.newmark_beta, self.newmark_gamma, self.dt);
        (
            1.0 / (beta * dt * dt),
            1.0 / (beta * dt),
            1.0 / (2.0 * beta) - 1.0,
            gamma / (beta * dt),
            gamma / beta - 1.0,
            (gamma / (2.0 * beta) - 1.0) * dt,
        )
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.ndim != 2 && self.ndim != 3 {
            return Some(format!("ndim = {:?} is incorrect; it must be 2 or 3", self.ndim));
        }
        if self.dt <= 0.0 {
            return Some(format!("dt = {:?} is incorrect; it must be > 0.0", self.dt));
        }
        if self.n_max_iterations < 1 {
            return Some(format!(
                "n_max_iterations = {:?} is incorrect; it must be ≥ 1",
                self.n_max_iterations
            ));
        }
        if self.tol_u <= 0.0 {
            return Some(format!("tol_u = {:?} is incorrect; it must be > 0.0", self.tol_u));
        }
        if self.tol_f <= 0.0 {
            return Some(format!("tol_f = {:?} is incorrect; it must be > 0.0", self.tol_f));
        }
        if self.gravity.len() != self.ndim {
            return Some(format!(
                "gravity has {:?} components; it must have ndim = {:?}",
                self.gravity.len(),
                self.ndim
            ));
        }
        if self.max_mesh_level < self.min_mesh_level {
            return Some(format!(
                "max_mesh_level = {:?} is incorrect; it must be ≥ min_mesh_level = {:?}",
                self.max_mesh_level, self.min_mesh_level
            ));
        }
        None
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration data\n").unwrap();
        write!(f, "==================\n").unwrap();
        write!(f, "ndim = {:?}\n", self.ndim).unwrap();
        write!(f, "dt = {:?}\n", self.dt).unwrap();
        write!(f, "t_fin = {:?}\n", self.t_fin).unwrap();
        write!(f, "n_max_iterations = {:?}\n", self.n_max_iterations).unwrap();
        write!(f, "tol_u = {:?}\n", self.tol_u).unwrap();
        write!(f, "tol_f = {:?}\n", self.tol_f).unwrap();
        write!(f, "viscosity = {:?}\n", self.viscosity).unwrap();
        write!(f, "gravity = {:?}\n", self.gravity).unwrap();
        write!(f, "mesh_levels = {:?}\n", (self.min_mesh_level, self.max_mesh_level)).unwrap();
        write!(f, "dynamics = {:?}\n", self.dynamics).unwrap();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
