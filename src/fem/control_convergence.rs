use crate::base::Config;
use crate::StrError;
use russell_lab::Vector;

/// Holds a pair of error norms
///
/// * `norm` -- Euclidean norm over all free (unconstrained) equations
/// * `u` -- Euclidean norm over the free displacement equations
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConvergenceError {
    pub norm: f64,
    pub u: f64,
}

impl ConvergenceError {
    /// Computes the norms of a global vector, skipping the prescribed equations
    pub fn new(vector: &Vector, prescribed: &[bool]) -> Self {
        let mut sum = 0.0;
        for eq in 0..vector.dim() {
            if !prescribed[eq] {
                sum += vector[eq] * vector[eq];
            }
        }
        // all equations are displacement equations
        let norm = f64::sqrt(sum);
        ConvergenceError { norm, u: norm }
    }

    /// Returns these errors divided by a baseline (a zero baseline yields zero)
    pub fn normalized(&self, baseline: &ConvergenceError) -> Self {
        let ratio = |value: f64, base: f64| if base == 0.0 { 0.0 } else { value / base };
        ConvergenceError {
            norm: ratio(self.norm, baseline.norm),
            u: ratio(self.u, baseline.u),
        }
    }

    /// Returns true if any norm is NaN or Inf
    pub fn not_finite(&self) -> bool {
        !self.norm.is_finite() || !self.u.is_finite()
    }
}

/// Controls the convergence of Newton-Raphson iterations
///
/// The residual and update errors are normalized by the values recorded at iteration 0.
pub struct ControlConvergence<'a> {
    config: &'a Config,
    iteration: usize,
    error_residual: ConvergenceError,
    error_residual_0: ConvergenceError,
    error_residual_norm: ConvergenceError,
    error_update: ConvergenceError,
    error_update_0: ConvergenceError,
    error_update_norm: ConvergenceError,
    n_iterations_total: usize,
}

impl<'a> ControlConvergence<'a> {
    /// Allocates a new instance
    pub fn new(config: &'a Config) -> Self {
        ControlConvergence {
            config,
            iteration: 0,
            error_residual: ConvergenceError::default(),
            error_residual_0: ConvergenceError::default(),
            error_residual_norm: ConvergenceError::default(),
            error_update: ConvergenceError::default(),
            error_update_0: ConvergenceError::default(),
            error_update_norm: ConvergenceError::default(),
            n_iterations_total: 0,
        }
    }

    /// Resets all errors for a new time step
    pub fn reset(&mut self) {
        self.iteration = 0;
        self.error_residual = ConvergenceError::default();
        self.error_residual_0 = ConvergenceError::default();
        self.error_residual_norm = ConvergenceError::default();
        self.error_update = ConvergenceError::default();
        self.error_update_0 = ConvergenceError::default();
        self.error_update_norm = ConvergenceError::default();
    }

    /// Analyzes the residual vector
    ///
    /// Returns an error if NaN or Inf values are detected
    pub(crate) fn analyze_residual(&mut self, iteration: usize, rr: &Vector, prescribed: &[bool]) -> Result<(), StrError> {
        self.iteration = iteration;
        self.error_residual = ConvergenceError::new(rr, prescribed);
        if self.error_residual.not_finite() {
            return Err("found NaN or Inf in the residual vector");
        }
        if iteration == 0 {
            self.error_residual_0 = self.error_residual;
        }
        self.error_residual_norm = self.error_residual.normalized(&self.error_residual_0);
        Ok(())
    }

    /// Analyzes the Newton update (the solution of the linear system)
    ///
    /// Returns an error if NaN or Inf values are detected
    pub(crate) fn analyze_update(&mut self, iteration: usize, mdu: &Vector, prescribed: &[bool]) -> Result<(), StrError> {
        self.error_update = ConvergenceError::new(mdu, prescribed);
        if self.error_update.not_finite() {
            return Err("found NaN or Inf in the solution of the linear system");
        }
        if iteration == 0 {
            self.error_update_0 = self.error_update;
        }
        self.error_update_norm = self.error_update.normalized(&self.error_update_0);
        self.n_iterations_total += 1;
        Ok(())
    }

    /// Returns true if the baseline residual (at iteration 0) is exactly zero
    pub fn zero_residual_baseline(&self) -> bool {
        self.iteration == 0 && self.error_residual_0.norm == 0.0
    }

    /// Returns true if both normalized errors are within the tolerances (iteration > 0 only)
    pub fn converged(&self) -> bool {
        self.iteration > 0
            && self.error_update_norm.norm <= self.config.tol_u
            && self.error_residual_norm.norm <= self.config.tol_f
    }

    /// Returns the normalized residual error
    pub fn error_residual_norm(&self) -> ConvergenceError {
        self.error_residual_norm
    }

    /// Returns the normalized update error
    pub fn error_update_norm(&self) -> ConvergenceError {
        self.error_update_norm
    }

    /// Returns the total number of linear solves performed so far
    pub fn n_iterations_total(&self) -> usize {
        self.n_iterations_total
    }

    /// Prints the header of the table with the iterations of a time step
    pub fn print_header(&self) {
        if self.config.verbose_iterations {
            println!("{}", "─".repeat(80));
            println!(
                "{:>5} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                "iter", "lin_it", "lin_res", "res_norm", "res_u", "nu_norm", "nu_u", "status"
            );
            println!("{}", "─".repeat(80));
        }
    }

    /// Prints the time step information
    pub fn print_timestep(&self, timestep: usize, t: f64, dt: f64) {
        if self.config.verbose_timesteps {
            println!("Timestep {:>6}  t = {:>11.6e}  Δt = {:>11.6e}", timestep, t, dt);
        }
    }

    /// Prints the errors of an iteration
    pub fn print_iteration(&self, lin_it: usize, lin_res: f64) {
        if self.config.verbose_iterations {
            let status = if self.converged() { "✅" } else { "🔹" };
            println!(
                "{:>5} {:>6} {:>10.3e} {:>10.3e} {:>10.3e} {:>10.3e} {:>10.3e} {:>10}",
                self.iteration,
                lin_it,
                lin_res,
                self.error_residual_norm.norm,
                self.error_residual_norm.u,
                self.error_update_norm.norm,
                self.error_update_norm.u,
                status
            );
        }
    }

    /// Prints the final (relative and absolute) errors of a time step
    pub fn print_footer(&self) {
        if self.config.verbose_iterations {
            println!("{}", "─".repeat(80));
            println!(
                "Relative errors: displacement = {:.3e}, force = {:.3e}",
                self.error_update_norm.u, self.error_residual_norm.u
            );
            println!(
                "Absolute errors: displacement = {:.3e}, force = {:.3e}",
                self.error_update.u, self.error_residual.u
            );
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
