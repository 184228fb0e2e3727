use super::{BcFsi, ControlConvergence, Elements, LinearSystem, SolidState};
use crate::base::{Config, Dof, Essential, FnTime, ParamSolid};
use crate::StrError;
use gemlab::mesh::Mesh;

/// Defines the stages of the Newton-Raphson iterations of one time step
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NewtonStage {
    /// Time advanced, prescribed increments applied, states updated
    Initialized,

    /// Computing the residual vector (and the Jacobian matrix)
    Assembling,

    /// Solving the linear system and updating the quadrature point states
    Solving,

    /// The residual and update errors are within the tolerances
    Converged,

    /// The maximum number of iterations has been reached
    Diverged,
}

/// Implements the nonlinear (Newton-Raphson) solver for hyperelastic solids
///
/// The reference mesh is never modified; all integrals are evaluated over the
/// reference configuration with the spatial gradients computed from F.
pub struct SolidSolver<'a> {
    /// Holds the configuration parameters
    pub config: &'a Config,

    /// Holds the reference mesh
    pub mesh: &'a Mesh,

    /// Holds the material parameters
    pub param: ParamSolid,

    /// Indicates which equations are prescribed (n_equation)
    pub prescribed: Vec<bool>,

    /// Holds the prescribed equations and their functions of time
    prescribed_values: Vec<(usize, FnTime)>,

    /// Holds all solid elements
    pub elements: Elements,

    /// Holds the tractions exerted by the fluid
    pub bc_fsi: BcFsi,

    /// Holds the global linear system
    pub linear_system: LinearSystem<'a>,

    /// Holds the state (displacements, velocities, and accelerations)
    pub state: SolidState,

    /// Holds the current stage of the Newton-Raphson iterations
    pub stage: NewtonStage,

    /// Controls the convergence of the iterations
    control: ControlConvergence<'a>,
}

impl<'a> SolidSolver<'a> {
    /// Allocates a new instance
    pub fn new(mesh: &'a Mesh, param: &ParamSolid, config: &'a Config, essential: &Essential) -> Result<Self, StrError> {
        if let Some(msg) = config.validate() {
            println!("ERROR: {}", msg);
            return Err("cannot allocate the solid solver because config.validate() failed");
        }
        if mesh.ndim != config.ndim {
            return Err("the mesh ndim must be equal to config.ndim");
        }
        let ndim = mesh.ndim;
        let n_equation = ndim * mesh.points.len();
        let mut prescribed = vec![false; n_equation];
        let mut prescribed_values = Vec::new();
        for (point_id, dof) in essential.keys_sorted() {
            if point_id >= mesh.points.len() {
                return Err("cannot find the point of an essential boundary condition");
            }
            let eq = dof.equation(ndim, point_id)?;
            prescribed[eq] = true;
            prescribed_values.push((eq, essential.all[&(point_id, dof)]));
        }
        let elements = Elements::new(mesh, param, config)?;
        let bc_fsi = BcFsi::new(mesh, &prescribed)?;
        let linear_system = LinearSystem::new(n_equation, config, &elements)?;
        Ok(SolidSolver {
            config,
            mesh,
            param: param.clone(),
            prescribed,
            prescribed_values,
            elements,
            bc_fsi,
            linear_system,
            state: SolidState::new(n_equation, config.dt),
            stage: NewtonStage::Initialized,
            control: ControlConvergence::new(config),
        })
    }

    /// Returns the total number of equations
    pub fn n_equation(&self) -> usize {
        self.prescribed.len()
    }

    /// Returns the displacement of a point (ndim components)
    pub fn point_displacement(&self, point_id: usize) -> Vec<f64> {
        let ndim = self.mesh.ndim;
        Dof::displacements(ndim)
            .iter()
            .map(|dof| self.state.uu[dof.index() + ndim * point_id])
            .collect()
    }

    /// Advances the solid by one time step
    ///
    /// Returns the number of Newton-Raphson iterations. If the iterations do not converge,
    /// the time and displacements are restored to the values of the previous step.
    pub fn run_one_step(&mut self, first_step: bool) -> Result<usize, StrError> {
        let (_, a2, a3, _, a5, a6) = self.config.newmark_coefficients();
        let dt = self.config.dt;
        self.state.dt = dt;
        self.state.t += dt;
        self.state.timestep += 1;

        // Newmark auxiliary variables
        if self.config.dynamics {
            for eq in 0..self.n_equation() {
                self.state.aa_star[eq] = -a2 * self.state.vv[eq] - a3 * self.state.aa[eq];
                self.state.vv_star[eq] = -a5 * self.state.vv[eq] - a6 * self.state.aa[eq];
            }
        }

        // prescribed increments at the new time
        self.state.duu.fill(0.0);
        for (eq, f) in &self.prescribed_values {
            self.state.duu[*eq] = f(self.state.t) - self.state.uu[*eq];
        }
        self.elements.update_states_parallel(&self.state)?;
        self.control.reset();
        self.stage = NewtonStage::Initialized;

        // message
        if first_step {
            self.control.print_header();
        }
        self.control.print_timestep(self.state.timestep, self.state.t, dt);

        match self.solve_nonlinear_timestep() {
            Ok(n_iterations) => {
                self.accept_timestep();
                Ok(n_iterations)
            }
            Err(err) => {
                self.state.t -= dt;
                self.state.timestep -= 1;
                self.state.duu.fill(0.0);
                // the states must be consistent with uu again
                if let Err(restore) = self.elements.update_states_parallel(&self.state) {
                    println!("WARNING: cannot restore the quadrature point states: {}", restore);
                }
                Err(err)
            }
        }
    }

    /// Runs the Newton-Raphson iterations of the current time step
    ///
    /// Returns the number of iterations performed.
    pub fn solve_nonlinear_timestep(&mut self) -> Result<usize, StrError> {
        for iteration in 0..self.config.n_max_iterations {
            // residual vector
            self.stage = NewtonStage::Assembling;
            self.assemble_residual()?;

            // check convergence
            self.control
                .analyze_residual(iteration, &self.linear_system.rr, &self.prescribed)?;
            if self.control.zero_residual_baseline() || self.control.converged() {
                self.stage = NewtonStage::Converged;
                self.control.print_iteration(0, 0.0);
                self.control.print_footer();
                return Ok(iteration + 1);
            }

            // Jacobian matrix
            self.elements.calc_jacobians_parallel(&self.state)?;
            self.elements
                .assemble_jacobians(&mut self.linear_system.kk, &self.prescribed)?;
            self.linear_system.eliminate_prescribed(&self.prescribed)?;

            // solve the linear system
            self.stage = NewtonStage::Solving;
            let (lin_it, lin_res) = self.linear_system.solve(self.config.verbose_iterations)?;

            // update the displacement increment and the quadrature point states
            for eq in 0..self.n_equation() {
                if !self.prescribed[eq] {
                    self.state.duu[eq] -= self.linear_system.mdu[eq];
                }
            }
            self.elements.update_states_parallel(&self.state)?;

            self.control
                .analyze_update(iteration, &self.linear_system.mdu, &self.prescribed)?;
            self.control.print_iteration(lin_it, lin_res);
        }
        self.stage = NewtonStage::Diverged;
        Err("Newton-Raphson did not converge")
    }

    /// Computes the global residual vector R = f_int + f_inertia - f_body - f_fsi
    fn assemble_residual(&mut self) -> Result<(), StrError> {
        self.elements.calc_residuals_parallel(&self.state)?;
        self.elements
            .assemble_residuals(&mut self.linear_system.rr, &self.prescribed);
        self.bc_fsi.calc_residuals_parallel()?;
        self.bc_fsi
            .assemble_residuals(&mut self.linear_system.rr, &self.prescribed);
        Ok(())
    }

    /// Accepts the converged increment and updates velocities and accelerations
    fn accept_timestep(&mut self) {
        let (a1, _, _, a4, _, _) = self.config.newmark_coefficients();
        for eq in 0..self.n_equation() {
            let duu = self.state.duu[eq];
            self.state.uu[eq] += duu;
            if self.config.dynamics {
                self.state.aa[eq] = a1 * duu + self.state.aa_star[eq];
                self.state.vv[eq] = a4 * duu + self.state.vv_star[eq];
            }
        }
        self.state.duu.fill(0.0);
    }

    /// Calculates the deformed volume (area in 2D) of the solid
    pub fn deformed_volume(&mut self) -> Result<f64, StrError> {
        self.elements.deformed_volume()
    }

    /// Writes the solid state to a JSON file, if the output directory is configured
    ///
    /// Returns the path of the file written
    pub fn write_state(&self) -> Result<Option<String>, StrError> {
        match self.config.path_solid_state(self.state.timestep) {
            Some(path) => {
                self.state.write_json(&path)?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{NewtonStage, SolidSolver};
    use crate::base::{Config, Dof, Essential, ParamSolid, SampleMeshes, DEFAULT_TEST_DIR};
    use crate::fem::SolidState;
    use russell_lab::approx_eq;

    #[test]
    fn new_captures_errors() {
        let mesh = SampleMeshes::one_qua4();
        let param = ParamSolid::sample_neo_hookean();
        let essential = Essential::new();
        let mut config = Config::new(2);
        config.dt = -1.0;
        assert_eq!(
            SolidSolver::new(&mesh, &param, &config, &essential).err(),
            Some("cannot allocate the solid solver because config.validate() failed")
        );
        let config = Config::new(3);
        assert_eq!(
            SolidSolver::new(&mesh, &param, &config, &essential).err(),
            Some("the mesh ndim must be equal to config.ndim")
        );
        let config = Config::new(2);
        let mut essential = Essential::new();
        essential.at(&[4], Dof::Ux, |_| 0.0);
        assert_eq!(
            SolidSolver::new(&mesh, &param, &config, &essential).err(),
            Some("cannot find the point of an essential boundary condition")
        );
        let mut param = ParamSolid::sample_neo_hookean();
        param.model = "Unknown".to_string();
        let essential = Essential::new();
        assert_eq!(
            SolidSolver::new(&mesh, &param, &config, &essential).err(),
            Some("material model is not implemented")
        );
    }

    #[test]
    fn new_works() {
        // 3-----2
        // |     |
        // 0-----1
        let mesh = SampleMeshes::one_qua4();
        let param = ParamSolid::sample_neo_hookean();
        let config = Config::new(2);
        let mut essential = Essential::new();
        essential.fix(&[0, 1], 2);
        let solver = SolidSolver::new(&mesh, &param, &config, &essential).unwrap();
        assert_eq!(solver.n_equation(), 8);
        assert_eq!(
            solver.prescribed,
            &[true, true, true, true, false, false, false, false]
        );
        assert_eq!(solver.bc_fsi.all.len(), 3); // the bottom edge is fully prescribed
        assert_eq!(solver.stage, NewtonStage::Initialized);
    }

    #[test]
    fn zero_load_converges_immediately() {
        let mesh = SampleMeshes::one_qua4();
        let param = ParamSolid::sample_neo_hookean();
        let config = Config::new(2);
        let mut essential = Essential::new();
        essential.fix(&[0, 1], 2);
        let mut solver = SolidSolver::new(&mesh, &param, &config, &essential).unwrap();
        let n_iterations = solver.run_one_step(true).unwrap();
        assert_eq!(n_iterations, 1);
        assert_eq!(solver.stage, NewtonStage::Converged);
        assert_eq!(solver.state.timestep, 1);
        approx_eq(solver.state.t, config.dt, 1e-15);
        for eq in 0..solver.n_equation() {
            assert_eq!(solver.state.uu[eq], 0.0);
        }
        approx_eq(solver.deformed_volume().unwrap(), 1.0, 1e-14);
    }

    #[test]
    fn prescribed_stretch_works() {
        // stretch the right edge by 10% with smooth sliding conditions
        let mesh = SampleMeshes::one_qua4();
        let param = ParamSolid::sample_neo_hookean();
        let mut config = Config::new(2);
        config.set_time(1.0, 1.0).unwrap();
        let mut essential = Essential::new();
        essential
            .at(&[0, 3], Dof::Ux, |_| 0.0)
            .at(&[0, 1], Dof::Uy, |_| 0.0)
            .at(&[1, 2], Dof::Ux, |t| 0.1 * t);
        let mut solver = SolidSolver::new(&mesh, &param, &config, &essential).unwrap();
        let n_iterations = solver.run_one_step(true).unwrap();
        assert!(n_iterations > 1 && n_iterations <= 10);
        assert_eq!(solver.stage, NewtonStage::Converged);
        approx_eq(solver.point_displacement(2)[0], 0.1, 1e-15);
        // lateral contraction
        let uy = solver.point_displacement(2)[1];
        assert!(uy < 0.0);
        approx_eq(solver.point_displacement(3)[1], uy, 1e-10);
    }

    #[test]
    fn divergence_is_captured() {
        let mesh = SampleMeshes::one_qua4();
        let param = ParamSolid::sample_neo_hookean();
        let mut config = Config::new(2);
        config.set_newton(1, 1e-10, 1e-10).unwrap();
        let mut essential = Essential::new();
        essential
            .at(&[0, 3], Dof::Ux, |_| 0.0)
            .at(&[0, 1], Dof::Uy, |_| 0.0)
            .at(&[1, 2], Dof::Ux, |_| 0.2);
        let mut solver = SolidSolver::new(&mesh, &param, &config, &essential).unwrap();
        assert_eq!(solver.run_one_step(true).err(), Some("Newton-Raphson did not converge"));
        assert_eq!(solver.stage, NewtonStage::Diverged);
        assert_eq!(solver.state.timestep, 0);
        assert_eq!(solver.state.t, 0.0);
        for eq in 0..solver.n_equation() {
            assert_eq!(solver.state.uu[eq], 0.0);
        }
    }

    #[test]
    fn divergence_error_survives_failed_restore() {
        // the previous displacement of point 1 inverts the element; the trial one does not
        let mesh = SampleMeshes::one_qua4();
        let param = ParamSolid::sample_neo_hookean();
        let mut config = Config::new(2);
        config.set_newton(1, 1e-10, 1e-10).unwrap();
        let mut essential = Essential::new();
        essential
            .at(&[0, 3], Dof::Ux, |_| 0.0)
            .at(&[0, 1], Dof::Uy, |_| 0.0)
            .at(&[1, 2], Dof::Ux, |_| 0.2);
        let mut solver = SolidSolver::new(&mesh, &param, &config, &essential).unwrap();
        solver.state.uu[2] = -2.0;
        assert_eq!(solver.run_one_step(true).err(), Some("Newton-Raphson did not converge"));
        assert_eq!(solver.stage, NewtonStage::Diverged);
        assert_eq!(solver.state.timestep, 0);
        assert_eq!(solver.state.uu[2], -2.0);
        assert!(solver.state.duu.as_data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn write_state_works() {
        let mesh = SampleMeshes::one_qua4();
        let param = ParamSolid::sample_neo_hookean();
        let mut config = Config::new(2);
        let essential = Essential::new();
        {
            let solver = SolidSolver::new(&mesh, &param, &config, &essential).unwrap();
            assert_eq!(solver.write_state().unwrap(), None);
        }
        config.set_output(DEFAULT_TEST_DIR, "test_solid_solver_write_state");
        let solver = SolidSolver::new(&mesh, &param, &config, &essential).unwrap();
        let path = solver.write_state().unwrap().unwrap();
        let state = SolidState::read_json(&path).unwrap();
        assert_eq!(state.uu.dim(), 8);
    }
}
