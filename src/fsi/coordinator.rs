use crate::base::{Config, Time};
use crate::fem::{Location, PointLocator, SolidSolver};
use crate::fluid::{CouplingPoint, FluidField, FluidSolver, RefineFlag};
use crate::material::QuadraturePointState;
use crate::StrError;
use gemlab::integ::Gauss;
use gemlab::mesh::{CellId, Mesh};
use gemlab::recovery::get_points_coords;
use gemlab::shapes::Scratchpad;
use rayon::prelude::*;
use russell_lab::Vector;
use russell_tensor::{Mandel, Tensor2};

/// Coordinates the partitioned (explicit, strictly alternating) FSI time loop
///
/// The solid reference mesh is never modified. A second copy of the solid mesh holds the
/// current configuration (reference + displacement) while the coupling data is computed.
pub struct Fsi<'a, F: FluidSolver> {
    /// Holds the configuration parameters
    pub config: &'a Config,

    /// Holds the solid solver
    pub solid: SolidSolver<'a>,

    /// Holds the fluid solver
    pub fluid: F,

    /// Holds the time control
    pub time: Time,

    /// Holds the solid mesh in the current configuration (only while moved)
    current_solid: Mesh,
}

impl<'a, F: FluidSolver> Fsi<'a, F> {
    /// Allocates a new instance
    pub fn new(config: &'a Config, solid: SolidSolver<'a>, fluid: F) -> Result<Self, StrError> {
        if fluid.mesh().ndim != solid.mesh.ndim {
            return Err("the fluid and solid meshes must have the same ndim");
        }
        let current_solid = solid.mesh.clone();
        Ok(Fsi {
            config,
            solid,
            fluid,
            time: Time::new(config),
            current_solid,
        })
    }

    /// Returns the copy of the solid mesh used for the current configuration
    pub fn current_solid_mesh(&self) -> &Mesh {
        &self.current_solid
    }

    /// Moves the solid mesh to the current configuration (forward) or back to the reference one
    ///
    /// Moving back writes the reference coordinates; thus, the restoration is exact.
    pub fn move_solid_mesh(&mut self, move_forward: bool) {
        let ndim = self.solid.mesh.ndim;
        let uu = &self.solid.state.uu;
        for (point, reference) in self.current_solid.points.iter_mut().zip(&self.solid.mesh.points) {
            for i in 0..ndim {
                point.coords[i] = if move_forward {
                    reference.coords[i] + uu[i + ndim * point.id]
                } else {
                    reference.coords[i]
                };
            }
        }
    }

    /// Runs a computation with the solid mesh in the current configuration
    pub fn with_moved_solid_mesh<R, G>(&mut self, computation: G) -> Result<R, StrError>
    where
        G: FnOnce(&Self) -> Result<R, StrError>,
    {
        self.move_solid_mesh(true);
        let res = computation(self);
        self.move_solid_mesh(false);
        res
    }

    /// Returns true if the point is inside at least one cell of the mesh
    pub fn point_in_mesh(mesh: &Mesh, x: &[f64]) -> Result<bool, StrError> {
        PointLocator::new(mesh)?.contains(x)
    }

    /// Sets the indicator of all quadrature points of every fluid cell
    ///
    /// The indicator is true iff all vertices of the fluid cell are inside the displaced solid.
    pub fn update_indicator(&mut self) -> Result<(), StrError> {
        let flags: Vec<bool> = self.with_moved_solid_mesh(|fsi| {
            let solid_locator = PointLocator::new(&fsi.current_solid)?;
            let fluid_mesh = fsi.fluid.mesh();
            fluid_mesh
                .cells
                .par_iter()
                .map(|cell| -> Result<bool, StrError> {
                    for p in &cell.points {
                        if !solid_locator.contains(&fluid_mesh.points[*p].coords)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                })
                .collect()
        })?;
        for (points, flag) in self.fluid.coupling_mut().cells.iter_mut().zip(flags) {
            points.iter_mut().for_each(|q| q.indicator = flag);
        }
        Ok(())
    }

    /// Computes the FSI body acceleration and stress at the fluid quadrature points
    ///
    /// At a point covered by the displaced solid:
    ///
    /// ```text
    /// fsi_acceleration = g - aₛ
    /// fsi_stress = -p I + μ ∇ˢv - σₛ
    /// ```
    ///
    /// Uncovered points get zero values and a false indicator.
    pub fn find_fluid_bc(&mut self) -> Result<(), StrError> {
        let cells: Vec<Vec<CouplingPoint>> = self.with_moved_solid_mesh(|fsi| {
            let ndim = fsi.current_solid.ndim;
            let solid_locator = PointLocator::new(&fsi.current_solid)?;
            let reference_locator = PointLocator::new(fsi.solid.mesh)?;
            let fluid_mesh = fsi.fluid.mesh();
            let fluid_locator = PointLocator::new(fluid_mesh)?;
            let solution = fsi.fluid.present_solution();
            let solid_aa = &fsi.solid.state.aa;
            let solid_uu = &fsi.solid.state.uu;
            let param = &fsi.solid.param;
            let gravity = &fsi.config.gravity;
            let viscosity = fsi.config.viscosity;
            fluid_mesh
                .cells
                .par_iter()
                .map(|cell| -> Result<Vec<CouplingPoint>, StrError> {
                    let mut pad = fluid_locator.pad(cell.id)?;
                    let gauss = Gauss::new(cell.kind);
                    let all_x = get_points_coords(&mut pad, &gauss)?;
                    let mut state = QuadraturePointState::new();
                    state.setup(param)?;
                    let mut points = Vec::with_capacity(gauss.npoint());
                    for (q, x) in all_x.iter().enumerate() {
                        let ksi = gauss.coords(q);
                        let mut point = CouplingPoint::new(ndim);
                        if let Some(location) = solid_locator.locate(x.as_data())? {
                            point.indicator = true;
                            let acc = solid_locator.interpolate(&location, solid_aa, ndim)?;
                            for i in 0..ndim {
                                point.fsi_acceleration[i] = gravity[i] - acc[i];
                            }
                            // the reference coordinates ξ are the same in both configurations
                            let grad_u = reference_locator.interpolate_gradient(&location, solid_uu, ndim)?;
                            let mut h = [[0.0; 3]; 3];
                            for i in 0..ndim {
                                for j in 0..ndim {
                                    h[i][j] = grad_u.get(i, j);
                                }
                            }
                            state.update(&Tensor2::from_matrix(&h, Mandel::General)?)?;
                            let sigma_s = state.cauchy_stress();
                            let fluid_location = Location {
                                cell_id: cell.id,
                                ksi: ksi.to_vec(),
                            };
                            let sigma_f = fluid_stress(&fluid_locator, &fluid_location, solution, viscosity)?;
                            for i in 0..ndim {
                                for j in i..ndim {
                                    point.fsi_stress.sym_set(i, j, sigma_f[i][j] - sigma_s[i][j]);
                                }
                            }
                        }
                        points.push(point);
                    }
                    Ok(points)
                })
                .collect()
        })?;
        self.fluid.coupling_mut().cells = cells;
        Ok(())
    }

    /// Computes the fluid tractions at the quadrature points of the solid faces exposed to the fluid
    ///
    /// ```text
    /// t = (-p I + μ ∇ˢv) · n
    /// ```
    ///
    /// where n is the outward normal of the displaced face. Points outside the fluid mesh get zero traction.
    pub fn find_solid_bc(&mut self) -> Result<(), StrError> {
        let tractions: Vec<Vec<Vec<f64>>> = self.with_moved_solid_mesh(|fsi| {
            let ndim = fsi.current_solid.ndim;
            let fluid_locator = PointLocator::new(fsi.fluid.mesh())?;
            let solution = fsi.fluid.present_solution();
            let viscosity = fsi.config.viscosity;
            let mut all = Vec::with_capacity(fsi.solid.bc_fsi.all.len());
            for fsi_face in &fsi.solid.bc_fsi.all {
                let mut pad = Scratchpad::new(ndim, fsi_face.kind)?;
                fsi.current_solid.set_pad(&mut pad, &fsi_face.points);
                let mut x = Vector::new(ndim);
                let mut n = Vector::new(ndim);
                let mut face_tractions = Vec::with_capacity(fsi_face.gauss.npoint());
                for q in 0..fsi_face.gauss.npoint() {
                    let ksi = fsi_face.gauss.coords(q);
                    pad.calc_coords(&mut x, ksi)?;
                    pad.calc_normal_vector(&mut n, ksi)?;
                    let mut t = vec![0.0; ndim];
                    if let Some(location) = fluid_locator.locate(x.as_data())? {
                        let sigma = fluid_stress(&fluid_locator, &location, solution, viscosity)?;
                        for i in 0..ndim {
                            for j in 0..ndim {
                                t[i] += sigma[i][j] * n[j];
                            }
                        }
                    }
                    face_tractions.push(t);
                }
                all.push(face_tractions);
            }
            Ok(all)
        })?;
        for (fsi_face, t) in self.solid.bc_fsi.all.iter_mut().zip(tractions) {
            fsi_face.traction = t;
        }
        Ok(())
    }

    /// Adapts the fluid mesh around the displaced solid
    ///
    /// Fluid cells whose center is closer than `refinement_distance` to the center of any solid
    /// cell are refined; all others are coarsened. Refinement is not requested beyond `max_level`
    /// and coarsening not below `min_level`. The indicator is computed again afterwards.
    pub fn refine_mesh(&mut self, min_level: usize, max_level: usize) -> Result<(), StrError> {
        let distance = self.config.refinement_distance;
        let mut flags: Vec<RefineFlag> = self.with_moved_solid_mesh(|fsi| {
            let solid_centers: Vec<_> = (0..fsi.current_solid.cells.len())
                .map(|c| cell_center(&fsi.current_solid, c))
                .collect();
            let fluid_mesh = fsi.fluid.mesh();
            Ok((0..fluid_mesh.cells.len())
                .into_par_iter()
                .map(|c| {
                    let center = cell_center(fluid_mesh, c);
                    let near = solid_centers.iter().any(|s| {
                        let d2: f64 = center.iter().zip(s).map(|(a, b)| (a - b) * (a - b)).sum();
                        f64::sqrt(d2) < distance
                    });
                    if near {
                        RefineFlag::Refine
                    } else {
                        RefineFlag::Coarsen
                    }
                })
                .collect())
        })?;
        for (c, flag) in flags.iter_mut().enumerate() {
            let level = self.fluid.cell_level(c);
            if *flag == RefineFlag::Refine && level >= max_level {
                *flag = RefineFlag::None;
            }
            if *flag == RefineFlag::Coarsen && level <= min_level {
                *flag = RefineFlag::None;
            }
        }
        self.fluid.execute_refinement(&flags)?;
        self.update_indicator()
    }

    /// Advects the solid vertices with the fluid velocity: u ← u + v(x) Δt
    ///
    /// Vertices outside the fluid mesh are not changed.
    pub fn update_solid_displacement(&mut self) -> Result<(), StrError> {
        let dt = self.time.dt;
        let displacement: Vector = self.with_moved_solid_mesh(|fsi| {
            let ndim = fsi.current_solid.ndim;
            let fluid_locator = PointLocator::new(fsi.fluid.mesh())?;
            let solution = fsi.fluid.present_solution();
            let mut uu = fsi.solid.state.uu.clone();
            for point in &fsi.current_solid.points {
                if let Some(location) = fluid_locator.locate(&point.coords)? {
                    let v = fluid_locator.interpolate(&location, &solution.velocity, ndim)?;
                    for i in 0..ndim {
                        uu[i + ndim * point.id] += v[i] * dt;
                    }
                }
            }
            Ok(uu)
        })?;
        self.solid.state.uu = displacement;
        self.solid.elements.update_states_parallel(&self.solid.state)
    }

    /// Runs the partitioned time loop until the final time
    pub fn run(&mut self) -> Result<(), StrError> {
        self.fluid.setup()?;
        self.update_indicator()?;
        if self.config.verbose_timesteps {
            println!(
                "Number of fluid active cells and points: [{}, {}]",
                self.fluid.mesh().cells.len(),
                self.fluid.mesh().points.len()
            );
            println!(
                "Number of solid active cells and equations: [{}, {}]",
                self.solid.mesh.cells.len(),
                self.solid.n_equation()
            );
        }
        let mut first_step = true;
        while self.time.remaining() {
            self.find_solid_bc()?;
            let n_iterations = self.solid.run_one_step(first_step)?;
            self.find_fluid_bc()?;
            self.fluid.run_one_step(first_step)?;
            first_step = false;
            self.time.increment();
            if self.time.time_to_output() && self.config.verbose_timesteps {
                println!(
                    "t = {:>11.6e}  solid iterations = {}  covered fluid points = {}",
                    self.time.current,
                    n_iterations,
                    self.fluid.coupling().n_indicated()
                );
            }
            if self.time.time_to_refine() {
                self.refine_mesh(self.config.min_mesh_level, self.config.max_mesh_level)?;
            }
            if self.time.time_to_save() {
                self.solid.write_state()?;
            }
        }
        Ok(())
    }
}

/// Returns the average of the coordinates of the points of a cell
fn cell_center(mesh: &Mesh, cell_id: CellId) -> Vec<f64> {
    let cell = &mesh.cells[cell_id];
    let mut center = vec![0.0; mesh.ndim];
    for p in &cell.points {
        for i in 0..mesh.ndim {
            center[i] += mesh.points[*p].coords[i] / (cell.points.len() as f64);
        }
    }
    center
}

/// Computes the fluid stress σ = -p I + μ ∇ˢv at a located point
fn fluid_stress(
    locator: &PointLocator,
    location: &Location,
    solution: &FluidField,
    viscosity: f64,
) -> Result<[[f64; 3]; 3], StrError> {
    let ndim = solution.ndim;
    let p = locator.interpolate(location, &solution.pressure, 1)?[0];
    let grad_v = locator.interpolate_gradient(location, &solution.velocity, ndim)?;
    let mut sigma = [[0.0; 3]; 3];
    for i in 0..ndim {
        for j in 0..ndim {
            sigma[i][j] = viscosity * 0.5 * (grad_v.get(i, j) + grad_v.get(j, i));
        }
        sigma[i][i] -= p;
    }
    Ok(sigma)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
