use crate::StrError;
use gemlab::integ::Gauss;
use gemlab::mesh::{CellId, Mesh};
use russell_lab::Vector;
use russell_tensor::{Mandel, Tensor2};

/// Holds the nodal velocity and pressure fields of the fluid (equal-order, at the mesh points)
#[derive(Clone, Debug)]
pub struct FluidField {
    /// Space dimension
    pub ndim: usize,

    /// Velocity arranged as `velocity[i + ndim * point_id]`
    ///
    /// (ndim × npoint)
    pub velocity: Vector,

    /// Pressure arranged as `pressure[point_id]`
    ///
    /// (npoint)
    pub pressure: Vector,
}

impl FluidField {
    /// Allocates a new instance with zero values
    pub fn new(ndim: usize, npoint: usize) -> Self {
        FluidField {
            ndim,
            velocity: Vector::new(ndim * npoint),
            pressure: Vector::new(npoint),
        }
    }

    /// Returns the number of points
    pub fn npoint(&self) -> usize {
        self.pressure.dim()
    }
}

/// Holds the coupling data written by the coordinator at a fluid quadrature point
#[derive(Clone, Debug)]
pub struct CouplingPoint {
    /// Indicates that the point is covered by the solid (artificial fluid)
    pub indicator: bool,

    /// Additional body acceleration g - aₛ (ndim)
    pub fsi_acceleration: Vector,

    /// Additional stress -p I + μ ∇ˢv - σₛ
    pub fsi_stress: Tensor2,
}

impl CouplingPoint {
    /// Allocates a new instance with zero values
    pub fn new(ndim: usize) -> Self {
        CouplingPoint {
            indicator: false,
            fsi_acceleration: Vector::new(ndim),
            fsi_stress: Tensor2::new(Mandel::Symmetric),
        }
    }
}

/// Holds the coupling data of all fluid cells (per cell, per quadrature point)
///
/// The quadrature rule of each cell is `Gauss::new(kind)`.
#[derive(Clone, Debug)]
pub struct FluidCoupling {
    /// All points arranged as `cells[cell_id][q]`
    pub cells: Vec<Vec<CouplingPoint>>,
}

impl FluidCoupling {
    /// Allocates a new instance with zero values
    pub fn new(mesh: &Mesh) -> Self {
        let cells = mesh
            .cells
            .iter()
            .map(|cell| {
                let ngauss = Gauss::new(cell.kind).npoint();
                vec![CouplingPoint::new(mesh.ndim); ngauss]
            })
            .collect();
        FluidCoupling { cells }
    }

    /// Returns the number of quadrature points flagged as covered by the solid
    pub fn n_indicated(&self) -> usize {
        self.cells
            .iter()
            .map(|points| points.iter().filter(|p| p.indicator).count())
            .sum()
    }
}

/// Defines the refinement action requested for a fluid cell
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefineFlag {
    /// Keep the cell
    None,

    /// Split the cell
    Refine,

    /// Merge the cell with its siblings (only when all siblings are flagged)
    Coarsen,
}

/// Defines the operations required from a fluid solver by the coupling
///
/// The coordinator reads the mesh and the solution, writes the coupling data,
/// and requests adaptive refinement; everything else belongs to the fluid solver.
pub trait FluidSolver: Send {
    /// Returns the current (active) fluid mesh
    fn mesh(&self) -> &Mesh;

    /// Allocates the degrees of freedom, constraints, system, and the initial solution
    fn setup(&mut self) -> Result<(), StrError>;

    /// Advances the fluid by one time step
    fn run_one_step(&mut self, first_step: bool) -> Result<(), StrError>;

    /// Returns the solution at the current time
    fn present_solution(&self) -> &FluidField;

    /// Returns the increment of the solution over the last time step
    fn solution_increment(&self) -> &FluidField;

    /// Returns the coupling data
    fn coupling(&self) -> &FluidCoupling;

    /// Returns the coupling data (mutable)
    fn coupling_mut(&mut self) -> &mut FluidCoupling;

    /// Returns the refinement level of a cell
    fn cell_level(&self, cell_id: CellId) -> usize;

    /// Refines and coarsens the mesh (one flag per cell) and transfers the solution
    fn execute_refinement(&mut self, flags: &[RefineFlag]) -> Result<(), StrError>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
