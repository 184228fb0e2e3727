use crate::base::KSI_TOLERANCE;
use crate::StrError;
use gemlab::mesh::{CellId, GridSearchCell, Mesh};
use gemlab::shapes::{GeoClass, Scratchpad};
use russell_lab::{Matrix, Vector};

/// Maximum number of iterations of the inverse isoparametric mapping
const N_MAX_ITERATIONS: usize = 30;

/// Holds the cell containing a point and the reference coordinates of the point
#[derive(Clone, Debug)]
pub struct Location {
    /// The cell containing the point
    pub cell_id: CellId,

    /// The reference coordinates ξ of the point in the cell
    pub ksi: Vec<f64>,
}

/// Locates points in a mesh and interpolates nodal fields at those points
///
/// A grid of containers selects the candidate cells; the inverse isoparametric
/// mapping x → ξ then decides whether the point is inside.
pub struct PointLocator<'a> {
    /// The mesh
    pub mesh: &'a Mesh,

    /// Grid for fast searching the candidate cells
    grid: GridSearchCell,

    /// Min and max coordinates of the points
    limits: (Vec<f64>, Vec<f64>),
}

impl<'a> PointLocator<'a> {
    /// Allocates a new instance
    pub fn new(mesh: &'a Mesh) -> Result<Self, StrError> {
        let grid = GridSearchCell::new(mesh, None)?;
        Ok(PointLocator {
            mesh,
            grid,
            limits: mesh.get_limits(),
        })
    }

    /// Returns a scratchpad with the coordinates of a cell
    pub fn pad(&self, cell_id: CellId) -> Result<Scratchpad, StrError> {
        let cell = &self.mesh.cells[cell_id];
        let mut pad = Scratchpad::new(self.mesh.ndim, cell.kind)?;
        self.mesh.set_pad(&mut pad, &cell.points);
        Ok(pad)
    }

    /// Finds the cell containing a point
    ///
    /// Returns None if the point is outside the mesh.
    pub fn locate(&self, x: &[f64]) -> Result<Option<Location>, StrError> {
        if !self.in_limits(x) {
            return Ok(None);
        }
        let found = self
            .grid
            .find_cell(x, |cell_id, x| Ok(self.reference_coords(cell_id, x)?.is_some()))?;
        match found {
            Some(cell_id) => Ok(self
                .reference_coords(cell_id, x)?
                .map(|ksi| Location { cell_id, ksi })),
            None => Ok(None),
        }
    }

    /// Returns true if the point is inside at least one cell
    pub fn contains(&self, x: &[f64]) -> Result<bool, StrError> {
        Ok(self.locate(x)?.is_some())
    }

    /// Interpolates a nodal field with `ncomp` components per point
    ///
    /// The nodal values are arranged as `nodal[c + ncomp * point_id]`.
    pub fn interpolate(&self, location: &Location, nodal: &Vector, ncomp: usize) -> Result<Vec<f64>, StrError> {
        let mut pad = self.pad(location.cell_id)?;
        (pad.fn_interp)(&mut pad.interp, &location.ksi);
        let cell = &self.mesh.cells[location.cell_id];
        let mut values = vec![0.0; ncomp];
        for (m, p) in cell.points.iter().enumerate() {
            for c in 0..ncomp {
                values[c] += pad.interp[m] * nodal[c + ncomp * p];
            }
        }
        Ok(values)
    }

    /// Interpolates the gradient of a nodal field with `ncomp` components per point
    ///
    /// Returns the (ncomp, ndim) matrix `∂u_c/∂x_j`; the derivatives are taken with
    /// respect to the coordinates of this mesh.
    pub fn interpolate_gradient(&self, location: &Location, nodal: &Vector, ncomp: usize) -> Result<Matrix, StrError> {
        let ndim = self.mesh.ndim;
        let mut pad = self.pad(location.cell_id)?;
        pad.calc_gradient(&location.ksi)?;
        let cell = &self.mesh.cells[location.cell_id];
        let mut grad = Matrix::new(ncomp, ndim);
        for (m, p) in cell.points.iter().enumerate() {
            for c in 0..ncomp {
                for j in 0..ndim {
                    grad.add(c, j, nodal[c + ncomp * p] * pad.gradient.get(m, j));
                }
            }
        }
        Ok(grad)
    }

    /// Computes ξ of a point with respect to a cell
    ///
    /// Returns None if the point is outside the cell.
    fn reference_coords(&self, cell_id: CellId, x: &[f64]) -> Result<Option<Vec<f64>>, StrError> {
        let mut pad = self.pad(cell_id)?;
        let (ndim, nnode) = pad.xxt.dims();
        let mut scale: f64 = 1.0;
        for m in 0..nnode {
            for i in 0..ndim {
                scale = f64::max(scale, f64::abs(pad.xxt.get(i, m)));
            }
        }
        let mut ksi = vec![0.0; ndim];
        // no convergence happens for points far outside a distorted cell
        if pad
            .approximate_ksi(&mut ksi, &Vector::from(&x), N_MAX_ITERATIONS, 1e-13 * scale)
            .is_err()
        {
            return Ok(None);
        }
        if inside_reference_domain(pad.kind.class(), &ksi) {
            Ok(Some(ksi))
        } else {
            Ok(None)
        }
    }

    fn in_limits(&self, x: &[f64]) -> bool {
        let (min, max) = &self.limits;
        let mut diagonal = 0.0;
        for i in 0..self.mesh.ndim {
            diagonal = f64::max(diagonal, max[i] - min[i]);
        }
        let tol = KSI_TOLERANCE * f64::max(1.0, diagonal);
        (0..self.mesh.ndim).all(|i| x[i] >= min[i] - tol && x[i] <= max[i] + tol)
    }
}

/// Returns true if ξ is inside the reference domain (with tolerance)
pub(crate) fn inside_reference_domain(class: GeoClass, ksi: &[f64]) -> bool {
    match class {
        GeoClass::Tri | GeoClass::Tet => {
            let sum: f64 = ksi.iter().sum();
            ksi.iter().all(|k| *k >= -KSI_TOLERANCE) && sum <= 1.0 + KSI_TOLERANCE
        }
        _ => ksi.iter().all(|k| f64::abs(*k) <= 1.0 + KSI_TOLERANCE),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
