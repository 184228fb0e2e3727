use super::{ElementSolid, SolidState};
use crate::base::{assemble_matrix, assemble_vector, Config, ParamSolid};
use crate::StrError;
use gemlab::mesh::Mesh;
use rayon::prelude::*;
use russell_lab::Vector;
use russell_sparse::SparseMatrix;

/// Holds a collection of solid elements
///
/// The local calculations run in parallel (each element owns its scratch data and
/// quadrature point states); the assembly is a sequential reduction step.
pub struct Elements {
    /// All elements
    pub all: Vec<ElementSolid>,
}

impl Elements {
    /// Allocates a new instance
    pub fn new(mesh: &Mesh, param: &ParamSolid, config: &Config) -> Result<Self, StrError> {
        if mesh.cells.len() == 0 {
            return Err("there are no cells in the mesh");
        }
        let res: Result<Vec<_>, _> = mesh
            .cells
            .iter()
            .map(|cell| ElementSolid::new(mesh, cell, param, config))
            .collect();
        Ok(Elements { all: res? })
    }

    /// Updates all quadrature point states in parallel
    pub fn update_states_parallel(&mut self, state: &SolidState) -> Result<(), StrError> {
        self.all.par_iter_mut().map(|e| e.update_states(state)).collect()
    }

    /// Computes all residual vectors in parallel
    pub fn calc_residuals_parallel(&mut self, state: &SolidState) -> Result<(), StrError> {
        self.all.par_iter_mut().map(|e| e.calc_residual(state)).collect()
    }

    /// Computes all Jacobian matrices in parallel
    pub fn calc_jacobians_parallel(&mut self, state: &SolidState) -> Result<(), StrError> {
        self.all.par_iter_mut().map(|e| e.calc_jacobian(state)).collect()
    }

    /// Assembles residual vectors
    ///
    /// **Notes:**
    ///
    /// 1. You must call calc residuals first
    /// 2. The global vector R will be cleared
    pub fn assemble_residuals(&self, rr: &mut Vector, prescribed: &[bool]) {
        rr.fill(0.0);
        self.all
            .iter()
            .for_each(|e| assemble_vector(rr, &e.residual, &e.local_to_global, prescribed));
    }

    /// Assembles Jacobian matrices
    ///
    /// **Notes:**
    ///
    /// 1. You must call calc jacobians first
    /// 2. The position in the global matrix K will be reset
    pub fn assemble_jacobians(&self, kk: &mut SparseMatrix, prescribed: &[bool]) -> Result<(), StrError> {
        kk.reset()?;
        for e in &self.all {
            assemble_matrix(kk, &e.jacobian, &e.local_to_global, prescribed)?;
        }
        Ok(())
    }

    /// Calculates the deformed volume (area in 2D) of the solid
    pub fn deformed_volume(&mut self) -> Result<f64, StrError> {
        let volumes: Result<Vec<_>, StrError> = self.all.par_iter_mut().map(|e| e.deformed_volume()).collect();
        Ok(volumes?.iter().sum())
    }

    /// Returns the total number of quadrature points
    pub fn n_quadrature_points(&self) -> usize {
        self.all.iter().map(|e| e.states.len()).sum()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Elements;
    use crate::base::{new_empty_mesh_2d, Config, ParamSolid, SampleMeshes};
    use crate::fem::SolidState;
    use russell_lab::{approx_eq, Vector};
    use russell_sparse::{SparseMatrix, Sym};

    #[test]
    fn new_captures_errors() {
        let mesh = new_empty_mesh_2d();
        let param = ParamSolid::sample_neo_hookean();
        let config = Config::new(2);
        assert_eq!(
            Elements::new(&mesh, &param, &config).err(),
            Some("there are no cells in the mesh")
        );
    }

    #[test]
    fn parallel_calculations_and_assembly_work() {
        // 3-----4-----5
        // | [0] | [1] |
        // 0-----1-----2
        let mesh = SampleMeshes::rectangle(0.0, 2.0, 0.0, 1.0, 2, 1);
        let param = ParamSolid::sample_neo_hookean();
        let mut config = Config::new(2);
        config.set_gravity(&[0.0, -1.0]).unwrap();
        let mut elements = Elements::new(&mesh, &param, &config).unwrap();
        assert_eq!(elements.n_quadrature_points(), 8);

        let state = SolidState::new(12, config.dt);
        elements.update_states_parallel(&state).unwrap();
        elements.calc_residuals_parallel(&state).unwrap();
        elements.calc_jacobians_parallel(&state).unwrap();

        let mut prescribed = vec![false; 12];
        prescribed[0] = true;
        let mut rr = Vector::new(12);
        elements.assemble_residuals(&mut rr, &prescribed);
        // weight: ρ g A / 4 per node and cell; the middle nodes belong to two cells
        approx_eq(rr[1], 0.25, 1e-15);
        approx_eq(rr[3], 0.5, 1e-15);
        approx_eq(rr[0], 0.0, 1e-15);

        let nnz = 2 * 64;
        let mut kk = SparseMatrix::new_coo(12, 12, nnz, Sym::No).unwrap();
        elements.assemble_jacobians(&mut kk, &prescribed).unwrap();
        let dense = kk.as_dense();
        assert_eq!(dense.get(0, 0), 0.0);
        assert_eq!(dense.get(0, 2), 0.0);
        assert!(dense.get(2, 2) > 0.0);
        // the undeformed tangent is symmetric
        for i in 0..12 {
            for j in 0..12 {
                approx_eq(dense.get(i, j), dense.get(j, i), 1e-10);
            }
        }

        approx_eq(elements.deformed_volume().unwrap(), 2.0, 1e-14);
    }
}
