use super::Elements;
use crate::base::Config;
use crate::StrError;
use russell_lab::{vec_norm, Norm, Vector};
use russell_sparse::{LinSolver, SparseMatrix, Sym};

/// Holds variables to solve the global linear system
///
/// The prescribed equations are eliminated: their rows and columns are skipped during
/// the assembly, a unit value is put on the diagonal, and the residual entry is zeroed.
pub struct LinearSystem<'a> {
    /// Total number of global equations (total number of DOFs)
    pub n_equation: usize,

    /// Holds the supremum of the number of nonzero values (nnz) in the global matrix
    ///
    /// **Notes:**
    ///
    /// 1. The global matrix is sparse with the number of nonzero values indicated by `nnz`
    /// 2. The local element matrices add only to parts of the global matrix yielding a banded matrix
    /// 3. The least upper bound (supremum) of nnz, indicated here by `nnz_sup`, is equal to the
    ///    sum of all the number of entries in the local matrices plus the number of equations
    ///    (the unit diagonal of prescribed equations); thus
    ///    `nnz ≤ n_equation + Σ (ndof_local × ndof_local)`
    pub nnz_sup: usize,

    /// Holds the residual vector R
    pub rr: Vector,

    /// Holds the global Jacobian matrix K
    pub kk: SparseMatrix,

    /// Holds the linear solver
    pub solver: LinSolver<'a>,

    /// Holds the "minus-delta-U" vector (the solution of the linear system)
    pub mdu: Vector,

    /// Holds K · mdu (to compute the achieved residual of the linear solve)
    kk_mdu: Vector,
}

impl<'a> LinearSystem<'a> {
    /// Allocates a new instance
    pub fn new(n_equation: usize, config: &Config, elements: &Elements) -> Result<Self, StrError> {
        let nnz_sup = n_equation
            + elements.all.iter().fold(0, |acc, e| {
                let n = e.local_to_global.len();
                acc + n * n
            });
        Ok(LinearSystem {
            n_equation,
            nnz_sup,
            rr: Vector::new(n_equation),
            kk: SparseMatrix::new_coo(n_equation, n_equation, nnz_sup, Sym::No)?,
            solver: LinSolver::new(config.lin_sol_genie)?,
            mdu: Vector::new(n_equation),
            kk_mdu: Vector::new(n_equation),
        })
    }

    /// Puts ones on the diagonal of the prescribed equations and zeroes their residual
    ///
    /// **Note:** This function must be called after the assembly of K and R
    pub fn eliminate_prescribed(&mut self, prescribed: &[bool]) -> Result<(), StrError> {
        for eq in 0..self.n_equation {
            if prescribed[eq] {
                self.kk.put(eq, eq, 1.0)?;
                self.rr[eq] = 0.0;
            }
        }
        Ok(())
    }

    /// Factorizes K and solves K · mdu = R
    ///
    /// Returns the number of linear iterations (always one for the direct solver)
    /// and the achieved residual ‖K · mdu - R‖₂.
    pub fn solve(&mut self, verbose: bool) -> Result<(usize, f64), StrError> {
        self.solver.actual.factorize(&mut self.kk, None)?;
        self.solver.actual.solve(&mut self.mdu, &self.kk, &self.rr, verbose)?;
        self.kk.get_coo()?.mat_vec_mul(&mut self.kk_mdu, 1.0, &self.mdu)?;
        for i in 0..self.n_equation {
            self.kk_mdu[i] -= self.rr[i];
        }
        Ok((1, vec_norm(&self.kk_mdu, Norm::Euc)))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
