use super::MaterialModel;
use crate::base::ParamSolid;
use crate::StrError;
use russell_lab::{mat_inverse, Matrix};
use russell_tensor::{Mandel, Tensor2, Tensor4};

/// Holds the history of a quadrature point of the solid
///
/// The state owns one material model instance and caches the quantities derived
/// from the last displacement gradient given to [QuadraturePointState::update].
pub struct QuadraturePointState {
    /// Holds the material model (None before setup)
    material: Option<MaterialModel>,

    /// Deformation gradient F = I + ∇u
    ff: Tensor2,

    /// Inverse of the deformation gradient
    ff_inv: Tensor2,

    /// Kirchhoff stress τ
    tau: Tensor2,

    /// Spatial tangent modulus J𝕔
    jc: Tensor4,

    /// J = det(F)
    det_ff: f64,

    /// dΨvol/dJ
    d_psi_vol_dj: f64,

    /// d²Ψvol/dJ²
    d2_psi_vol_dj2: f64,
}

impl QuadraturePointState {
    /// Allocates a new (not yet set up) instance
    pub fn new() -> Self {
        QuadraturePointState {
            material: None,
            ff: Tensor2::identity(Mandel::General),
            ff_inv: Tensor2::identity(Mandel::General),
            tau: Tensor2::new(Mandel::Symmetric),
            jc: Tensor4::new(Mandel::Symmetric),
            det_ff: 1.0,
            d_psi_vol_dj: 0.0,
            d2_psi_vol_dj2: 0.0,
        }
    }

    /// Allocates the material model and initializes F = I
    ///
    /// The initialization performs an update with a zero displacement gradient.
    pub fn setup(&mut self, param: &ParamSolid) -> Result<(), StrError> {
        self.material = Some(MaterialModel::new(param)?);
        let zero = Tensor2::new(Mandel::General);
        self.update(&zero)
    }

    /// Updates the state given the displacement gradient ∇u (with respect to the reference configuration)
    ///
    /// Calling this function twice with the same gradient yields the same state.
    pub fn update(&mut self, grad_u: &Tensor2) -> Result<(), StrError> {
        let material = match self.material.as_mut() {
            Some(m) => m,
            None => return Err("setup must be called before update"),
        };
        let mut ff = [[0.0; 3]; 3];
        let mut mat_ff = Matrix::new(3, 3);
        for i in 0..3 {
            for j in 0..3 {
                let delta = if i == j { 1.0 } else { 0.0 };
                ff[i][j] = delta + grad_u.get(i, j);
                mat_ff.set(i, j, ff[i][j]);
            }
        }
        let ff_tensor = Tensor2::from_matrix(&ff, Mandel::General)?;
        material.actual.update_data(&ff_tensor)?;

        // inverse
        let mut mat_ff_inv = Matrix::new(3, 3);
        mat_inverse(&mut mat_ff_inv, &mat_ff)?;
        let mut ff_inv = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                ff_inv[i][j] = mat_ff_inv.get(i, j);
            }
        }

        // cache
        self.ff = ff_tensor;
        self.ff_inv = Tensor2::from_matrix(&ff_inv, Mandel::General)?;
        self.tau = material.actual.tau()?.clone();
        self.jc = material.actual.jc()?.clone();
        self.det_ff = material.actual.det_ff()?;
        self.d_psi_vol_dj = material.actual.d_psi_vol_dj()?;
        self.d2_psi_vol_dj2 = material.actual.d2_psi_vol_dj2()?;
        Ok(())
    }

    /// Returns J = det(F)
    pub fn det_ff(&self) -> f64 {
        self.det_ff
    }

    /// Returns the deformation gradient F
    pub fn ff(&self) -> &Tensor2 {
        &self.ff
    }

    /// Returns the inverse of the deformation gradient F⁻¹
    pub fn ff_inv(&self) -> &Tensor2 {
        &self.ff_inv
    }

    /// Returns the Kirchhoff stress τ
    pub fn tau(&self) -> &Tensor2 {
        &self.tau
    }

    /// Returns the spatial tangent modulus J𝕔
    pub fn jc(&self) -> &Tensor4 {
        &self.jc
    }

    /// Returns dΨvol/dJ (the pressure)
    pub fn d_psi_vol_dj(&self) -> f64 {
        self.d_psi_vol_dj
    }

    /// Returns d²Ψvol/dJ²
    pub fn d2_psi_vol_dj2(&self) -> f64 {
        self.d2_psi_vol_dj2
    }

    /// Returns the Cauchy stress σ = τ / J
    pub fn cauchy_stress(&self) -> [[f64; 3]; 3] {
        let mut sigma = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                sigma[i][j] = self.tau.get(i, j) / self.det_ff;
            }
        }
        sigma
    }

    /// Returns the density in the reference configuration
    pub fn density(&self) -> f64 {
        match &self.material {
            Some(m) => m.actual.density(),
            None => 0.0,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
