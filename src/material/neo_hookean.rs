use super::MaterialModelTrait;
use crate::base::ParamSolid;
use crate::StrError;
use russell_tensor::{Mandel, Tensor2, Tensor4};

/// Poisson's coefficient used to derive the bulk modulus when only μ is given
const DEFAULT_POISSON: f64 = 0.3;

/// Implements the compressible Neo-Hookean model in decoupled form
///
/// ```text
/// Ψ = Ψvol(J) + Ψiso(b̄)
/// Ψvol = κ/4 (J² - 1 - 2 ln J)
/// Ψiso = c₁ (tr b̄ - 3)      with c₁ = μ/2 and b̄ = J^(-2/3) F Fᵀ
/// ```
///
/// In 2D, F₃₃ = 1 (plane-strain).
pub struct NeoHookean {
    /// Coefficient c₁ = μ/2
    c1: f64,

    /// Bulk modulus κ
    kappa: f64,

    /// Density in the reference configuration
    density: f64,

    /// Indicates that update_data has been called
    updated: bool,

    /// J = det(F)
    det_ff: f64,

    /// Kirchhoff stress
    tau: Tensor2,

    /// Spatial tangent modulus J𝕔
    jc: Tensor4,

    /// dΨvol/dJ
    d_psi_vol_dj: f64,

    /// d²Ψvol/dJ²
    d2_psi_vol_dj2: f64,
}

impl NeoHookean {
    /// Allocates a new instance
    ///
    /// The constants are `[μ]` or `[μ, κ]`
    pub fn new(param: &ParamSolid) -> Result<Self, StrError> {
        if param.constants.len() < 1 {
            return Err("NeoHookean requires the shear modulus μ");
        }
        if param.constants.len() > 2 {
            return Err("NeoHookean requires at most two constants: μ and κ");
        }
        let mu = param.constants[0];
        if mu <= 0.0 {
            return Err("NeoHookean shear modulus μ must be > 0.0");
        }
        let kappa = if param.constants.len() == 2 {
            param.constants[1]
        } else {
            2.0 * mu * (1.0 + DEFAULT_POISSON) / (3.0 * (1.0 - 2.0 * DEFAULT_POISSON))
        };
        if kappa <= 0.0 {
            return Err("NeoHookean bulk modulus κ must be > 0.0");
        }
        Ok(NeoHookean {
            c1: mu / 2.0,
            kappa,
            density: param.density,
            updated: false,
            det_ff: 1.0,
            tau: Tensor2::new(Mandel::Symmetric),
            jc: Tensor4::new(Mandel::Symmetric),
            d_psi_vol_dj: 0.0,
            d2_psi_vol_dj2: 0.0,
        })
    }

    /// Returns the bulk modulus κ
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    fn check_updated(&self) -> Result<(), StrError> {
        if self.updated {
            Ok(())
        } else {
            Err("update_data must be called before reading the material data")
        }
    }
}

/// Returns the components of the fourth-order symmetric identity 𝕀
#[inline]
fn sym_identity(i: usize, j: usize, k: usize, l: usize) -> f64 {
    0.5 * (delta(i, k) * delta(j, l) + delta(i, l) * delta(j, k))
}

/// Returns the Kronecker delta
#[inline]
fn delta(i: usize, j: usize) -> f64 {
    if i == j {
        1.0
    } else {
        0.0
    }
}

impl MaterialModelTrait for NeoHookean {
    fn update_data(&mut self, ff: &Tensor2) -> Result<(), StrError> {
        let jj = ff.determinant();
        if jj <= 0.0 {
            return Err("det(F) must be positive; the element is inverted");
        }

        // left Cauchy-Green tensor b = F Fᵀ and its isochoric part b̄
        let scale = f64::powf(jj, -2.0 / 3.0);
        let mut bb_bar = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                let mut b_ij = 0.0;
                for k in 0..3 {
                    b_ij += ff.get(i, k) * ff.get(j, k);
                }
                bb_bar[i][j] = scale * b_ij;
            }
        }

        // fictitious Kirchhoff stress τ̄ = 2 c₁ b̄ and its deviator τiso = dev(τ̄)
        let mut tau_bar = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                tau_bar[i][j] = 2.0 * self.c1 * bb_bar[i][j];
            }
        }
        let tr_tau_bar = tau_bar[0][0] + tau_bar[1][1] + tau_bar[2][2];
        let mut tau_iso = tau_bar;
        for i in 0..3 {
            tau_iso[i][i] -= tr_tau_bar / 3.0;
        }

        // volumetric response
        self.d_psi_vol_dj = self.kappa / 2.0 * (jj - 1.0 / jj);
        self.d2_psi_vol_dj2 = self.kappa / 2.0 * (1.0 + 1.0 / (jj * jj));
        let p = self.d_psi_vol_dj;
        let p_tilde = p + jj * self.d2_psi_vol_dj2;

        // τ = p J I + τiso
        self.tau.clear();
        for i in 0..3 {
            for j in i..3 {
                let value = delta(i, j) * p * jj + 0.5 * (tau_iso[i][j] + tau_iso[j][i]);
                self.tau.sym_set(i, j, value);
            }
        }

        // J𝕔 = J𝕔vol + J𝕔iso
        // J𝕔vol = p̃ J I⊗I - 2 p J 𝕀
        // J𝕔iso = 2/3 tr(τ̄) ℙ - 2/3 (τiso⊗I + I⊗τiso)   with ℙ = 𝕀 - 1/3 I⊗I
        for i in 0..3 {
            for j in i..3 {
                for k in 0..3 {
                    for l in k..3 {
                        let ii = sym_identity(i, j, k, l);
                        let ixi = delta(i, j) * delta(k, l);
                        let pp = ii - ixi / 3.0;
                        let vol = p_tilde * jj * ixi - 2.0 * p * jj * ii;
                        let iso = 2.0 / 3.0 * tr_tau_bar * pp
                            - 2.0 / 3.0 * (tau_iso[i][j] * delta(k, l) + delta(i, j) * tau_iso[k][l]);
                        self.jc.sym_set(i, j, k, l, vol + iso);
                    }
                }
            }
        }

        self.det_ff = jj;
        self.updated = true;
        Ok(())
    }

    fn tau(&self) -> Result<&Tensor2, StrError> {
        self.check_updated()?;
        Ok(&self.tau)
    }

    fn jc(&self) -> Result<&Tensor4, StrError> {
        self.check_updated()?;
        Ok(&self.jc)
    }

    fn d_psi_vol_dj(&self) -> Result<f64, StrError> {
        self.check_updated()?;
        Ok(self.d_psi_vol_dj)
    }

    fn d2_psi_vol_dj2(&self) -> Result<f64, StrError> {
        self.check_updated()?;
        Ok(self.d2_psi_vol_dj2)
    }

    fn det_ff(&self) -> Result<f64, StrError> {
        self.check_updated()?;
        Ok(self.det_ff)
    }

    fn density(&self) -> f64 {
        self.density
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::NeoHookean;
    use crate::base::ParamSolid;
    use crate::material::MaterialModelTrait;
    use russell_lab::approx_eq;
    use russell_tensor::{Mandel, Tensor2};

    fn param(constants: &[f64]) -> ParamSolid {
        ParamSolid {
            density: 1.0,
            model: "NeoHookean".to_string(),
            constants: constants.to_vec(),
        }
    }

    fn deformation_gradient(ff: &[[f64; 3]; 3]) -> Tensor2 {
        Tensor2::from_matrix(ff, Mandel::General).unwrap()
    }

    #[test]
    fn new_captures_errors() {
        assert_eq!(
            NeoHookean::new(&param(&[])).err(),
            Some("NeoHookean requires the shear modulus μ")
        );
        assert_eq!(
            NeoHookean::new(&param(&[1.0, 2.0, 3.0])).err(),
            Some("NeoHookean requires at most two constants: μ and κ")
        );
        assert_eq!(
            NeoHookean::new(&param(&[0.0])).err(),
            Some("NeoHookean shear modulus μ must be > 0.0")
        );
        assert_eq!(
            NeoHookean::new(&param(&[1.0, -1.0])).err(),
            Some("NeoHookean bulk modulus κ must be > 0.0")
        );
    }

    #[test]
    fn default_bulk_modulus_works() {
        let model = NeoHookean::new(&param(&[12.0])).unwrap();
        // κ = 2μ(1+ν)/(3(1-2ν)) with ν = 0.3
        approx_eq(model.kappa(), 26.0, 1e-13);
    }

    #[test]
    fn accessors_require_update() {
        let model = NeoHookean::new(&param(&[1.0])).unwrap();
        let msg = Some("update_data must be called before reading the material data");
        assert_eq!(model.tau().err(), msg);
        assert_eq!(model.jc().err(), msg);
        assert_eq!(model.d_psi_vol_dj().err(), msg);
        assert_eq!(model.d2_psi_vol_dj2().err(), msg);
        assert_eq!(model.det_ff().err(), msg);
    }

    #[test]
    fn update_data_captures_inverted_element() {
        let mut model = NeoHookean::new(&param(&[1.0])).unwrap();
        let ff = deformation_gradient(&[[-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(
            model.update_data(&ff).err(),
            Some("det(F) must be positive; the element is inverted")
        );
    }

    #[test]
    fn undeformed_state_is_stress_free() {
        let (mu, kappa) = (3.0, 5.0);
        let mut model = NeoHookean::new(&param(&[mu, kappa])).unwrap();
        let ff = deformation_gradient(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        model.update_data(&ff).unwrap();
        let tau = model.tau().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(tau.get(i, j), 0.0);
            }
        }
        assert_eq!(model.det_ff().unwrap(), 1.0);
        assert_eq!(model.d_psi_vol_dj().unwrap(), 0.0);
        assert_eq!(model.d2_psi_vol_dj2().unwrap(), kappa);

        // at F = I the tangent reduces to the small-strain isotropic modulus
        // 𝔻 = κ I⊗I + 2μ (𝕀 - 1/3 I⊗I)
        let jc = model.jc().unwrap();
        approx_eq(jc.get(0, 0, 0, 0), kappa + 4.0 / 3.0 * mu, 1e-14);
        approx_eq(jc.get(0, 0, 1, 1), kappa - 2.0 / 3.0 * mu, 1e-14);
        approx_eq(jc.get(0, 1, 0, 1), mu, 1e-14);
        approx_eq(jc.get(1, 2, 1, 2), mu, 1e-14);
    }

    #[test]
    fn stress_of_pure_dilation_works() {
        // F = λ I ⇒ b̄ = I ⇒ τ = p J I
        let (mu, kappa, lambda) = (3.0, 5.0, 1.1);
        let mut model = NeoHookean::new(&param(&[mu, kappa])).unwrap();
        let ff = deformation_gradient(&[[lambda, 0.0, 0.0], [0.0, lambda, 0.0], [0.0, 0.0, lambda]]);
        model.update_data(&ff).unwrap();
        let jj = lambda * lambda * lambda;
        let p = kappa / 2.0 * (jj - 1.0 / jj);
        let tau = model.tau().unwrap();
        approx_eq(tau.get(0, 0), p * jj, 1e-13);
        approx_eq(tau.get(1, 1), p * jj, 1e-13);
        approx_eq(tau.get(2, 2), p * jj, 1e-13);
        approx_eq(tau.get(0, 1), 0.0, 1e-15);
        approx_eq(model.det_ff().unwrap(), jj, 1e-15);
    }

    #[test]
    fn tangent_matches_numerical_derivative() {
        // The Oldroyd rate of τ satisfies: dτ[L] - L τ - τ Lᵀ = J𝕔 : sym(L)
        // where dτ[L] is the derivative of τ along F(ε) = (I + ε L) F
        let mut model = NeoHookean::new(&param(&[2.0, 7.0])).unwrap();
        #[rustfmt::skip]
        let ff = [
            [1.10, 0.20, 0.05],
            [-0.10, 0.95, 0.10],
            [0.03, -0.02, 1.05],
        ];
        #[rustfmt::skip]
        let ll = [
            [0.3, -0.4, 0.1],
            [0.2, 0.5, -0.3],
            [-0.1, 0.6, 0.2],
        ];
        let perturbed = |eps: f64| -> [[f64; 3]; 3] {
            let mut res = ff;
            for i in 0..3 {
                for j in 0..3 {
                    for k in 0..3 {
                        res[i][j] += eps * ll[i][k] * ff[k][j];
                    }
                }
            }
            res
        };
        let h = 1e-6;
        let mut tau_plus = [[0.0; 3]; 3];
        let mut tau_minus = [[0.0; 3]; 3];
        model.update_data(&deformation_gradient(&perturbed(h))).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                tau_plus[i][j] = model.tau().unwrap().get(i, j);
            }
        }
        model.update_data(&deformation_gradient(&perturbed(-h))).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                tau_minus[i][j] = model.tau().unwrap().get(i, j);
            }
        }
        model.update_data(&deformation_gradient(&ff)).unwrap();
        let tau = model.tau().unwrap();
        let jc = model.jc().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let mut rate = (tau_plus[i][j] - tau_minus[i][j]) / (2.0 * h);
                for k in 0..3 {
                    rate -= ll[i][k] * tau.get(k, j) + tau.get(i, k) * ll[j][k];
                }
                let mut ana = 0.0;
                for k in 0..3 {
                    for l in 0..3 {
                        ana += jc.get(i, j, k, l) * 0.5 * (ll[k][l] + ll[l][k]);
                    }
                }
                approx_eq(rate, ana, 1e-7);
            }
        }
    }
}
