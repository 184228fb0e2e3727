use crate::StrError;

/// Maximum number of bisection steps
const N_MAX_BISECTION: usize = 200;

/// Homogeneous plane-strain stretch of a compressible Neo-Hookean block
///
/// The block is stretched by λ₁ along x, is free along y (σ₂₂ = 0), and is
/// constrained along z (λ₃ = 1).
///
/// ```text
///   y ^             free
///     |     ┌──────────────────┐
///     |     │                  │
///  ux=0 ──► │                  │ ──► ux = (λ₁ - 1) X
///     |     │                  │
///     |     └──────────────────┘
///   (0,0)        uy = 0          ──► x
/// ```
///
/// The lateral stretch λ₂ solves τ₂₂(λ₁, λ₂) = 0 with
///
/// ```text
/// τ = p J I + μ dev(b̄)    p = κ/2 (J - 1/J)    b̄ = J^(-2/3) diag(λ₁², λ₂², 1)    J = λ₁ λ₂
/// ```
pub struct PlaneStrainStretch {
    /// Shear modulus μ
    pub mu: f64,

    /// Bulk modulus κ
    pub kappa: f64,

    /// Prescribed stretch along x
    pub lambda1: f64,

    /// Lateral stretch along y (solution)
    pub lambda2: f64,
}

impl PlaneStrainStretch {
    /// Computes the solution
    pub fn new(mu: f64, kappa: f64, lambda1: f64) -> Result<Self, StrError> {
        if mu <= 0.0 || kappa <= 0.0 {
            return Err("PlaneStrainStretch requires μ > 0 and κ > 0");
        }
        if lambda1 <= 0.0 {
            return Err("PlaneStrainStretch requires λ₁ > 0");
        }
        let mut res = PlaneStrainStretch {
            mu,
            kappa,
            lambda1,
            lambda2: 1.0,
        };
        // τ₂₂ increases with λ₂; it is negative near zero and positive for large λ₂
        let (mut a, mut b) = (1e-6, 2.0 * f64::max(1.0, lambda1) + 1.0);
        for _ in 0..N_MAX_BISECTION {
            let c = 0.5 * (a + b);
            if res.kirchhoff_stress(lambda1, c)[1] < 0.0 {
                a = c;
            } else {
                b = c;
            }
            if b - a < 1e-15 {
                break;
            }
        }
        res.lambda2 = 0.5 * (a + b);
        Ok(res)
    }

    /// Returns the diagonal of the Kirchhoff stress τ for given stretches
    pub fn kirchhoff_stress(&self, lambda1: f64, lambda2: f64) -> [f64; 3] {
        let jj = lambda1 * lambda2;
        let pp = 0.5 * self.kappa * (jj - 1.0 / jj);
        let c = f64::powf(jj, -2.0 / 3.0);
        let bb = [c * lambda1 * lambda1, c * lambda2 * lambda2, c];
        let tr = (bb[0] + bb[1] + bb[2]) / 3.0;
        [
            pp * jj + self.mu * (bb[0] - tr),
            pp * jj + self.mu * (bb[1] - tr),
            pp * jj + self.mu * (bb[2] - tr),
        ]
    }

    /// Returns the diagonal of the Cauchy stress σ = τ / J of the solution
    pub fn cauchy_stress(&self) -> [f64; 3] {
        let jj = self.lambda1 * self.lambda2;
        let tau = self.kirchhoff_stress(self.lambda1, self.lambda2);
        [tau[0] / jj, tau[1] / jj, tau[2] / jj]
    }

    /// Returns the displacement at a point of the reference configuration
    pub fn displacement(&self, x: &[f64]) -> [f64; 2] {
        [(self.lambda1 - 1.0) * x[0], (self.lambda2 - 1.0) * x[1]]
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
