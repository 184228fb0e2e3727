use super::NeoHookean;
use crate::base::ParamSolid;
use crate::StrError;
use russell_tensor::{Tensor2, Tensor4};

/// Specifies the essential functions for hyperelastic material models
///
/// The model is evaluated at a deformation gradient F given to `update_data`;
/// the accessors return the quantities consistent with the last F.
pub trait MaterialModelTrait: Send {
    /// Stores F and computes the stress and tangent modulus
    ///
    /// Returns an error if det(F) ≤ 0
    fn update_data(&mut self, ff: &Tensor2) -> Result<(), StrError>;

    /// Returns the Kirchhoff stress τ = J σ
    fn tau(&self) -> Result<&Tensor2, StrError>;

    /// Returns the spatial tangent modulus J𝕔 (minor and major symmetric)
    fn jc(&self) -> Result<&Tensor4, StrError>;

    /// Returns the first derivative of the volumetric strain energy with respect to J
    fn d_psi_vol_dj(&self) -> Result<f64, StrError>;

    /// Returns the second derivative of the volumetric strain energy with respect to J
    fn d2_psi_vol_dj2(&self) -> Result<f64, StrError>;

    /// Returns J = det(F)
    fn det_ff(&self) -> Result<f64, StrError>;

    /// Returns the density in the reference configuration
    fn density(&self) -> f64;
}

/// Holds the actual material model implementation
pub struct MaterialModel {
    /// Holds the actual model implementation
    pub actual: Box<dyn MaterialModelTrait>,
}

impl MaterialModel {
    /// Allocates a new instance
    pub fn new(param: &ParamSolid) -> Result<Self, StrError> {
        let actual: Box<dyn MaterialModelTrait> = match param.model.as_str() {
            // compressible Neo-Hookean model
            "NeoHookean" => Box::new(NeoHookean::new(param)?),

            // no fallback for unknown names
            _ => return Err("material model is not implemented"),
        };
        Ok(MaterialModel { actual })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
