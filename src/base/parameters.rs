use serde::{Deserialize, Serialize};

/// Holds parameters for a hyperelastic solid
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ParamSolid {
    /// Intrinsic (real) density
    pub density: f64,

    /// Name of the material model (e.g., "NeoHookean")
    pub model: String,

    /// Material constants in the order expected by the model
    ///
    /// NeoHookean: `[μ]` or `[μ, κ]` (shear modulus and, optionally, bulk modulus)
    pub constants: Vec<f64>,
}

impl ParamSolid {
    /// Returns a sample set of Neo-Hookean parameters
    pub fn sample_neo_hookean() -> Self {
        ParamSolid {
            density: 1.0,
            model: "NeoHookean".to_string(),
            constants: vec![1_000.0, 13.0 / 6.0 * 1_000.0],
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
