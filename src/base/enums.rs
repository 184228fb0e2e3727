use crate::StrError;
use serde::{Deserialize, Serialize};

/// Defines degrees-of-freedom (DOF) types
///
/// Note: The fixed numbering scheme assists in sorting the DOFs and coincides
/// with the local index of the displacement component at a point.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Dof {
    /// Displacement along the first dimension
    Ux = 0,

    /// Displacement along the second dimension
    Uy = 1,

    /// Displacement along the third dimension
    Uz = 2,
}

impl Dof {
    /// Returns the displacement DOFs of a point in a space with the given dimension
    pub fn displacements(ndim: usize) -> &'static [Dof] {
        if ndim == 2 {
            &[Dof::Ux, Dof::Uy]
        } else {
            &[Dof::Ux, Dof::Uy, Dof::Uz]
        }
    }

    /// Returns the index of the component (0, 1, or 2)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Returns the global equation number for a point
    ///
    /// The equations are numbered point-by-point: `eq = ndim * point_id + index`
    pub fn equation(&self, ndim: usize, point_id: usize) -> Result<usize, StrError> {
        if self.index() >= ndim {
            return Err("Uz is not available in 2D");
        }
        Ok(ndim * point_id + self.index())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Dof;

    #[test]
    fn dof_derives_work() {
        let dof = Dof::Uy;
        let clone = dof.clone();
        assert_eq!(format!("{:?}", clone), "Uy");
        assert!(Dof::Ux < Dof::Uz);
        let json = serde_json::to_string(&dof).unwrap();
        let from_json: Dof = serde_json::from_str(&json).unwrap();
        assert_eq!(from_json, Dof::Uy);
    }

    #[test]
    fn dof_methods_work() {
        assert_eq!(Dof::displacements(2), &[Dof::Ux, Dof::Uy]);
        assert_eq!(Dof::displacements(3), &[Dof::Ux, Dof::Uy, Dof::Uz]);
        assert_eq!(Dof::Uz.index(), 2);
        assert_eq!(Dof::Ux.equation(2, 3).unwrap(), 6);
        assert_eq!(Dof::Uy.equation(2, 3).unwrap(), 7);
        assert_eq!(Dof::Uz.equation(3, 1).unwrap(), 5);
        assert_eq!(Dof::Uz.equation(2, 0).err(), Some("Uz is not available in 2D"));
    }
}
