use super::Dof;
use gemlab::mesh::PointId;
use std::collections::HashMap;
use std::fmt;

/// Defines a prescribed displacement as a function of time
pub type FnTime = fn(f64) -> f64;

/// Holds essential boundary conditions (prescribed displacements)
pub struct Essential {
    pub all: HashMap<(PointId, Dof), FnTime>,
}

impl Essential {
    /// Allocates a new instance
    pub fn new() -> Self {
        Essential { all: HashMap::new() }
    }

    /// Sets the displacement component `dof` at points
    pub fn at(&mut self, points: &[PointId], dof: Dof, value: FnTime) -> &mut Self {
        for point_id in points {
            self.all.insert((*point_id, dof), value);
        }
        self
    }

    /// Fixes all displacement components at points
    pub fn fix(&mut self, points: &[PointId], ndim: usize) -> &mut Self {
        for dof in Dof::displacements(ndim) {
            self.at(points, *dof, |_| 0.0);
        }
        self
    }

    /// Returns the sorted list of (point, dof) keys
    pub fn keys_sorted(&self) -> Vec<(PointId, Dof)> {
        let mut keys: Vec<_> = self.all.keys().copied().collect();
        keys.sort();
        keys
    }
}

impl fmt::Display for Essential {
    /// Prints a formatted summary of Boundary Conditions
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Essential boundary conditions\n").unwrap();
        write!(f, "=============================\n").unwrap();
        for key in self.keys_sorted() {
            let value = self.all.get(&key).unwrap();
            write!(f, "{:?} : {:?}(t=0) = {:?}\n", key.0, key.1, value(0.0)).unwrap();
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
