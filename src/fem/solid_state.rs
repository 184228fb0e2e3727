use crate::StrError;
use russell_lab::Vector;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the state of the solid
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolidState {
    /// Time
    pub t: f64,

    /// Delta time
    pub dt: f64,

    /// Time step counter
    pub timestep: usize,

    /// Cumulated (for one timestep) displacement increment {ΔU}
    ///
    /// (n_equation)
    pub duu: Vector,

    /// Displacements {U}
    ///
    /// (n_equation)
    pub uu: Vector,

    /// Velocities d{U}/dt
    ///
    /// (n_equation)
    pub vv: Vector,

    /// Accelerations d²{U}/dt²
    ///
    /// (n_equation)
    pub aa: Vector,

    /// Auxiliary time-discretization variable (Newmark method)
    ///
    /// (n_equation)
    pub vv_star: Vector,

    /// Auxiliary time-discretization variable (Newmark method)
    ///
    /// (n_equation)
    pub aa_star: Vector,
}

impl SolidState {
    /// Allocates a new instance
    pub fn new(n_equation: usize, dt: f64) -> Self {
        SolidState {
            t: 0.0,
            dt,
            timestep: 0,
            duu: Vector::new(n_equation),
            uu: Vector::new(n_equation),
            vv: Vector::new(n_equation),
            aa: Vector::new(n_equation),
            vv_star: Vector::new(n_equation),
            aa_star: Vector::new(n_equation),
        }
    }

    /// Returns the total displacement U + ΔU at an equation
    #[inline]
    pub fn u_trial(&self, eq: usize) -> f64 {
        self.uu[eq] + self.duu[eq]
    }

    /// Reads a JSON file containing the state data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| "cannot open file")?;
        let buffered = BufReader::new(input);
        let state = serde_json::from_reader(buffered).map_err(|_| "cannot parse JSON file")?;
        Ok(state)
    }

    /// Writes a JSON file with the state data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::SolidState;
    use crate::base::DEFAULT_TEST_DIR;

    #[test]
    fn new_works() {
        let mut state = SolidState::new(4, 0.1);
        assert_eq!(state.uu.dim(), 4);
        assert_eq!(state.aa_star.dim(), 4);
        state.uu[1] = 1.0;
        state.duu[1] = 0.5;
        assert_eq!(state.u_trial(1), 1.5);
    }

    #[test]
    fn derive_and_read_write_json_work() {
        let mut state = SolidState::new(2, 0.5);
        state.t = 1.5;
        state.uu[0] = -0.25;
        let clone = state.clone();
        assert_eq!(clone.uu.as_data(), &[-0.25, 0.0]);

        let path = format!("{}/test_solid_state.json", DEFAULT_TEST_DIR);
        state.write_json(&path).unwrap();
        let read = SolidState::read_json(&path).unwrap();
        assert_eq!(read.t, 1.5);
        assert_eq!(read.dt, 0.5);
        assert_eq!(read.uu.as_data(), &[-0.25, 0.0]);

        assert_eq!(
            SolidState::read_json("/tmp/fsisim/__does_not_exist__.json").err(),
            Some("cannot open file")
        );
    }
}
