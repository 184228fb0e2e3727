use super::SolidState;
use crate::base::{compute_local_to_global, Config, ParamSolid};
use crate::material::QuadraturePointState;
use crate::StrError;
use gemlab::integ::{self, Gauss};
use gemlab::mesh::{Cell, CellId, Mesh};
use gemlab::shapes::Scratchpad;
use russell_lab::{Matrix, Vector};
use russell_tensor::{Mandel, Tensor2};

/// Implements a large-deformation solid element in the spatial (updated) form
///
/// The integrals are evaluated over the reference configuration (dV) with the
/// spatial gradients of the shape functions `∇ₓN = ∇ₓN · F⁻¹`:
///
/// ```text
/// rᵃᵢ = ∫ τᵢⱼ ∂Nᵃ/∂xⱼ dV  +  ∫ ρ Nᵃ aᵢ dV  -  ∫ ρ Nᵃ gᵢ dV
///
/// Kᵃᵢᵇₖ = ∫ ∂Nᵃ/∂xⱼ J𝕔ᵢⱼₖₗ ∂Nᵇ/∂xₗ dV  +  δᵢₖ ∫ ∂Nᵃ/∂xⱼ τⱼₗ ∂Nᵇ/∂xₗ dV  +  δᵢₖ α₁ ∫ ρ Nᵃ Nᵇ dV
/// ```
///
/// The inertial terms only exist in dynamics; 2D means plane-strain.
pub struct ElementSolid {
    /// The cell ID
    pub cell_id: CellId,

    /// Space dimension
    ndim: usize,

    /// Density in the reference configuration
    density: f64,

    /// Gravity acceleration vector
    gravity: Vec<f64>,

    /// Enables the inertial terms
    dynamics: bool,

    /// Newmark coefficient α₁ = 1/(β Δt²)
    alpha1: f64,

    /// Scratchpad with the reference coordinates of the cell
    pub pad: Scratchpad,

    /// Integration points
    pub gauss: Gauss,

    /// Local-to-global map
    pub local_to_global: Vec<usize>,

    /// Quadrature point states (ngauss)
    pub states: Vec<QuadraturePointState>,

    /// Local residual vector
    pub residual: Vector,

    /// Local Jacobian (tangent) matrix
    pub jacobian: Matrix,
}

impl ElementSolid {
    /// Allocates a new instance and sets up the quadrature point states
    pub fn new(mesh: &Mesh, cell: &Cell, param: &ParamSolid, config: &Config) -> Result<Self, StrError> {
        let ndim = mesh.ndim;
        if cell.kind.ndim() != ndim {
            return Err("solid elements require cells with geometry ndim = space ndim");
        }
        let mut pad = Scratchpad::new(ndim, cell.kind)?;
        mesh.set_pad(&mut pad, &cell.points);
        let gauss = Gauss::new_or_sized(cell.kind, config.ngauss)?;
        let mut states = Vec::with_capacity(gauss.npoint());
        for _ in 0..gauss.npoint() {
            let mut state = QuadraturePointState::new();
            state.setup(param)?;
            states.push(state);
        }
        let local_to_global = compute_local_to_global(ndim, &cell.points);
        let neq = local_to_global.len();
        let (alpha1, ..) = config.newmark_coefficients();
        Ok(ElementSolid {
            cell_id: cell.id,
            ndim,
            density: param.density,
            gravity: config.gravity.clone(),
            dynamics: config.dynamics,
            alpha1,
            pad,
            gauss,
            local_to_global,
            states,
            residual: Vector::new(neq),
            jacobian: Matrix::new(neq, neq),
        })
    }

    /// Computes the spatial gradients ∇ₓNᵃ (nnode, ndim) at an integration point
    ///
    /// Returns the reference volume element (det(Jacobian) × weight).
    fn spatial_gradients(&mut self, p: usize, gx: &mut Matrix) -> Result<f64, StrError> {
        let (ndim, nnode) = (self.ndim, self.pad.kind.nnode());
        let ksi = self.gauss.coords(p);
        let det = self.pad.calc_gradient(ksi)?;
        let ff_inv = self.states[p].ff_inv();
        for a in 0..nnode {
            for j in 0..ndim {
                let mut value = 0.0;
                for k in 0..ndim {
                    value += self.pad.gradient.get(a, k) * ff_inv.get(k, j);
                }
                gx.set(a, j, value);
            }
        }
        Ok(det * self.gauss.weight(p))
    }

    /// Updates the quadrature point states with the trial displacement U + ΔU
    pub fn update_states(&mut self, state: &SolidState) -> Result<(), StrError> {
        let (ndim, nnode) = (self.ndim, self.pad.kind.nnode());
        let mut grad_u = [[0.0; 3]; 3];
        for p in 0..self.gauss.npoint() {
            let ksi = self.gauss.coords(p);
            self.pad.calc_gradient(ksi)?;
            for i in 0..ndim {
                for j in 0..ndim {
                    grad_u[i][j] = 0.0;
                    for m in 0..nnode {
                        grad_u[i][j] += state.u_trial(self.local_to_global[i + ndim * m]) * self.pad.gradient.get(m, j);
                    }
                }
            }
            let tensor = Tensor2::from_matrix(&grad_u, Mandel::General)?;
            self.states[p].update(&tensor)?;
        }
        Ok(())
    }

    /// Calculates the local residual vector
    pub fn calc_residual(&mut self, state: &SolidState) -> Result<(), StrError> {
        let (ndim, nnode) = (self.ndim, self.pad.kind.nnode());
        let mut gx = Matrix::new(nnode, ndim);
        self.residual.fill(0.0);
        for p in 0..self.gauss.npoint() {
            let dv = self.spatial_gradients(p, &mut gx)?;

            // internal forces
            let tau = self.states[p].tau();
            for a in 0..nnode {
                for i in 0..ndim {
                    let mut value = 0.0;
                    for j in 0..ndim {
                        value += tau.get(i, j) * gx.get(a, j);
                    }
                    self.residual[i + ndim * a] += value * dv;
                }
            }
        }

        // body forces and inertia: ρ (a - g)
        let (dynamics, alpha1, density) = (self.dynamics, self.alpha1, self.density);
        let gravity = &self.gravity;
        let local_to_global = &self.local_to_global;
        let mut args = integ::CommonArgs::new(&mut self.pad, &self.gauss);
        args.clear = false;
        integ::vec_02_nv(&mut self.residual, &mut args, |v, _, nn| {
            for i in 0..ndim {
                let mut acc = 0.0;
                if dynamics {
                    for b in 0..nnode {
                        let eq = local_to_global[i + ndim * b];
                        acc += nn[b] * (alpha1 * state.duu[eq] + state.aa_star[eq]);
                    }
                }
                v[i] = density * (acc - gravity[i]);
            }
            Ok(())
        })
    }

    /// Calculates the local Jacobian (tangent) matrix
    pub fn calc_jacobian(&mut self, _state: &SolidState) -> Result<(), StrError> {
        let (ndim, nnode) = (self.ndim, self.pad.kind.nnode());
        let mut gx = Matrix::new(nnode, ndim);
        self.jacobian.fill(0.0);
        for p in 0..self.gauss.npoint() {
            let dv = self.spatial_gradients(p, &mut gx)?;
            let tau = self.states[p].tau();
            let jc = self.states[p].jc();
            for a in 0..nnode {
                for b in 0..nnode {
                    // geometric stiffness: ∇ₓNᵃ · τ · ∇ₓNᵇ
                    let mut geo = 0.0;
                    for j in 0..ndim {
                        for l in 0..ndim {
                            geo += gx.get(a, j) * tau.get(j, l) * gx.get(b, l);
                        }
                    }
                    for i in 0..ndim {
                        for k in 0..ndim {
                            let mut mat = 0.0;
                            for j in 0..ndim {
                                for l in 0..ndim {
                                    mat += gx.get(a, j) * jc.get(i, j, k, l) * gx.get(b, l);
                                }
                            }
                            if i == k {
                                mat += geo;
                            }
                            let (r, c) = (i + ndim * a, k + ndim * b);
                            self.jacobian.set(r, c, self.jacobian.get(r, c) + mat * dv);
                        }
                    }
                }
            }
        }

        // mass matrix: α₁ ρ Nᵃ Nᵇ δᵢₖ
        if self.dynamics {
            let value = self.alpha1 * self.density;
            let mut args = integ::CommonArgs::new(&mut self.pad, &self.gauss);
            args.clear = false;
            integ::mat_08_ntn(&mut self.jacobian, &mut args, |tt, _, _, _| {
                tt.clear();
                for i in 0..ndim {
                    tt.sym_set(i, i, value);
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    /// Calculates the deformed volume (area in 2D) of the element: ∫ J dV
    pub fn deformed_volume(&mut self) -> Result<f64, StrError> {
        let mut volume = 0.0;
        for p in 0..self.gauss.npoint() {
            let ksi = self.gauss.coords(p);
            let det = self.pad.calc_jacobian(ksi)?;
            volume += self.states[p].det_ff() * det * self.gauss.weight(p);
        }
        Ok(volume)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ElementSolid;
    use crate::base::{generate_homogeneous_displacement_field, Config, ParamSolid, SampleMeshes};
    use crate::fem::SolidState;
    use gemlab::mesh::{Cell, Mesh, Point};
    use gemlab::shapes::GeoKind;
    use russell_lab::{approx_eq, vec_copy};

    #[test]
    fn new_captures_errors() {
        let mesh = SampleMeshes::one_qua4();
        let mut param = ParamSolid::sample_neo_hookean();
        param.model = "Unknown".to_string();
        let config = Config::new(2);
        assert_eq!(
            ElementSolid::new(&mesh, &mesh.cells[0], &param, &config).err(),
            Some("material model is not implemented")
        );
        #[rustfmt::skip]
        let wrong = Mesh {
            ndim: 2,
            points: vec![
                Point { id: 0, marker: 0, coords: vec![0.0, 0.0] },
                Point { id: 1, marker: 0, coords: vec![1.0, 0.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute: 1, kind: GeoKind::Lin2, points: vec![0, 1] },
            ],
        };
        let param = ParamSolid::sample_neo_hookean();
        assert_eq!(
            ElementSolid::new(&wrong, &wrong.cells[0], &param, &config).err(),
            Some("solid elements require cells with geometry ndim = space ndim")
        );
    }

    #[test]
    fn zero_displacement_gives_zero_residual() {
        let mesh = SampleMeshes::one_qua4();
        let param = ParamSolid::sample_neo_hookean();
        let config = Config::new(2);
        let mut elem = ElementSolid::new(&mesh, &mesh.cells[0], &param, &config).unwrap();
        assert_eq!(elem.states.len(), 4);
        let state = SolidState::new(8, config.dt);
        elem.update_states(&state).unwrap();
        elem.calc_residual(&state).unwrap();
        assert!(elem.residual.as_data().iter().all(|r| *r == 0.0));
        approx_eq(elem.deformed_volume().unwrap(), 1.0, 1e-15);
    }

    #[test]
    fn body_force_works() {
        let mesh = SampleMeshes::one_qua4();
        let mut param = ParamSolid::sample_neo_hookean();
        param.density = 2.0;
        let mut config = Config::new(2);
        config.set_gravity(&[0.0, -10.0]).unwrap();
        let mut elem = ElementSolid::new(&mesh, &mesh.cells[0], &param, &config).unwrap();
        let state = SolidState::new(8, config.dt);
        elem.calc_residual(&state).unwrap();
        // -ρ g A / 4 at each node (y component)
        for m in 0..4 {
            approx_eq(elem.residual[0 + 2 * m], 0.0, 1e-15);
            approx_eq(elem.residual[1 + 2 * m], 5.0, 1e-14);
        }
    }

    #[test]
    fn homogeneous_deformation_works() {
        let mesh = SampleMeshes::one_qua4();
        let param = ParamSolid::sample_neo_hookean();
        let config = Config::new(2);
        let mut elem = ElementSolid::new(&mesh, &mesh.cells[0], &param, &config).unwrap();
        let mut state = SolidState::new(8, config.dt);
        let hh = [[0.1, 0.0, 0.0], [0.0, -0.05, 0.0], [0.0, 0.0, 0.0]];
        let uu = generate_homogeneous_displacement_field(&mesh, &hh);
        vec_copy(&mut state.uu, &uu).unwrap();
        elem.update_states(&state).unwrap();
        let jj = 1.1 * 0.95;
        for s in &elem.states {
            approx_eq(s.det_ff(), jj, 1e-15);
        }
        approx_eq(elem.deformed_volume().unwrap(), jj, 1e-14);

        // the nodal forces of a homogeneous stress field are self-equilibrated
        elem.calc_residual(&state).unwrap();
        let (mut sum_x, mut sum_y) = (0.0, 0.0);
        for m in 0..4 {
            sum_x += elem.residual[0 + 2 * m];
            sum_y += elem.residual[1 + 2 * m];
        }
        approx_eq(sum_x, 0.0, 1e-12);
        approx_eq(sum_y, 0.0, 1e-12);
    }

    #[test]
    fn jacobian_matches_numerical_derivative() {
        // distorted cell with a non-homogeneous deformation
        #[rustfmt::skip]
        let mesh = Mesh {
            ndim: 2,
            points: vec![
                Point { id: 0, marker: 0, coords: vec![0.0, 0.0] },
                Point { id: 1, marker: 0, coords: vec![1.2, 0.1] },
                Point { id: 2, marker: 0, coords: vec![1.0, 0.9] },
                Point { id: 3, marker: 0, coords: vec![-0.1, 1.1] },
            ],
            cells: vec![
                Cell { id: 0, attribute: 1, kind: GeoKind::Qua4, points: vec![0, 1, 2, 3] },
            ],
        };
        let param = ParamSolid {
            density: 3.0,
            model: "NeoHookean".to_string(),
            constants: vec![10.0, 25.0],
        };
        for dynamics in [false, true] {
            let mut config = Config::new(2);
            config.set_time(0.1, 1.0).unwrap();
            if dynamics {
                config.set_dynamics(0.25, 0.5).unwrap();
            }
            let mut elem = ElementSolid::new(&mesh, &mesh.cells[0], &param, &config).unwrap();
            let mut state = SolidState::new(8, config.dt);
            let u_values = [0.0, 0.0, 0.1, 0.02, 0.15, -0.05, -0.03, 0.08];
            let du_values = [0.01, -0.02, 0.0, 0.03, -0.01, 0.02, 0.02, 0.0];
            for l in 0..8 {
                state.uu[l] = u_values[l];
                state.duu[l] = du_values[l];
                state.aa_star[l] = 0.5 * u_values[l];
            }
            elem.update_states(&state).unwrap();
            elem.calc_jacobian(&state).unwrap();
            let kk = elem.jacobian.clone();
            let h = 1e-6;
            for c in 0..8 {
                let original = state.duu[c];
                state.duu[c] = original + h;
                elem.update_states(&state).unwrap();
                elem.calc_residual(&state).unwrap();
                let r_plus = elem.residual.clone();
                state.duu[c] = original - h;
                elem.update_states(&state).unwrap();
                elem.calc_residual(&state).unwrap();
                let r_minus = elem.residual.clone();
                state.duu[c] = original;
                for r in 0..8 {
                    let num = (r_plus[r] - r_minus[r]) / (2.0 * h);
                    approx_eq(kk.get(r, c), num, 1e-6);
                }
            }
        }
    }
}
