use crate::base::{assemble_vector, compute_local_to_global};
use crate::StrError;
use gemlab::integ::{self, Gauss};
use gemlab::mesh::{Feature, Features, Mesh, PointId};
use gemlab::shapes::{GeoKind, Scratchpad};
use rayon::prelude::*;
use russell_lab::Vector;

/// Returns the faces (edges in 2D) on the boundary of the mesh
///
/// The face points follow the FEM order of the owner cell; thus, the normal vectors
/// computed from them point outward. The faces are sorted by their keys.
pub fn boundary_faces(mesh: &Mesh) -> Vec<Feature> {
    let features = Features::new(mesh, false);
    if mesh.ndim == 2 {
        let mut keys: Vec<_> = features.edges.keys().copied().collect();
        keys.sort();
        keys.iter().map(|k| features.edges[k].clone()).collect()
    } else {
        let mut keys: Vec<_> = features.faces.keys().copied().collect();
        keys.sort();
        keys.iter().map(|k| features.faces[k].clone()).collect()
    }
}

/// Holds a solid boundary face exposed to the fluid
pub struct FsiFace {
    /// The geometry kind of the face
    pub kind: GeoKind,

    /// The points of the face (outward order)
    pub points: Vec<PointId>,

    /// Scratchpad with the reference coordinates of the face
    pub pad: Scratchpad,

    /// Integration points of the face
    pub gauss: Gauss,

    /// Local-to-global map of the equations of the face
    pub local_to_global: Vec<usize>,

    /// Traction vectors at the integration points (ngauss, ndim)
    pub traction: Vec<Vec<f64>>,

    /// Local residual vector (minus the external force)
    pub residual: Vector,
}

/// Holds the tractions exerted by the fluid on the solid boundary
pub struct BcFsi {
    /// All faces exposed to the fluid
    pub all: Vec<FsiFace>,
}

impl BcFsi {
    /// Allocates a new instance
    ///
    /// A boundary face is exposed to the fluid unless all displacement components
    /// of all of its points are prescribed.
    pub fn new(mesh: &Mesh, prescribed: &[bool]) -> Result<Self, StrError> {
        let ndim = mesh.ndim;
        let mut all = Vec::new();
        for face in boundary_faces(mesh) {
            let local_to_global = compute_local_to_global(ndim, &face.points);
            if local_to_global.iter().all(|eq| prescribed[*eq]) {
                continue;
            }
            let mut pad = Scratchpad::new(ndim, face.kind)?;
            mesh.set_pad(&mut pad, &face.points);
            let gauss = Gauss::new(face.kind);
            let ngauss = gauss.npoint();
            all.push(FsiFace {
                kind: face.kind,
                points: face.points,
                pad,
                gauss,
                residual: Vector::new(local_to_global.len()),
                traction: vec![vec![0.0; ndim]; ngauss],
                local_to_global,
            });
        }
        Ok(BcFsi { all })
    }

    /// Computes the local residual vectors in parallel
    pub fn calc_residuals_parallel(&mut self) -> Result<(), StrError> {
        self.all.par_iter_mut().map(|f| f.calc_residual()).collect()
    }

    /// Assembles the local residual vectors
    ///
    /// **Note:** The global vector R will **not** be cleared
    pub fn assemble_residuals(&self, rr: &mut Vector, prescribed: &[bool]) {
        self.all
            .iter()
            .for_each(|f| assemble_vector(rr, &f.residual, &f.local_to_global, prescribed));
    }
}

impl FsiFace {
    /// Calculates the local residual vector
    pub fn calc_residual(&mut self) -> Result<(), StrError> {
        let ndim = self.pad.xxt.dims().0;
        let traction = &self.traction;
        let mut args = integ::CommonArgs::new(&mut self.pad, &self.gauss);
        integ::vec_02_nv_bry(&mut self.residual, &mut args, |v, p, _, _| {
            // note the negative sign
            //                 ↓
            // →    ⌠              ⌠    →
            // rᵐ = │ ... dΩ   ─   │ Nᵐ t dΓ
            //      ⌡              ⌡
            //      Ωₑ             Γₑ
            //                \_____________/
            //                we compute this
            for i in 0..ndim {
                v[i] = -traction[p][i];
            }
            Ok(())
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
