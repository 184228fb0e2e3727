use gemlab::mesh::Mesh;
use russell_lab::Vector;

/// Returns a new empty 2D mesh
#[allow(dead_code)]
pub(crate) fn new_empty_mesh_2d() -> Mesh {
    Mesh {
        ndim: 2,
        points: Vec::new(),
        cells: Vec::new(),
    }
}

/// Generates the displacement field u = H·X of a homogeneous deformation
///
/// H is the (constant) displacement gradient; F = I + H
#[allow(dead_code)]
pub(crate) fn generate_homogeneous_displacement_field(mesh: &Mesh, hh: &[[f64; 3]; 3]) -> Vector {
    let ndim = mesh.ndim;
    let mut uu = Vector::new(ndim * mesh.points.len());
    for point in &mesh.points {
        for i in 0..ndim {
            for j in 0..ndim {
                uu[i + ndim * point.id] += hh[i][j] * point.coords[j];
            }
        }
    }
    uu
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{generate_homogeneous_displacement_field, new_empty_mesh_2d};
    use crate::base::SampleMeshes;

    #[test]
    fn new_empty_mesh_works() {
        let mesh = new_empty_mesh_2d();
        assert_eq!(mesh.ndim, 2);
        assert_eq!(mesh.points.len(), 0);
    }

    #[test]
    fn generate_homogeneous_displacement_field_works() {
        let mesh = SampleMeshes::one_qua4();
        let hh = [[0.1, 0.0, 0.0], [0.0, -0.2, 0.0], [0.0, 0.0, 0.0]];
        let uu = generate_homogeneous_displacement_field(&mesh, &hh);
        assert_eq!(uu.as_data(), &[0.0, 0.0, 0.1, 0.0, 0.1, -0.2, 0.0, -0.2]);
    }
}
