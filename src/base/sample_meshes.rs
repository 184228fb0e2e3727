use gemlab::mesh::{Cell, Mesh, Point};
use gemlab::shapes::GeoKind;

/// Holds sample meshes for the solid and fluid domains
pub struct SampleMeshes {}

impl SampleMeshes {
    /// Returns a mesh with a single unit square
    #[rustfmt::skip]
    pub fn one_qua4() -> Mesh {
        //      y
        //      ^
        // 1.0  3------------2
        //      |            |    [#] indicates id
        //      |    [0]     |    (#) indicates attribute
        //      |    (1)     |
        //      |            |
        // 0.0  0------------1 -> x
        //     0.0          1.0
        Mesh {
            ndim: 2,
            points: vec![
                Point { id: 0, marker: 0, coords: vec![0.0, 0.0] },
                Point { id: 1, marker: 0, coords: vec![1.0, 0.0] },
                Point { id: 2, marker: 0, coords: vec![1.0, 1.0] },
                Point { id: 3, marker: 0, coords: vec![0.0, 1.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute: 1, kind: GeoKind::Qua4, points: vec![0, 1, 2, 3] },
            ],
        }
    }

    /// Returns a structured mesh of Qua4 cells over a rectangle
    ///
    /// The points are numbered row-by-row, from the bottom-left corner:
    ///
    /// ```text
    /// (nx+1)ny ... (nx+1)(ny+1)-1
    ///    ...
    /// nx+1   nx+2   ...   2nx+1
    ///  0      1     ...    nx
    /// ```
    ///
    /// The cells are also numbered row-by-row with counterclockwise connectivity.
    pub fn rectangle(xmin: f64, xmax: f64, ymin: f64, ymax: f64, nx: usize, ny: usize) -> Mesh {
        let (dx, dy) = ((xmax - xmin) / (nx as f64), (ymax - ymin) / (ny as f64));
        let mut points = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..(ny + 1) {
            for i in 0..(nx + 1) {
                let id = points.len();
                let coords = vec![xmin + (i as f64) * dx, ymin + (j as f64) * dy];
                points.push(Point { id, marker: 0, coords });
            }
        }
        let mut cells = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let a = i + j * (nx + 1);
                let b = a + nx + 1;
                let id = cells.len();
                cells.push(Cell {
                    id,
                    attribute: 1,
                    kind: GeoKind::Qua4,
                    points: vec![a, a + 1, b + 1, b],
                });
            }
        }
        Mesh { ndim: 2, points, cells }
    }

    /// Returns a structured mesh of Hex8 cells over a box
    ///
    /// The points are numbered layer-by-layer (z), then row-by-row (y), then along x.
    pub fn block(min: &[f64; 3], max: &[f64; 3], nx: usize, ny: usize, nz: usize) -> Mesh {
        let n = [nx, ny, nz];
        let mut delta = [0.0; 3];
        for i in 0..3 {
            delta[i] = (max[i] - min[i]) / (n[i] as f64);
        }
        let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..(nz + 1) {
            for j in 0..(ny + 1) {
                for i in 0..(nx + 1) {
                    let id = points.len();
                    let coords = vec![
                        min[0] + (i as f64) * delta[0],
                        min[1] + (j as f64) * delta[1],
                        min[2] + (k as f64) * delta[2],
                    ];
                    points.push(Point { id, marker: 0, coords });
                }
            }
        }
        let index = |i: usize, j: usize, k: usize| i + j * (nx + 1) + k * (nx + 1) * (ny + 1);
        let mut cells = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let id = cells.len();
                    cells.push(Cell {
                        id,
                        attribute: 1,
                        kind: GeoKind::Hex8,
                        points: vec![
                            index(i, j, k),
                            index(i + 1, j, k),
                            index(i + 1, j + 1, k),
                            index(i, j + 1, k),
                            index(i, j, k + 1),
                            index(i + 1, j, k + 1),
                            index(i + 1, j + 1, k + 1),
                            index(i, j + 1, k + 1),
                        ],
                    });
                }
            }
        }
        Mesh { ndim: 3, points, cells }
    }

    /// Returns the ids of the points with a coordinate (along `dim`) equal to `value`
    pub fn points_at(mesh: &Mesh, dim: usize, value: f64) -> Vec<usize> {
        mesh.points
            .iter()
            .filter(|p| f64::abs(p.coords[dim] - value) < 1e-10)
            .map(|p| p.id)
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::SampleMeshes;
    use gemlab::shapes::GeoKind;

    #[test]
    fn one_qua4_works() {
        let mesh = SampleMeshes::one_qua4();
        assert_eq!(mesh.points.len(), 4);
        assert_eq!(mesh.cells[0].kind, GeoKind::Qua4);
    }

    #[test]
    fn rectangle_works() {
        // 6-----7-----8
        // | [2] | [3] |
        // 3-----4-----5
        // | [0] | [1] |
        // 0-----1-----2
        let mesh = SampleMeshes::rectangle(0.0, 2.0, 0.0, 1.0, 2, 2);
        assert_eq!(mesh.points.len(), 9);
        assert_eq!(mesh.cells.len(), 4);
        assert_eq!(mesh.cells[0].points, &[0, 1, 4, 3]);
        assert_eq!(mesh.cells[3].points, &[4, 5, 8, 7]);
        assert_eq!(mesh.points[8].coords, &[2.0, 1.0]);
        assert_eq!(mesh.points[4].coords, &[1.0, 0.5]);
        assert_eq!(SampleMeshes::points_at(&mesh, 0, 0.0), &[0, 3, 6]);
        assert_eq!(SampleMeshes::points_at(&mesh, 1, 1.0), &[6, 7, 8]);
    }

    #[test]
    fn block_works() {
        let mesh = SampleMeshes::block(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0], 1, 1, 2);
        assert_eq!(mesh.points.len(), 12);
        assert_eq!(mesh.cells.len(), 2);
        assert_eq!(mesh.cells[0].points, &[0, 1, 3, 2, 4, 5, 7, 6]);
        assert_eq!(mesh.cells[1].points, &[4, 5, 7, 6, 8, 9, 11, 10]);
        assert_eq!(mesh.points[11].coords, &[1.0, 1.0, 1.0]);
        assert_eq!(mesh.points[4].coords, &[0.0, 0.0, 0.5]);
    }
}
