use super::{FluidCoupling, FluidField, FluidSolver, RefineFlag};
use crate::base::Config;
use crate::{FnSpaceTime, FnVecSpaceTime, StrError};
use gemlab::mesh::{Cell, CellId, Mesh, Point};
use gemlab::shapes::GeoKind;
use std::collections::HashMap;

/// Scale used to merge coincident quadtree corners into a single mesh point
const COORD_KEY_SCALE: f64 = 1e9;

/// Holds a node of the quadtree
#[derive(Clone, Debug)]
struct QuadNode {
    xmin: [f64; 2],
    xmax: [f64; 2],
    level: usize,
    parent: Option<usize>,
    children: Option<[usize; 4]>,
}

/// Implements a fluid with analytical velocity and pressure fields over an adaptive quadtree mesh
///
/// The active cells are the leaves of a quadtree of Qua4 cells. Refinement splits a leaf
/// into four children; coarsening merges four sibling leaves back into their parent when
/// all of them are flagged. The solution is transferred by evaluating the fields again.
pub struct PrescribedFlow {
    /// Velocity function v(x,t)
    velocity: FnVecSpaceTime,

    /// Pressure function p(x,t)
    pressure: FnSpaceTime,

    /// Current time
    pub t: f64,

    /// Time increment
    pub dt: f64,

    /// All quadtree nodes, including the free slots
    nodes: Vec<QuadNode>,

    /// Slots of merged nodes available for reuse
    free: Vec<usize>,

    /// Maps active cells to quadtree nodes
    leaves: Vec<usize>,

    /// Active mesh (the leaves)
    mesh: Mesh,

    /// Solution at the current time
    present: FluidField,

    /// Solution increment over the last time step
    increment: FluidField,

    /// Coupling data
    coupling: FluidCoupling,
}

impl PrescribedFlow {
    /// Allocates a new instance over a structured nx × ny grid (level 0)
    pub fn new(
        config: &Config,
        xmin: &[f64],
        xmax: &[f64],
        nx: usize,
        ny: usize,
        velocity: FnVecSpaceTime,
        pressure: FnSpaceTime,
    ) -> Result<Self, StrError> {
        if config.ndim != 2 {
            return Err("PrescribedFlow requires ndim = 2");
        }
        if xmin.len() != 2 || xmax.len() != 2 {
            return Err("PrescribedFlow requires two coordinates for xmin and xmax");
        }
        if nx < 1 || ny < 1 {
            return Err("PrescribedFlow requires nx ≥ 1 and ny ≥ 1");
        }
        if xmax[0] <= xmin[0] || xmax[1] <= xmin[1] {
            return Err("PrescribedFlow requires xmax > xmin");
        }
        let (dx, dy) = ((xmax[0] - xmin[0]) / (nx as f64), (xmax[1] - xmin[1]) / (ny as f64));
        let mut nodes = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let a = [xmin[0] + (i as f64) * dx, xmin[1] + (j as f64) * dy];
                nodes.push(QuadNode {
                    xmin: a,
                    xmax: [a[0] + dx, a[1] + dy],
                    level: 0,
                    parent: None,
                    children: None,
                });
            }
        }
        let leaves: Vec<_> = (0..nodes.len()).collect();
        let mesh = build_mesh(&nodes, &leaves);
        let npoint = mesh.points.len();
        let coupling = FluidCoupling::new(&mesh);
        Ok(PrescribedFlow {
            velocity,
            pressure,
            t: 0.0,
            dt: config.dt,
            nodes,
            free: Vec::new(),
            leaves,
            mesh,
            present: FluidField::new(2, npoint),
            increment: FluidField::new(2, npoint),
            coupling,
        })
    }

    /// Evaluates the analytical fields at the mesh points
    fn evaluate(&self, t: f64) -> FluidField {
        let mut field = FluidField::new(2, self.mesh.points.len());
        let mut v = [0.0; 2];
        for point in &self.mesh.points {
            (self.velocity)(&mut v, &point.coords, t);
            field.velocity[2 * point.id] = v[0];
            field.velocity[1 + 2 * point.id] = v[1];
            field.pressure[point.id] = (self.pressure)(&point.coords, t);
        }
        field
    }

    /// Computes the present solution and the increment from the previous time
    fn transfer_solution(&mut self) {
        self.present = self.evaluate(self.t);
        let old = self.evaluate(self.t - self.dt);
        self.increment = FluidField::new(2, self.mesh.points.len());
        for i in 0..self.present.velocity.dim() {
            self.increment.velocity[i] = self.present.velocity[i] - old.velocity[i];
        }
        for i in 0..self.present.pressure.dim() {
            self.increment.pressure[i] = self.present.pressure[i] - old.pressure[i];
        }
    }

    /// Splits a leaf into four children
    fn split(&mut self, id: usize) {
        let node = self.nodes[id].clone();
        let mid = [
            0.5 * (node.xmin[0] + node.xmax[0]),
            0.5 * (node.xmin[1] + node.xmax[1]),
        ];
        // 2-3
        // 0-1
        let boxes = [
            ([node.xmin[0], node.xmin[1]], [mid[0], mid[1]]),
            ([mid[0], node.xmin[1]], [node.xmax[0], mid[1]]),
            ([node.xmin[0], mid[1]], [mid[0], node.xmax[1]]),
            ([mid[0], mid[1]], [node.xmax[0], node.xmax[1]]),
        ];
        let children = boxes.map(|(a, b)| {
            self.allocate(QuadNode {
                xmin: a,
                xmax: b,
                level: node.level + 1,
                parent: Some(id),
                children: None,
            })
        });
        self.nodes[id].children = Some(children);
    }

    /// Merges the four children of a node and releases their slots
    fn merge(&mut self, id: usize) {
        if let Some(children) = self.nodes[id].children.take() {
            self.free.extend(children);
        }
    }

    /// Stores a node in a free slot or at the end
    fn allocate(&mut self, node: QuadNode) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }
}

/// Builds the active mesh from the quadtree leaves
///
/// Coincident corners are merged; hanging nodes are allowed.
fn build_mesh(nodes: &[QuadNode], leaves: &[usize]) -> Mesh {
    let mut points: Vec<Point> = Vec::new();
    let mut ids: HashMap<(i64, i64), usize> = HashMap::new();
    let mut cells = Vec::with_capacity(leaves.len());
    for (cell_id, leaf) in leaves.iter().enumerate() {
        let node = &nodes[*leaf];
        let corners = [
            [node.xmin[0], node.xmin[1]],
            [node.xmax[0], node.xmin[1]],
            [node.xmax[0], node.xmax[1]],
            [node.xmin[0], node.xmax[1]],
        ];
        let cell_points = corners
            .iter()
            .map(|x| {
                let key = (
                    (x[0] * COORD_KEY_SCALE).round() as i64,
                    (x[1] * COORD_KEY_SCALE).round() as i64,
                );
                *ids.entry(key).or_insert_with(|| {
                    let id = points.len();
                    points.push(Point {
                        id,
                        marker: 0,
                        coords: x.to_vec(),
                    });
                    id
                })
            })
            .collect();
        cells.push(Cell {
            id: cell_id,
            attribute: 1,
            kind: GeoKind::Qua4,
            points: cell_points,
        });
    }
    Mesh { ndim: 2, points, cells }
}

impl FluidSolver for PrescribedFlow {
    fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    fn setup(&mut self) -> Result<(), StrError> {
        self.present = self.evaluate(self.t);
        self.increment = FluidField::new(2, self.mesh.points.len());
        self.coupling = FluidCoupling::new(&self.mesh);
        Ok(())
    }

    fn run_one_step(&mut self, _first_step: bool) -> Result<(), StrError> {
        self.t += self.dt;
        self.transfer_solution();
        Ok(())
    }

    fn present_solution(&self) -> &FluidField {
        &self.present
    }

    fn solution_increment(&self) -> &FluidField {
        &self.increment
    }

    fn coupling(&self) -> &FluidCoupling {
        &self.coupling
    }

    fn coupling_mut(&mut self) -> &mut FluidCoupling {
        &mut self.coupling
    }

    fn cell_level(&self, cell_id: CellId) -> usize {
        self.nodes[self.leaves[cell_id]].level
    }

    fn execute_refinement(&mut self, flags: &[RefineFlag]) -> Result<(), StrError> {
        if flags.len() != self.leaves.len() {
            return Err("the number of refinement flags must equal the number of cells");
        }
        let flag_of: HashMap<usize, RefineFlag> = self.leaves.iter().copied().zip(flags.iter().copied()).collect();

        // coarsening: complete families of leaves flagged for coarsening
        let mut parents: Vec<usize> = self
            .leaves
            .iter()
            .filter_map(|leaf| self.nodes[*leaf].parent)
            .collect();
        parents.sort();
        parents.dedup();
        for parent in parents {
            if let Some(children) = self.nodes[parent].children {
                let all = children
                    .iter()
                    .all(|c| self.nodes[*c].children.is_none() && flag_of.get(c) == Some(&RefineFlag::Coarsen));
                if all {
                    self.merge(parent);
                }
            }
        }

        // refinement
        for (leaf, flag) in self.leaves.clone().iter().zip(flags) {
            if *flag == RefineFlag::Refine {
                self.split(*leaf);
            }
        }

        // new leaves (depth-first to keep neighbors close)
        let mut leaves = Vec::new();
        let mut stack: Vec<usize> = (0..self.nodes.len())
            .filter(|id| self.nodes[*id].parent.is_none())
            .rev()
            .collect();
        while let Some(id) = stack.pop() {
            match self.nodes[id].children {
                Some(children) => children.iter().rev().for_each(|c| stack.push(*c)),
                None => leaves.push(id),
            }
        }
        self.leaves = leaves;
        self.mesh = build_mesh(&self.nodes, &self.leaves);
        self.transfer_solution();
        self.coupling = FluidCoupling::new(&self.mesh);
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
