use fsisim::prelude::*;
use russell_lab::approx_eq;

fn still(v: &mut [f64], _x: &[f64], _t: f64) {
    v[0] = 0.0;
    v[1] = 0.0;
}

fn hydrostatic(x: &[f64], _t: f64) -> f64 {
    1.0 - x[1]
}

#[test]
fn test_fsi_block_in_flow() -> Result<(), StrError> {
    // fluid: 4 × 4 cells over [0,1]²
    // solid: [0.25, 0.75] × [0, 0.5] with the bottom edge fixed
    //
    //  ┌───┬───┬───┬───┐
    //  │   │   │   │   │
    //  ├───┼───┼───┼───┤
    //  │   │   │   │   │
    //  ├───╔═══════╗───┤
    //  │   ║ solid ║   │
    //  ├───╫───┼───╫───┤
    //  │   ║   │   ║   │
    //  └───╚═══════╝───┘
    let mesh = SampleMeshes::rectangle(0.25, 0.75, 0.0, 0.5, 2, 2);
    let param = ParamSolid::sample_neo_hookean();
    let mut config = Config::new(2);
    config
        .set_time(0.1, 0.3)?
        .set_gravity(&[0.0, -1.0])?
        .set_mesh_levels(0, 1)?
        .set_refinement_distance(0.2)?
        .set_intervals(1, 1, 3)
        .set_output(DEFAULT_TEST_DIR, "test_fsi_block_in_flow");
    let mut essential = Essential::new();
    essential.fix(&SampleMeshes::points_at(&mesh, 1, 0.0), 2);
    let solid = SolidSolver::new(&mesh, &param, &config, &essential)?;
    let fluid = PrescribedFlow::new(&config, &[0.0, 0.0], &[1.0, 1.0], 4, 4, still, hydrostatic)?;
    let mut fsi = Fsi::new(&config, solid, fluid)?;
    fsi.run()?;

    // time
    assert_eq!(fsi.time.timestep, 3);
    approx_eq(fsi.time.current, 0.3, 1e-14);
    assert_eq!(fsi.solid.state.timestep, 3);

    // the four fluid cells around the solid centers were refined once
    let n_cell = fsi.fluid.mesh().cells.len();
    assert_eq!(n_cell, 28);
    let n_refined = (0..n_cell).filter(|c| fsi.fluid.cell_level(*c) == 1).count();
    assert_eq!(n_refined, 16);

    // at least the fluid cells strictly inside the solid are covered
    assert!(fsi.fluid.coupling().n_indicated() >= 16);

    // the solid deforms slightly and the reference mesh is unchanged
    let top = SampleMeshes::points_at(&mesh, 1, 0.5);
    let uy = fsi.solid.point_displacement(top[1])[1];
    assert!(uy < 0.0 && uy > -1e-2);
    for (a, b) in fsi.current_solid_mesh().points.iter().zip(&mesh.points) {
        assert_eq!(a.coords, b.coords);
    }

    // saved state
    let path = config.path_solid_state(3).unwrap();
    let state = SolidState::read_json(&path)?;
    assert_eq!(state.timestep, 3);
    assert_eq!(state.uu.dim(), fsi.solid.n_equation());
    Ok(())
}
