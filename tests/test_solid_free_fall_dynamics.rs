use fsisim::prelude::*;
use russell_lab::approx_eq;

#[test]
fn test_solid_free_fall_dynamics() -> Result<(), StrError> {
    // an unconstrained block falling under gravity: rigid translation
    const G: f64 = -10.0;
    const DT: f64 = 0.1;
    let mesh = SampleMeshes::rectangle(0.0, 1.0, 0.0, 0.5, 2, 1);
    let param = ParamSolid::sample_neo_hookean();
    let mut config = Config::new(2);
    config
        .set_time(DT, 1.0)?
        .set_gravity(&[0.0, G])?
        .set_dynamics(0.25, 0.5)?
        .set_newton(10, 1e-10, 1e-10)?;
    let essential = Essential::new();
    let mut solver = SolidSolver::new(&mesh, &param, &config, &essential)?;

    // Newmark recurrence with a(0) = 0 and a(t > 0) = g
    let (beta, gamma) = (0.25, 0.5);
    let (mut u, mut v, mut a) = (0.0, 0.0, 0.0);
    for _ in 0..3 {
        let n_iterations = solver.run_one_step(false)?;
        assert!(n_iterations <= 4);
        let a_new = G;
        u += DT * v + DT * DT * ((0.5 - beta) * a + beta * a_new);
        v += DT * ((1.0 - gamma) * a + gamma * a_new);
        a = a_new;
        for p in 0..mesh.points.len() {
            approx_eq(solver.state.uu[2 * p], 0.0, 1e-11);
            approx_eq(solver.state.uu[1 + 2 * p], u, 1e-11);
            approx_eq(solver.state.vv[1 + 2 * p], v, 1e-10);
            approx_eq(solver.state.aa[1 + 2 * p], a, 1e-9);
        }
    }

    // no distortion
    approx_eq(solver.deformed_volume()?, 0.5, 1e-12);
    Ok(())
}
