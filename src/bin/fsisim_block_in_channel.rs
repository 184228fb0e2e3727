use fsisim::prelude::*;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "fsisim_block_in_channel",
    about = "Runs an elastic block attached to the floor of a channel with a prescribed shear flow"
)]
struct Options {
    /// Final time
    #[structopt(long, default_value = "0.05")]
    t_fin: f64,

    /// Time step
    #[structopt(long, default_value = "0.01")]
    dt: f64,

    /// Number of time steps between mesh adaptations (0 disables)
    #[structopt(long, default_value = "2")]
    refinement_interval: usize,

    /// Number of time steps between saving the solid state (0 disables)
    #[structopt(long, default_value = "0")]
    save_interval: usize,

    /// Output directory
    #[structopt(long)]
    out_dir: Option<String>,

    /// Prints the Newton-Raphson iterations
    #[structopt(long)]
    verbose: bool,
}

/// Shear flow over the floor (y = 0)
fn shear_flow(v: &mut [f64], x: &[f64], _t: f64) {
    v[0] = 0.1 * x[1];
    v[1] = 0.0;
}

/// Hydrostatic pressure with the free surface at y = 1
fn hydrostatic(x: &[f64], _t: f64) -> f64 {
    1.0 - x[1]
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // configuration
    let mut config = Config::new(2);
    config
        .set_time(options.dt, options.t_fin)?
        .set_gravity(&[0.0, -1.0])?
        .set_viscosity(0.01)?
        .set_mesh_levels(0, 2)?
        .set_refinement_distance(0.2)?
        .set_intervals(1, options.refinement_interval, options.save_interval)
        .set_verbose(true, options.verbose);
    if let Some(out_dir) = &options.out_dir {
        config.set_output(out_dir, "block_in_channel");
    }

    // solid: 0.2 × 0.4 block with its base glued to the floor
    let mesh = SampleMeshes::rectangle(0.4, 0.6, 0.0, 0.4, 2, 4);
    let param = ParamSolid::sample_neo_hookean();
    let mut essential = Essential::new();
    essential.fix(&SampleMeshes::points_at(&mesh, 1, 0.0), 2);
    let solid = SolidSolver::new(&mesh, &param, &config, &essential)?;

    // fluid: 2 × 1 channel
    let fluid = PrescribedFlow::new(&config, &[0.0, 0.0], &[2.0, 1.0], 16, 8, shear_flow, hydrostatic)?;

    // run
    let mut fsi = Fsi::new(&config, solid, fluid)?;
    fsi.run()?;

    // message
    let volume = fsi.solid.deformed_volume()?;
    let top = SampleMeshes::points_at(&mesh, 1, 0.4);
    let ux_top = fsi.solid.point_displacement(top[top.len() - 1])[0];
    let thin_line = format!("{:─^1$}", "", 60);
    println!("\n{}", thin_line);
    println!("final time           = {:.6}", fsi.time.current);
    println!("fluid cells          = {}", fsi.fluid.mesh().cells.len());
    println!("solid deformed area  = {:.6}", volume);
    println!("top-right ux         = {:.6e}", ux_top);
    println!("{}\n", thin_line);
    Ok(())
}
