/// Defines the directory where the simulation result files are saved
pub const DEFAULT_OUT_DIR: &str = "/tmp/fsisim/results";

/// Defines an auxiliary directory where the test result files are saved
pub const DEFAULT_TEST_DIR: &str = "/tmp/fsisim/test";

/// Defines the smallest time difference still considered as remaining simulation time
pub const TIME_EPSILON: f64 = 1e-12;

/// Defines the tolerance on reference coordinates when checking whether a point is inside a cell
pub const KSI_TOLERANCE: f64 = 1e-10;
