//! Process-wide constants shared by the resumable search and the batch
//! scheduler.

/// Maximum explicit-stack depth for [`crate::solver::resumable::ResumableSearch`],
/// mirroring the original's `STACK_MAX_DEPTH`. At `N = 25`, `2 * N^2 = 1250`
/// search-tree levels are possible in principle, but in practice a puzzle
/// that needs anywhere near that many unresolved branches is already
/// degenerate; this bound exists to cap checkpoint file size.
pub const STACK_MAX_DEPTH: usize = 626;

/// Node budget for the first ("light") pass of [`crate::scheduling::run_batch`].
pub const LIGHT_NODE_LIMIT: i64 = 15_000;

/// Node budget for the second ("heavy") pass.
pub const HEAVY_NODE_LIMIT: i64 = 60_000;

/// Default batch input file name.
pub const DEFAULT_INPUT_FILE: &str = "input.txt";

/// Default batch solution output file name.
pub const DEFAULT_OUTPUT_FILE: &str = "solution.txt";

/// Default batch log file name.
pub const DEFAULT_LOG_FILE: &str = "log.txt";
