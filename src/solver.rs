//! The solving engine's layers, from cheapest to most expensive: per-line
//! propagation (`line`), probing (`probing`), native-recursion search
//! (`backtracking`), and the checkpointable search (`resumable`).

pub mod backtracking;
pub mod dependency;
pub mod line;
pub mod probing;
pub mod resumable;
