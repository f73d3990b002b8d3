#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]
//#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(unused_results)]
#![warn(unused_qualifications, unused_import_braces)]

#[macro_use]
extern crate log;

pub mod bitops;
pub mod board;
pub(crate) mod cache;
pub mod clue;
pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod render;
pub mod scheduling;
pub mod solver;
pub mod status;
pub mod workqueue;
pub(crate) mod zobrist;
