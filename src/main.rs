//! Command-line driver: a thin wrapper over the library's three entry
//! points (`SOLVE`, `GENERATE`, `BATCH`).

#[macro_use]
extern crate log;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use nonogrid_engine::board::{self, Board};
use nonogrid_engine::config;
use nonogrid_engine::engine::Engine;
use nonogrid_engine::error::{CheckpointError, ParseError};
use nonogrid_engine::parser;
use nonogrid_engine::render::render_taai;
use nonogrid_engine::scheduling::{run_batch, write_result};
use nonogrid_engine::solver::backtracking::{search_one_solution, search_two_solutions};
use nonogrid_engine::status::Status;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Parser)]
#[command(name = "solver", version, about = "Nonogram constraint-propagation and search engine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Find any one solution to a single puzzle.
    #[command(name = "SOLVE")]
    Solve { puzzle_file: PathBuf },
    /// Check whether a single puzzle's solution is unique.
    #[command(name = "GENERATE")]
    Generate { puzzle_file: PathBuf },
    /// Solve every puzzle in a batch input file.
    #[command(name = "BATCH")]
    Batch { input_file: Option<PathBuf> },
}

fn run_solve(puzzle_file: PathBuf) -> Result<bool, AppError> {
    let puzzle = parser::parse_one(BufReader::new(File::open(&puzzle_file)?), board::MAX_N)?;
    let mut board = Board::new(puzzle.n());
    let mut engine = Engine::new(puzzle.n());

    let start = Instant::now();
    let (status, node_count) = search_one_solution(&mut board, &puzzle, &mut engine);
    let elapsed = start.elapsed();

    println!("{}\t{:.3}", node_count, elapsed.as_secs_f64());
    print!("{}", render_taai(&board));
    Ok(status == Status::Solved)
}

fn run_generate(puzzle_file: PathBuf) -> Result<(), AppError> {
    let puzzle = parser::parse_one(BufReader::new(File::open(&puzzle_file)?), board::MAX_N)?;
    let mut board = Board::new(puzzle.n());
    let mut engine = Engine::new(puzzle.n());

    let (status, node_count) = search_two_solutions(&mut board, &puzzle, &mut engine);
    match status {
        Status::Solved => println!("{}", node_count),
        Status::Conflict => println!("-1"),
        Status::ManySolution => println!("-2"),
        Status::Unsolved | Status::Timeout => {
            unreachable!("search_two_solutions always reaches a terminal status")
        }
    }
    Ok(())
}

fn run_batch_command(input_file: Option<PathBuf>) -> Result<(), AppError> {
    let path = input_file.unwrap_or_else(|| PathBuf::from(config::DEFAULT_INPUT_FILE));
    let puzzles = parser::parse_batch(BufReader::new(File::open(&path)?), board::MAX_N)?;

    let checkpoint_dir = std::env::current_dir()?;
    let boards = run_batch(&puzzles, &checkpoint_dir)?;

    let text = write_result(&boards, board::MAX_N);
    fs::write(config::DEFAULT_OUTPUT_FILE, text)?;
    info!("wrote {}", config::DEFAULT_OUTPUT_FILE);
    Ok(())
}

fn main() -> Result<(), AppError> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Batch { input_file: None }) {
        Command::Solve { puzzle_file } => {
            if !run_solve(puzzle_file)? {
                std::process::exit(1);
            }
        }
        Command::Generate { puzzle_file } => run_generate(puzzle_file)?,
        Command::Batch { input_file } => run_batch_command(input_file)?,
    }
    Ok(())
}
