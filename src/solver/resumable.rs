//! Explicit-stack, checkpointable DFS.
//!
//! [`crate::solver::backtracking::find_one`] recurses natively and is fine
//! for a single solve. This is the variant for batch processing: its whole
//! state is a flat `Vec` of frames that can be serialized to disk between
//! steps and picked back up by a later process, and a bound on how deep
//! that stack may grow.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::clue::Puzzle;
use crate::config::STACK_MAX_DEPTH;
use crate::engine::Engine;
use crate::error::CheckpointError;
use crate::solver::line::run_driver;
use crate::solver::probing::{propagate, ProbeOutcome, SquareToGo};
use crate::status::Status;

/// One level of the emulated call stack: which branch of this level's
/// stall, if any, is currently being explored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Frame {
    step: u8,
    branch: Option<SquareToGo>,
}

/// Search state for one puzzle, advanced one node at a time by [`step`] and
/// serializable between steps to a checkpoint file.
///
/// [`step`]: ResumableSearch::step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumableSearch {
    frames: Vec<Frame>,
    depth: i64,
    node_count: u64,
    board: Board,
}

impl ResumableSearch {
    pub fn new(n: usize) -> Self {
        ResumableSearch {
            frames: Vec::new(),
            depth: 0,
            node_count: 0,
            board: Board::new(n),
        }
    }

    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn frame(&mut self, depth: usize) -> &mut Frame {
        while self.frames.len() <= depth {
            self.frames.push(Frame::default());
        }
        &mut self.frames[depth]
    }

    /// Runs one transition of the depth/step state machine: `step == 0`
    /// probes the current board, committing to its first branch on a
    /// stall; `step == 1` retries with the second branch; `step == 2`
    /// backtracks once both have been exhausted. `node_limit` is
    /// decremented on every `step == 0` transition and going negative
    /// yields [`Status::Timeout`] so the caller can checkpoint and stop.
    fn step(&mut self, puzzle: &Puzzle, engine: &mut Engine, node_limit: &mut i64) -> Status {
        if self.depth < 0 {
            return Status::Conflict;
        }
        if self.depth as usize >= STACK_MAX_DEPTH {
            warn!("resumable search hit its depth bound of {}", STACK_MAX_DEPTH);
            return Status::Conflict;
        }
        let depth = self.depth as usize;
        let current_step = self.frame(depth).step;

        match current_step {
            0 => {
                *node_limit -= 1;
                self.node_count += 1;
                match propagate(&mut self.board, puzzle, engine) {
                    ProbeOutcome::Solved => return Status::Solved,
                    ProbeOutcome::Conflict => {
                        self.frame(depth).step = 0;
                        self.depth -= 1;
                    }
                    ProbeOutcome::Stalled(branch) => {
                        self.board = branch.first_go;
                        let f = self.frame(depth);
                        f.step = 1;
                        f.branch = Some(branch);
                        self.depth += 1;
                    }
                }
                if *node_limit < 0 {
                    return Status::Timeout;
                }
            }
            1 => {
                let branch = self.frame(depth)
                    .branch
                    .clone()
                    .expect("step 1 is only reached after step 0 recorded a branch");
                self.board = branch.second_go;
                self.frame(depth).step = 2;
                self.depth += 1;
            }
            2 => {
                self.frame(depth).step = 0;
                self.depth -= 1;
            }
            _ => unreachable!("frame step is always 0, 1, or 2"),
        }

        if self.depth < 0 {
            Status::Conflict
        } else {
            Status::Unsolved
        }
    }

    /// Steps until a terminal status. `node_limit` bounds how many times
    /// the propagation layer may run before giving up with [`Status::Timeout`].
    pub fn run(&mut self, puzzle: &Puzzle, engine: &mut Engine, node_limit: i64) -> Status {
        let mut budget = node_limit;
        loop {
            let status = self.step(puzzle, engine, &mut budget);
            if status != Status::Unsolved {
                return status;
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Option<Self>, CheckpointError> {
        match File::open(path) {
            Ok(file) => Ok(Some(bincode::deserialize_from(BufReader::new(file))?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Loads `checkpoint_path` if present, otherwise starts a fresh search
/// seeded by one line-solving pass over the whole board. Runs the
/// explicit-stack search up to `node_limit` nodes and, if it times out,
/// saves the state to `checkpoint_path` for a later call to resume.
/// Returns the resulting status alongside the board reached so far, so a
/// caller can score an unsolved puzzle's progress or render a solved one.
pub fn solve_resumable(
    checkpoint_path: &Path,
    puzzle: &Puzzle,
    engine: &mut Engine,
    node_limit: i64,
) -> Result<(Status, Board), CheckpointError> {
    let mut search = match ResumableSearch::load(checkpoint_path)? {
        Some(search) => search,
        None => {
            let mut fresh = ResumableSearch::new(puzzle.n());
            engine.queue.push_all(puzzle.n());
            match run_driver(&mut fresh.board, puzzle, engine) {
                Status::Solved => return Ok((Status::Solved, fresh.board)),
                Status::Conflict => return Ok((Status::Conflict, fresh.board)),
                Status::Unsolved => {}
                _ => unreachable!("run_driver only returns Solved, Conflict, or Unsolved"),
            }
            fresh
        }
    };

    let status = search.run(puzzle, engine, node_limit);
    if status == Status::Timeout {
        search.save(checkpoint_path)?;
    }
    Ok((status, search.board))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clue::Clue;

    fn engine_and_puzzle(n: usize, col: Vec<Vec<usize>>, row: Vec<Vec<usize>>) -> (Puzzle, Engine) {
        let col_clues = col.into_iter().map(Clue::new).collect();
        let row_clues = row.into_iter().map(Clue::new).collect();
        (Puzzle::new(col_clues, row_clues), Engine::new(n))
    }

    #[test]
    fn fresh_search_solves_a_fully_forced_board() {
        let (puzzle, mut engine) = engine_and_puzzle(5, vec![vec![5]; 5], vec![vec![5]; 5]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solo.dat");
        let (status, board) = solve_resumable(&path, &puzzle, &mut engine, 100).unwrap();
        assert_eq!(status, Status::Solved);
        assert_eq!(board.determined(), 25);
        assert!(!path.exists());
    }

    #[test]
    fn timeout_checkpoints_and_a_later_call_resumes_to_a_solution() {
        // One mark per row and column, 4x4: no line overlap forces any cell
        // and no single-cell probe cascades to a full solve, so this
        // genuinely needs DFS branching rather than resolving in one step.
        let (puzzle, mut engine) =
            engine_and_puzzle(4, vec![vec![1]; 4], vec![vec![1]; 4]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ambiguous.dat");

        let (status, _) = solve_resumable(&path, &puzzle, &mut engine, 0).unwrap();
        assert_eq!(status, Status::Timeout);
        assert!(path.exists());

        let (status, board) = solve_resumable(&path, &puzzle, &mut engine, 1000).unwrap();
        assert_eq!(status, Status::Solved);
        assert_eq!(board.determined(), 16);
    }

    #[test]
    fn unsolvable_board_backtracks_to_conflict() {
        let (puzzle, mut engine) = engine_and_puzzle(2, vec![vec![2], vec![]], vec![vec![], vec![2]]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("impossible.dat");
        let (status, _) = solve_resumable(&path, &puzzle, &mut engine, 100).unwrap();
        assert_eq!(status, Status::Conflict);
    }
}
