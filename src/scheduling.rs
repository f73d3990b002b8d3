//! Batch driver for solving many puzzles under a shared time budget.
//!
//! Mirrors the original's `scheduled_solver`: run every open puzzle through
//! a cheap ("light") node-limit tier, re-rank whatever's left by how close
//! it got, then spend a bigger ("heavy") budget on the puzzles closest to
//! done first, repeating the heavy tier until a full round makes no more
//! progress.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::board::Board;
use crate::clue::Puzzle;
use crate::config::{HEAVY_NODE_LIMIT, LIGHT_NODE_LIMIT};
use crate::engine::Engine;
use crate::error::CheckpointError;
use crate::render::render_taai;
use crate::solver::resumable::solve_resumable;
use crate::status::Status;

struct QuestionStatus {
    id: usize,
    /// `Solved` or `Conflict`: nothing further to gain from retrying.
    done: bool,
    determined: u32,
    board: Option<Board>,
}

fn checkpoint_path(dir: &Path, id: usize) -> PathBuf {
    dir.join(format!("{}.dat", id + 1))
}

/// Runs one node-limit tier over every open (`!done`) puzzle in
/// `questions`' current order, updating each in place.
fn run_tier(
    questions: &mut [QuestionStatus],
    puzzles: &[Puzzle],
    engines: &mut [Engine],
    checkpoint_dir: &Path,
    node_limit: i64,
) -> Result<(), CheckpointError> {
    for q in questions.iter_mut() {
        if q.done {
            continue;
        }
        let start = Instant::now();
        let path = checkpoint_path(checkpoint_dir, q.id);
        let (status, board) =
            solve_resumable(&path, &puzzles[q.id], &mut engines[q.id], node_limit)?;
        let elapsed = start.elapsed();

        q.determined = board.determined();
        match status {
            Status::Solved => {
                info!("#{} solved!!!", q.id + 1);
                q.done = true;
                q.board = Some(board);
            }
            Status::Conflict => {
                warn!("#{} has no solution", q.id + 1);
                q.done = true;
            }
            other => debug!("#{}\t{:.3?}\t{:?}", q.id + 1, elapsed, other),
        }
    }
    Ok(())
}

/// Solves every puzzle in `puzzles`, checkpointing under `checkpoint_dir`.
/// Returns one board per puzzle: `Some` if solved, `None` otherwise (the
/// caller renders those as an all-white placeholder via [`write_result`],
/// matching the original's fallback).
pub fn run_batch(
    puzzles: &[Puzzle],
    checkpoint_dir: &Path,
) -> Result<Vec<Option<Board>>, CheckpointError> {
    let mut engines: Vec<Engine> = puzzles.iter().map(|p| Engine::new(p.n())).collect();
    let mut questions: Vec<QuestionStatus> = (0..puzzles.len())
        .map(|id| QuestionStatus {
            id,
            done: false,
            determined: 0,
            board: None,
        })
        .collect();

    run_tier(&mut questions, puzzles, &mut engines, checkpoint_dir, LIGHT_NODE_LIMIT)?;
    info!(
        "solved: {}, limited: {}",
        questions.iter().filter(|q| q.board.is_some()).count(),
        LIGHT_NODE_LIMIT
    );

    // Spend the larger budget on whatever's closest to done first, since a
    // puzzle that's nearly forced is more likely to pay off than one still
    // wide open.
    questions.sort_by(|a, b| b.determined.cmp(&a.determined));

    loop {
        let before = questions.iter().filter(|q| q.done).count();
        if before == questions.len() {
            break;
        }
        run_tier(&mut questions, puzzles, &mut engines, checkpoint_dir, HEAVY_NODE_LIMIT)?;
        let after = questions.iter().filter(|q| q.done).count();
        info!(
            "solved: {}, limited: {}",
            questions.iter().filter(|q| q.board.is_some()).count(),
            HEAVY_NODE_LIMIT
        );
        if after == before {
            break;
        }
    }

    let mut boards: Vec<Option<Board>> = vec![None; puzzles.len()];
    for q in questions {
        boards[q.id] = q.board;
    }
    Ok(boards)
}

/// Assembles the final solution text: one `$<id>` header plus a TAAI board
/// per puzzle, substituting an all-white `n x n` board for any puzzle that
/// never solved.
pub fn write_result(boards: &[Option<Board>], n: usize) -> String {
    let mut out = String::new();
    for (idx, board) in boards.iter().enumerate() {
        out.push_str(&format!("${}\n", idx + 1));
        match board {
            Some(b) => out.push_str(&render_taai(b)),
            None => out.push_str(&render_taai(&Board::all_white(n))),
        }
    }
    out
}
