// Parallel Root Search
//
// One unit of work per root move, run on a dedicated rayon pool of
// min(root moves, cpus) threads. Each worker rebuilds a private position from
// a serialized snapshot of the root, so no mutable state is shared and no
// locks are needed. Results are reduced only after every worker has finished.
//
// A failed worker (bad snapshot, move no longer legal, panic) contributes
// nothing. If every worker fails the result is empty, same as a position with
// no legal moves.

use super::evaluation::{Evaluator, Score};
use super::minimax::{minimax, SearchStats, SCORE_INF, SCORE_NEG_INF};
use super::move_ordering::ordered_legal_moves;
use super::search::{RootBest, SearchResult};
use crate::board::{BoardError, SearchPosition};
use log::{debug, info, warn};
use rand::Rng;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
enum WorkerError {
    #[error("cannot rebuild position: {0}")]
    Snapshot(#[from] BoardError),
    #[error("move {0} is not legal in the rebuilt position")]
    IllegalMove(String),
    #[error("worker panicked")]
    Panicked,
}

type WorkerOutcome = Result<(Score, SearchStats), WorkerError>;

/// Search a single root move on a private copy of the root position
fn search_root_move<P, E>(snapshot: &str, mv: P::Move, depth: u8, evaluator: &E) -> WorkerOutcome
where
    P: SearchPosition,
    E: Evaluator<P> + ?Sized,
{
    let mut pos = P::deserialize(snapshot)?;
    if !pos.legal_moves().contains(&mv) {
        return Err(WorkerError::IllegalMove(mv.to_string()));
    }

    let maximizing = pos.side_to_move().is_maximizing();
    let mut stats = SearchStats::default();
    pos.apply(mv);
    let score = minimax(
        &mut pos,
        depth - 1,
        SCORE_NEG_INF,
        SCORE_INF,
        !maximizing,
        evaluator,
        &mut stats,
    );
    Ok((score, stats))
}

fn worker_pool(workers: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("root-search-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!("cannot build root search pool, using the global one: {err}");
            None
        }
    }
}

/// Parallel counterpart of [`find_best_move`](super::search::find_best_move).
///
/// Same move and score semantics, including the random choice among tied
/// moves, for a position without prior history. Workers rebuild the root
/// from [`SearchPosition::serialize`], which for [`GameBoard`] is a FEN and
/// drops the positions played before the root. Repetition penalties and
/// threefold-repetition draws that depend on that history are therefore only
/// seen by the sequential search. Pruning and node counts are the sums over
/// all workers.
///
/// [`GameBoard`]: crate::board::GameBoard
pub fn find_best_move_parallel<P, E>(pos: &P, depth: u8, evaluator: &E) -> SearchResult<P::Move>
where
    P: SearchPosition,
    E: Evaluator<P> + ?Sized,
{
    find_best_move_parallel_with_rng(pos, depth, evaluator, &mut rand::thread_rng())
}

pub fn find_best_move_parallel_with_rng<P, E, R>(
    pos: &P,
    depth: u8,
    evaluator: &E,
    rng: &mut R,
) -> SearchResult<P::Move>
where
    P: SearchPosition,
    E: Evaluator<P> + ?Sized,
    R: Rng + ?Sized,
{
    if pos.is_game_over() {
        return SearchResult::empty();
    }

    let moves = ordered_legal_moves(pos);
    if moves.is_empty() {
        return SearchResult::empty();
    }

    let depth = depth.max(1);
    let side = pos.side_to_move();
    let snapshot = pos.serialize();
    let workers = moves.len().min(num_cpus::get()).max(1);
    let start = Instant::now();

    let run = || -> Vec<(P::Move, WorkerOutcome)> {
        moves[..]
            .par_iter()
            .map(|&mv| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    search_root_move::<P, E>(&snapshot, mv, depth, evaluator)
                }))
                .unwrap_or(Err(WorkerError::Panicked));
                (mv, outcome)
            })
            .collect()
    };

    let results = match worker_pool(workers) {
        Some(pool) => pool.install(run),
        None => run(),
    };

    let mut stats = SearchStats::default();
    let mut best = RootBest::new(side);
    let mut failed = 0usize;
    for (mv, outcome) in results {
        match outcome {
            Ok((score, worker_stats)) => {
                debug!("root move {mv}: score {score}");
                stats.merge(worker_stats);
                best.offer(mv, score);
            }
            Err(err) => {
                warn!("root worker for {mv} failed: {err}");
                failed += 1;
            }
        }
    }

    let result = best.into_result(rng, stats);
    if result.is_empty() {
        warn!("all {failed} root workers failed, no move found");
        return result;
    }

    info!(
        "{side} depth {depth} ({workers} workers): best {:?} score {} pruned {} nodes {} in {}ms",
        result.best_move.map(|mv| mv.to_string()),
        result.score,
        result.pruned,
        result.nodes,
        start.elapsed().as_millis()
    );
    result
}
