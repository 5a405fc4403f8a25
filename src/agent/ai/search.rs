// Root Search
//
// Searches every root move one ply down with a fresh (-inf, +inf) window; no
// pruning across root siblings, only inside each branch. All moves tied at the
// best value are collected and one is picked uniformly at random, so equal
// positions do not always produce the same game.

use super::evaluation::{Evaluator, Score};
use super::minimax::{minimax, SearchStats, SCORE_INF, SCORE_NEG_INF};
use super::move_ordering::ordered_legal_moves;
use crate::board::{ScopedMove, SearchPosition, Side};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Instant;

/// Result of a search operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<M> {
    /// Chosen root move, `None` when the position has no legal move
    pub best_move: Option<M>,
    /// Value of `best_move`, White-positive
    pub score: Score,
    /// Alpha-beta cutoffs during the whole search
    pub pruned: u64,
    pub nodes: u64,
}

impl<M> SearchResult<M> {
    /// Result for a position with nothing to search
    pub fn empty() -> Self {
        Self {
            best_move: None,
            score: 0,
            pruned: 0,
            nodes: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.best_move.is_none()
    }
}

/// Best value seen at the root and every move that reached it
pub(super) struct RootBest<M> {
    side: Side,
    score: Score,
    ties: Vec<M>,
}

impl<M: Copy> RootBest<M> {
    pub(super) fn new(side: Side) -> Self {
        Self {
            side,
            score: 0,
            ties: Vec::new(),
        }
    }

    fn improves(&self, score: Score) -> bool {
        if self.side.is_maximizing() {
            score > self.score
        } else {
            score < self.score
        }
    }

    pub(super) fn offer(&mut self, mv: M, score: Score) {
        if self.ties.is_empty() || self.improves(score) {
            self.score = score;
            self.ties.clear();
            self.ties.push(mv);
        } else if score == self.score {
            self.ties.push(mv);
        }
    }

    /// Uniform pick among the tied moves
    pub(super) fn into_result<R: Rng + ?Sized>(self, rng: &mut R, stats: SearchStats) -> SearchResult<M> {
        match self.ties.choose(rng) {
            Some(&mv) => SearchResult {
                best_move: Some(mv),
                score: self.score,
                pruned: stats.pruned,
                nodes: stats.nodes,
            },
            None => SearchResult::empty(),
        }
    }
}

/// Find the best move for the side to move in `pos`, searching `depth` plies.
///
/// White maximizes, Black minimizes. Returns an empty result when the game is
/// already over. Depth 0 is searched as depth 1.
pub fn find_best_move<P, E>(pos: &P, depth: u8, evaluator: &E) -> SearchResult<P::Move>
where
    P: SearchPosition,
    E: Evaluator<P> + ?Sized,
{
    find_best_move_with_rng(pos, depth, evaluator, &mut rand::thread_rng())
}

/// [`find_best_move`] with an explicit source for the tie-break
pub fn find_best_move_with_rng<P, E, R>(
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

    let mut search_pos = pos.clone();
    let moves = ordered_legal_moves(&search_pos);
    if moves.is_empty() {
        return SearchResult::empty();
    }

    let depth = depth.max(1);
    let side = search_pos.side_to_move();
    let start = Instant::now();
    let mut stats = SearchStats::default();
    let mut best = RootBest::new(side);

    for mv in moves {
        let score = {
            let mut child = ScopedMove::new(&mut search_pos, mv);
            minimax(
                &mut *child,
                depth - 1,
                SCORE_NEG_INF,
                SCORE_INF,
                !side.is_maximizing(),
                evaluator,
                &mut stats,
            )
        };
        debug!("root move {mv}: score {score}");
        best.offer(mv, score);
    }

    let result = best.into_result(rng, stats);
    info!(
        "{side} depth {depth}: best {:?} score {} pruned {} nodes {} in {}ms",
        result.best_move.map(|mv| mv.to_string()),
        result.score,
        result.pruned,
        result.nodes,
        start.elapsed().as_millis()
    );
    result
}
