// AI Agent - Minimax with Alpha-Beta Pruning
//
// Classical fixed-depth tree search:
// - Minimax with alpha-beta pruning, scores from White's point of view
// - Capture-first (MVV-LVA) move ordering
// - Material + piece-square + mobility evaluation
// - Random choice among equally good root moves
// - Parallel root search, one worker per root move
//
// The search is stateless between calls: no transposition table, no iterative
// deepening, no quiescence.

mod engine;
mod evaluation;
mod minimax;
mod move_ordering;
mod parallel;
mod piece_square_tables;
mod search;

#[cfg(test)]
mod tests;

pub use engine::{Difficulty, Engine};
pub use evaluation::{
    piece_value, EvalWeights, Evaluator, MaterialEvaluator, PositionalEvaluator, Score, DRAW_SCORE,
    MATE_SCORE,
};
pub use minimax::{minimax, prefer_shorter_mate, SearchStats, SCORE_INF, SCORE_NEG_INF};
pub use move_ordering::{order_moves, ordered_legal_moves, CAPTURE_BONUS};
pub use parallel::{find_best_move_parallel, find_best_move_parallel_with_rng};
pub use search::{find_best_move, find_best_move_with_rng, SearchResult};
