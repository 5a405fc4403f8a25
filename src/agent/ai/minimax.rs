// Minimax Search with Alpha-Beta Pruning
//
// Scores are always from White's point of view: the maximizing side is White,
// the minimizing side is Black. Roles flip at every ply.
//
// The position is searched in place. Every move goes through a `ScopedMove`
// guard, so it is taken back on every exit path, cutoffs included.
//
// Only the score propagates upward. Picking a move is the root's job.

use super::evaluation::{Evaluator, Score, MATE_SCORE};
use super::move_ordering::ordered_legal_moves;
use crate::board::{ScopedMove, SearchPosition};

/// Upper search bound
pub const SCORE_INF: Score = i32::MAX;

/// Lower search bound (`-SCORE_INF`, so negation never overflows)
pub const SCORE_NEG_INF: Score = -i32::MAX;

/// Counters for one root search invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Alpha-beta cutoffs
    pub pruned: u64,
    /// Nodes visited, leaves included
    pub nodes: u64,
}

impl SearchStats {
    pub fn merge(&mut self, other: SearchStats) {
        self.pruned += other.pruned;
        self.nodes += other.nodes;
    }
}

/// Shift a mate score by the plies left to search when it was found.
///
/// A mate seen with more depth remaining is closer to the root, so it scores
/// further from zero and a mate in one beats a mate in two. Other scores are
/// returned unchanged.
pub fn prefer_shorter_mate(score: Score, depth_left: u8) -> Score {
    if score >= MATE_SCORE {
        score + Score::from(depth_left)
    } else if score <= -MATE_SCORE {
        score - Score::from(depth_left)
    } else {
        score
    }
}

/// Minimax value of `pos` searched `depth` plies deep.
///
/// # Arguments
///
/// * `pos` - Position to search; left exactly as it was on return
/// * `depth` - Remaining plies (0 = evaluate statically)
/// * `alpha` - Score the maximizing side can already guarantee
/// * `beta` - Score the minimizing side can already guarantee
/// * `maximizing` - Whether the side to move at this node maximizes
/// * `evaluator` - Static evaluation used at leaves and terminal positions
/// * `stats` - Cutoff and node counters, shared by the whole root search
pub fn minimax<P, E>(
    pos: &mut P,
    depth: u8,
    mut alpha: Score,
    mut beta: Score,
    maximizing: bool,
    evaluator: &E,
    stats: &mut SearchStats,
) -> Score
where
    P: SearchPosition,
    E: Evaluator<P> + ?Sized,
{
    stats.nodes += 1;

    if depth == 0 || pos.is_game_over() {
        return prefer_shorter_mate(evaluator.evaluate(pos), depth);
    }

    let moves = ordered_legal_moves(pos);
    if moves.is_empty() {
        return prefer_shorter_mate(evaluator.evaluate(pos), depth);
    }

    if maximizing {
        let mut best = SCORE_NEG_INF;
        for mv in moves {
            let value = {
                let mut child = ScopedMove::new(pos, mv);
                minimax(&mut *child, depth - 1, alpha, beta, false, evaluator, stats)
            };
            best = best.max(value);
            alpha = alpha.max(best);
            if beta <= alpha {
                stats.pruned += 1;
                break;
            }
        }
        best
    } else {
        let mut best = SCORE_INF;
        for mv in moves {
            let value = {
                let mut child = ScopedMove::new(pos, mv);
                minimax(&mut *child, depth - 1, alpha, beta, true, evaluator, stats)
            };
            best = best.min(value);
            beta = beta.min(best);
            if beta <= alpha {
                stats.pruned += 1;
                break;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ai::evaluation::{MaterialEvaluator, MATE_SCORE};
    use crate::board::GameBoard;

    #[test]
    fn test_depth_zero_is_static_eval() {
        let mut pos = GameBoard::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let mut stats = SearchStats::default();
        let score = minimax(&mut pos, 0, SCORE_NEG_INF, SCORE_INF, true, &MaterialEvaluator, &mut stats);
        assert_eq!(score, 500 - 900);
        assert_eq!(stats, SearchStats { pruned: 0, nodes: 1 });
    }

    #[test]
    fn test_terminal_position_not_expanded() {
        let mut pos =
            GameBoard::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        let mut stats = SearchStats::default();
        let score = minimax(&mut pos, 4, SCORE_NEG_INF, SCORE_INF, true, &MaterialEvaluator, &mut stats);
        assert_eq!(score, -MATE_SCORE - 4);
        assert_eq!(stats.nodes, 1);
    }

    #[test]
    fn test_finds_mate_in_one() {
        // Ra1-a8 is mate
        let mut pos = GameBoard::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let mut stats = SearchStats::default();
        let score = minimax(&mut pos, 2, SCORE_NEG_INF, SCORE_INF, true, &MaterialEvaluator, &mut stats);
        // Mate found with one ply left
        assert_eq!(score, MATE_SCORE + 1);
    }

    #[test]
    fn test_prefer_shorter_mate() {
        assert_eq!(prefer_shorter_mate(MATE_SCORE, 3), MATE_SCORE + 3);
        assert_eq!(prefer_shorter_mate(-MATE_SCORE, 3), -MATE_SCORE - 3);
        assert_eq!(prefer_shorter_mate(MATE_SCORE, 0), MATE_SCORE);
        assert_eq!(prefer_shorter_mate(1_250, 3), 1_250);
        assert_eq!(prefer_shorter_mate(-40_000, 5), -40_000);
    }

    #[test]
    fn test_mate_in_one_outscores_mate_in_two() {
        // Rb8 mates now; any quiet rook move mates next turn after Kg8
        let mut pos = GameBoard::from_fen("7k/R7/8/8/8/8/8/1R4K1 w - - 0 1").unwrap();
        let now = pos.parse_uci("b1b8").unwrap();
        let later = pos.parse_uci("b1b6").unwrap();

        let mut value_of = |mv| {
            let mut child = ScopedMove::new(&mut pos, mv);
            let mut stats = SearchStats::default();
            minimax(&mut *child, 2, SCORE_NEG_INF, SCORE_INF, false, &MaterialEvaluator, &mut stats)
        };
        let mate_in_one = value_of(now);
        let mate_in_two = value_of(later);
        assert!(mate_in_two >= MATE_SCORE);
        assert!(mate_in_one > mate_in_two);
    }

    #[test]
    fn test_search_leaves_position_untouched() {
        let mut pos =
            GameBoard::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
                .unwrap();
        let before = pos.serialize();
        let mut stats = SearchStats::default();
        minimax(&mut pos, 3, SCORE_NEG_INF, SCORE_INF, true, &MaterialEvaluator, &mut stats);
        assert_eq!(pos.serialize(), before);
        assert_eq!(pos.plies_played(), 0);
        assert!(stats.pruned > 0);
    }

    #[test]
    fn test_stats_merge() {
        let mut total = SearchStats { pruned: 2, nodes: 10 };
        total.merge(SearchStats { pruned: 3, nodes: 5 });
        assert_eq!(total, SearchStats { pruned: 5, nodes: 15 });
    }
}
