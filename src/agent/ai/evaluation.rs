// Position evaluation function
// Returns score in centipawns from White's point of view (positive = good for White)

use super::piece_square_tables::pst_bonus;
use crate::board::{GameBoard, Outcome, SearchPosition, Side};
use chess::{Board, MoveGen, Piece};

/// Search and evaluation score, centipawns, White-positive
pub type Score = i32;

/// Score of a checkmate; dominates any material sum
pub const MATE_SCORE: Score = 100_000;

/// Score of every drawn terminal position
pub const DRAW_SCORE: Score = 0;

// Material values in centipawns
const PAWN_VALUE: Score = 100;
const KNIGHT_VALUE: Score = 320;
const BISHOP_VALUE: Score = 330;
const ROOK_VALUE: Score = 500;
const QUEEN_VALUE: Score = 900;
const KING_VALUE: Score = 20000;

// Phase values for game phase calculation (opening=256, endgame=0)
const KNIGHT_PHASE: i32 = 1;
const BISHOP_PHASE: i32 = 1;
const ROOK_PHASE: i32 = 2;
const QUEEN_PHASE: i32 = 4;
const TOTAL_PHASE: i32 = KNIGHT_PHASE * 4 + BISHOP_PHASE * 4 + ROOK_PHASE * 4 + QUEEN_PHASE * 2;

/// Static evaluation of a position.
///
/// Implementations must be deterministic and must not mutate the position;
/// the parallel root search shares one evaluator across worker threads.
pub trait Evaluator<P>: Send + Sync {
    fn evaluate(&self, pos: &P) -> Score;
}

/// Tunable terms of [`PositionalEvaluator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalWeights {
    /// Add piece-square bonuses on top of raw material
    pub positional: bool,
    /// Centipawns per legal move of the side to move
    pub mobility_weight: Score,
    /// Charged to the side that moved into an already seen position
    pub repetition_penalty: Score,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            positional: true,
            mobility_weight: 2,
            repetition_penalty: 50,
        }
    }
}

/// Production evaluator: material, piece-square tables, mobility and
/// repetition discouragement
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalEvaluator {
    weights: EvalWeights,
}

impl PositionalEvaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> EvalWeights {
        self.weights
    }
}

impl Evaluator<GameBoard> for PositionalEvaluator {
    fn evaluate(&self, pos: &GameBoard) -> Score {
        if let Some(score) = terminal_score(pos) {
            return score;
        }

        let board = pos.board();
        let mut score = if self.weights.positional {
            evaluate_material_and_position(board, is_endgame(board))
        } else {
            material_balance(board)
        };

        score += evaluate_mobility(pos, self.weights.mobility_weight);
        score += evaluate_repetition(pos, self.weights.repetition_penalty);
        score
    }
}

/// Pure material balance. Deterministic baseline used where every quiet move
/// should score the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialEvaluator;

impl Evaluator<GameBoard> for MaterialEvaluator {
    fn evaluate(&self, pos: &GameBoard) -> Score {
        terminal_score(pos).unwrap_or_else(|| material_balance(pos.board()))
    }
}

/// Mate and draw scores for finished games, `None` while the game goes on
fn terminal_score(pos: &GameBoard) -> Option<Score> {
    pos.outcome().map(|outcome| match outcome {
        Outcome::Checkmate { winner: Side::White } => MATE_SCORE,
        Outcome::Checkmate { winner: Side::Black } => -MATE_SCORE,
        Outcome::Stalemate | Outcome::InsufficientMaterial | Outcome::Repetition => DRAW_SCORE,
    })
}

/// Get material value for a piece type
pub fn piece_value(piece: Piece) -> Score {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => KING_VALUE,
    }
}

/// Calculate game phase based on remaining pieces
/// Returns value from 0 (endgame) to 256 (opening)
fn calculate_game_phase(board: &Board) -> i32 {
    let count = |piece| board.pieces(piece).popcnt() as i32;
    let phase = count(Piece::Knight) * KNIGHT_PHASE
        + count(Piece::Bishop) * BISHOP_PHASE
        + count(Piece::Rook) * ROOK_PHASE
        + count(Piece::Queen) * QUEEN_PHASE;

    ((phase * 256 + TOTAL_PHASE / 2) / TOTAL_PHASE).clamp(0, 256)
}

fn is_endgame(board: &Board) -> bool {
    calculate_game_phase(board) < 128
}

fn signed(side: Side, value: Score) -> Score {
    match side {
        Side::White => value,
        Side::Black => -value,
    }
}

fn material_balance(board: &Board) -> Score {
    let mut score = 0;
    for square in *board.combined() {
        if let (Some(piece), Some(color)) = (board.piece_on(square), board.color_on(square)) {
            score += signed(color.into(), piece_value(piece));
        }
    }
    score
}

/// Material plus piece-square bonuses
fn evaluate_material_and_position(board: &Board, endgame: bool) -> Score {
    let mut score = 0;
    for square in *board.combined() {
        if let (Some(piece), Some(color)) = (board.piece_on(square), board.color_on(square)) {
            let side = Side::from(color);
            score += signed(side, piece_value(piece) + pst_bonus(piece, square, side, endgame));
        }
    }
    score
}

/// Legal-move count of the side to move, credited to that side
fn evaluate_mobility(pos: &GameBoard, weight: Score) -> Score {
    if weight == 0 {
        return 0;
    }
    let moves = MoveGen::new_legal(pos.board()).len() as Score;
    signed(pos.side_to_move(), weight * moves)
}

/// Penalty for the side that just moved back into a position seen before
fn evaluate_repetition(pos: &GameBoard, penalty: Score) -> Score {
    if penalty == 0 || !pos.is_repetition(2) {
        return 0;
    }
    let mover = pos.side_to_move().opposite();
    signed(mover, -penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> GameBoard {
        GameBoard::from_fen(fen).unwrap()
    }

    #[test]
    fn test_starting_position_is_equal() {
        let pos = GameBoard::default();
        assert_eq!(MaterialEvaluator.evaluate(&pos), 0);
        // Only the mobility of the side to move separates the two sides
        let score = PositionalEvaluator::default().evaluate(&pos);
        assert_eq!(score, 20 * EvalWeights::default().mobility_weight);
    }

    #[test]
    fn test_game_phase() {
        assert_eq!(calculate_game_phase(GameBoard::default().board()), 256);
        let kings_and_pawns = board("4k3/pppp4/8/8/8/8/PPPP4/4K3 w - - 0 1");
        assert_eq!(calculate_game_phase(kings_and_pawns.board()), 0);
        assert!(is_endgame(kings_and_pawns.board()));
        assert!(!is_endgame(GameBoard::default().board()));
    }

    #[test]
    fn test_checkmate_scores() {
        let white_mated = board("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(MaterialEvaluator.evaluate(&white_mated), -MATE_SCORE);
        assert_eq!(PositionalEvaluator::default().evaluate(&white_mated), -MATE_SCORE);

        let black_mated = board("R6k/8/7K/8/8/8/8/8 b - - 0 1");
        assert_eq!(MaterialEvaluator.evaluate(&black_mated), MATE_SCORE);
    }

    #[test]
    fn test_draws_score_zero() {
        let stalemate = board("7k/8/5KQ1/8/8/8/8/8 b - - 0 1");
        assert_eq!(PositionalEvaluator::default().evaluate(&stalemate), DRAW_SCORE);

        let bare_kings = board("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(PositionalEvaluator::default().evaluate(&bare_kings), DRAW_SCORE);
    }

    #[test]
    fn test_repetition_penalty_hits_the_mover() {
        let evaluator = PositionalEvaluator::new(EvalWeights {
            positional: false,
            mobility_weight: 0,
            repetition_penalty: 50,
        });
        let mut pos = GameBoard::default();
        for uci in ["g1f3", "g8f6", "f3g1"] {
            let mv = pos.parse_uci(uci).unwrap();
            pos.apply(mv);
        }
        assert_eq!(evaluator.evaluate(&pos), 0);

        // Black returns to the starting position: Black is charged
        let mv = pos.parse_uci("f6g8").unwrap();
        pos.apply(mv);
        assert_eq!(evaluator.evaluate(&pos), 50);
    }

    #[test]
    fn test_positional_flag_switches_tables_off() {
        // Pawns and kings mirror each other, a lone knight would be a dead draw
        let pos = board("4k3/p7/8/3N4/8/8/P7/4K3 w - - 0 1");
        let material_only = PositionalEvaluator::new(EvalWeights {
            positional: false,
            mobility_weight: 0,
            repetition_penalty: 0,
        });
        assert_eq!(material_only.evaluate(&pos), KNIGHT_VALUE);

        let with_tables = PositionalEvaluator::new(EvalWeights {
            positional: true,
            mobility_weight: 0,
            repetition_penalty: 0,
        });
        // Centralized knight earns its table bonus
        assert!(with_tables.evaluate(&pos) > KNIGHT_VALUE);
    }
}
