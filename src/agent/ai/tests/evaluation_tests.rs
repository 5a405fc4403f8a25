// Tests for the evaluation functions

use crate::agent::ai::{EvalWeights, Evaluator, MaterialEvaluator, PositionalEvaluator};
use crate::board::{GameBoard, SearchPosition};

fn board(fen: &str) -> GameBoard {
    GameBoard::from_fen(fen).unwrap()
}

#[test]
fn test_material_queen_advantage() {
    // Black queen removed
    let pos = board("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    assert_eq!(MaterialEvaluator.evaluate(&pos), 900);

    let score = PositionalEvaluator::default().evaluate(&pos);
    assert!(score > 850, "Extra queen should give large advantage: {}", score);
}

#[test]
fn test_material_black_ahead_is_negative() {
    // White rook on a1 removed
    let pos = board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/1NBQKBNR b Kkq - 0 1");
    assert_eq!(MaterialEvaluator.evaluate(&pos), -500);
    assert!(PositionalEvaluator::default().evaluate(&pos) < -400);
}

#[test]
fn test_mirrored_positions_negate() {
    // Same position with colors swapped and the board flipped
    let pairs = [
        (
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "rnbqkb1r/pppp1ppp/5n2/4p3/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 2 3",
        ),
        (
            "4k3/8/8/3N4/8/8/5PP1/6K1 w - - 0 1",
            "6k1/5pp1/8/8/3n4/8/8/4K3 b - - 0 1",
        ),
    ];
    let evaluator = PositionalEvaluator::default();
    for (white, black) in pairs {
        assert_eq!(
            evaluator.evaluate(&board(white)),
            -evaluator.evaluate(&board(black)),
            "{white} vs {black}"
        );
    }
}

#[test]
fn test_evaluation_is_deterministic() {
    let pos = board("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let evaluator = PositionalEvaluator::default();
    let first = evaluator.evaluate(&pos);
    for _ in 0..10 {
        assert_eq!(evaluator.evaluate(&pos), first);
    }
}

#[test]
fn test_evaluation_does_not_mutate() {
    let mut pos = GameBoard::default();
    let mv = pos.parse_uci("e2e4").unwrap();
    pos.apply(mv);
    let before = pos.serialize();
    PositionalEvaluator::default().evaluate(&pos);
    MaterialEvaluator.evaluate(&pos);
    assert_eq!(pos.serialize(), before);
    assert_eq!(pos.plies_played(), 1);
}

#[test]
fn test_mobility_credited_to_side_to_move() {
    let weights = EvalWeights {
        positional: false,
        mobility_weight: 1,
        repetition_penalty: 0,
    };
    let evaluator = PositionalEvaluator::new(weights);
    let white = board("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
    let black = board("4k3/8/8/8/8/8/8/R3K3 b - - 0 1");
    let white_moves = white.legal_moves().len() as i32;
    let black_moves = black.legal_moves().len() as i32;
    assert_eq!(evaluator.evaluate(&white), 500 + white_moves);
    assert_eq!(evaluator.evaluate(&black), 500 - black_moves);
}

#[test]
fn test_mate_outweighs_material() {
    // Smothered mate: Black is far ahead on material but mated
    let pos = board("6rk/5Npp/8/8/7q/8/PPP5/K7 b - - 0 1");
    assert!(MaterialEvaluator.evaluate(&pos) > 0);
    let score = PositionalEvaluator::default().evaluate(&pos);
    assert!(score > 50_000, "mate should dominate material: {score}");
}
