// Move ordering for alpha-beta search
//
// Better moves first means earlier cutoffs. Captures are tried before quiet
// moves, most valuable victim / least valuable attacker first. The sort is
// stable: moves with equal scores keep the order the board generated them in.

use crate::board::{MoveList, SearchPosition};

/// Bonus that lifts every capture above every quiet move
pub const CAPTURE_BONUS: i32 = 10_000;

/// Score a single move for ordering purposes (higher = try earlier)
fn score_move<P: SearchPosition>(pos: &P, mv: P::Move) -> i32 {
    match pos.capture_score(mv) {
        Some(mvv_lva) => CAPTURE_BONUS + mvv_lva,
        None => 0,
    }
}

/// Reorder `moves` so likely-good moves come first.
///
/// Returns the same moves, none added or dropped.
pub fn order_moves<P: SearchPosition>(pos: &P, moves: MoveList<P::Move>) -> MoveList<P::Move> {
    let mut scored: MoveList<(i32, P::Move)> = moves
        .into_iter()
        .map(|mv| (score_move(pos, mv), mv))
        .collect();

    // Descending by score; `sort_by` is stable
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored.into_iter().map(|(_, mv)| mv).collect()
}

/// Legal moves of `pos`, ordered
pub fn ordered_legal_moves<P: SearchPosition>(pos: &P) -> MoveList<P::Move> {
    order_moves(pos, pos.legal_moves())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GameBoard;

    #[test]
    fn test_ordering_keeps_every_move() {
        let pos = GameBoard::default();
        let ordered = ordered_legal_moves(&pos);
        assert_eq!(ordered.len(), 20);
        for mv in pos.legal_moves() {
            assert!(ordered.contains(&mv));
        }
    }

    #[test]
    fn test_quiet_position_keeps_generation_order() {
        let pos = GameBoard::default();
        let generated = pos.legal_moves();
        let ordered = order_moves(&pos, generated.clone());
        assert_eq!(ordered, generated);
    }

    #[test]
    fn test_queen_capture_ordered_first() {
        // Rook and pawn can both take the queen on d5; pawn takes first
        let pos = GameBoard::from_fen("4k3/8/8/3q4/4P3/8/8/3RK3 w - - 0 1").unwrap();
        let ordered = ordered_legal_moves(&pos);
        assert_eq!(ordered[0].to_string(), "e4d5");
        assert_eq!(ordered[1].to_string(), "d1d5");
        assert!(ordered[2..].iter().all(|&mv| pos.capture_score(mv).is_none()));
    }
}
