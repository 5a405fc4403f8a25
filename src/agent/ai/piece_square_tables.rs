// Piece-square tables (centipawns), indexed [rank][file] from White's side:
// row 0 is rank 1. Black looks squares up mirrored vertically.

use crate::board::Side;
use chess::{Piece, Square};

type Table = [[i32; 8]; 8];

// advance, hold the center, keep the f/g/h shield
const PAWN: Table = [
    [  0,   0,   0,   0,   0,   0,   0,   0],
    [  5,  10,  10, -20, -20,  10,  10,   5],
    [  5,  -5, -10,   0,   0, -10,  -5,   5],
    [  0,   0,   0,  20,  20,   0,   0,   0],
    [  5,   5,  10,  25,  25,  10,   5,   5],
    [ 10,  10,  20,  30,  30,  20,  10,  10],
    [ 50,  50,  50,  50,  50,  50,  50,  50],
    [  0,   0,   0,   0,   0,   0,   0,   0],
];

const KNIGHT: Table = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20,   0,   5,   5,   0, -20, -40],
    [-30,   5,  10,  15,  15,  10,   5, -30],
    [-30,   0,  15,  20,  20,  15,   0, -30],
    [-30,   5,  15,  20,  20,  15,   5, -30],
    [-30,   0,  10,  15,  15,  10,   0, -30],
    [-40, -20,   0,   0,   0,   0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

const BISHOP: Table = [
    [-20, -10, -10, -10, -10, -10, -10, -20],
    [-10,   5,   0,   0,   0,   0,   5, -10],
    [-10,  10,  10,  10,  10,  10,  10, -10],
    [-10,   0,  10,  10,  10,  10,   0, -10],
    [-10,   5,   5,  10,  10,   5,   5, -10],
    [-10,   0,   5,  10,  10,   5,   0, -10],
    [-10,   0,   0,   0,   0,   0,   0, -10],
    [-20, -10, -10, -10, -10, -10, -10, -20],
];

const ROOK: Table = [
    [  0,   0,   0,   5,   5,   0,   0,   0],
    [ -5,   0,   0,   0,   0,   0,   0,  -5],
    [ -5,   0,   0,   0,   0,   0,   0,  -5],
    [ -5,   0,   0,   0,   0,   0,   0,  -5],
    [ -5,   0,   0,   0,   0,   0,   0,  -5],
    [ -5,   0,   0,   0,   0,   0,   0,  -5],
    [  5,  10,  10,  10,  10,  10,  10,   5],
    [  0,   0,   0,   0,   0,   0,   0,   0],
];

const QUEEN: Table = [
    [-20, -10, -10,  -5,  -5, -10, -10, -20],
    [-10,   0,   5,   0,   0,   0,   0, -10],
    [-10,   5,   5,   5,   5,   5,   0, -10],
    [  0,   0,   5,   5,   5,   5,   0,  -5],
    [ -5,   0,   5,   5,   5,   5,   0,  -5],
    [-10,   0,   5,   5,   5,   5,   0, -10],
    [-10,   0,   0,   0,   0,   0,   0, -10],
    [-20, -10, -10,  -5,  -5, -10, -10, -20],
];

// stay castled
const KING_MIDDLEGAME: Table = [
    [ 20,  30,  10,   0,   0,  10,  30,  20],
    [ 20,  20,   0,   0,   0,   0,  20,  20],
    [-10, -20, -20, -20, -20, -20, -20, -10],
    [-20, -30, -30, -40, -40, -30, -30, -20],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
];

// centralize
const KING_ENDGAME: Table = [
    [-50, -30, -30, -30, -30, -30, -30, -50],
    [-30, -30,   0,   0,   0,   0, -30, -30],
    [-30, -10,  20,  30,  30,  20, -10, -30],
    [-30, -10,  30,  40,  40,  30, -10, -30],
    [-30, -10,  30,  40,  40,  30, -10, -30],
    [-30, -10,  20,  30,  30,  20, -10, -30],
    [-30, -20, -10,   0,   0, -10, -20, -30],
    [-50, -40, -30, -20, -20, -30, -40, -50],
];

/// Piece-square bonus for `piece` of `side` standing on `square`.
pub fn pst_bonus(piece: Piece, square: Square, side: Side, endgame: bool) -> i32 {
    let file = square.get_file().to_index();
    let rank = match side {
        Side::White => square.get_rank().to_index(),
        Side::Black => 7 - square.get_rank().to_index(),
    };

    let table = match piece {
        Piece::Pawn => &PAWN,
        Piece::Knight => &KNIGHT,
        Piece::Bishop => &BISHOP,
        Piece::Rook => &ROOK,
        Piece::Queen => &QUEEN,
        Piece::King if endgame => &KING_ENDGAME,
        Piece::King => &KING_MIDDLEGAME,
    };
    table[rank][file]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pawn_prefers_advancement() {
        let rank2 = pst_bonus(Piece::Pawn, Square::D2, Side::White, false);
        let rank7 = pst_bonus(Piece::Pawn, Square::D7, Side::White, false);
        assert!(rank7 > rank2);
    }

    #[test]
    fn test_knight_prefers_center() {
        let center = pst_bonus(Piece::Knight, Square::D4, Side::White, false);
        let corner = pst_bonus(Piece::Knight, Square::A1, Side::White, false);
        assert!(center > corner);
    }

    #[test]
    fn test_king_table_depends_on_phase() {
        // Castled king is safe in the middlegame, a central king wins endgames
        assert!(
            pst_bonus(Piece::King, Square::G1, Side::White, false)
                > pst_bonus(Piece::King, Square::D4, Side::White, false)
        );
        assert!(
            pst_bonus(Piece::King, Square::D4, Side::White, true)
                > pst_bonus(Piece::King, Square::G1, Side::White, true)
        );
    }

    #[test]
    fn test_black_reads_mirrored_table() {
        for (white_sq, black_sq) in [
            (Square::D2, Square::D7),
            (Square::B1, Square::B8),
            (Square::C3, Square::C6),
        ] {
            for piece in [Piece::Pawn, Piece::Knight, Piece::Queen, Piece::Rook] {
                assert_eq!(
                    pst_bonus(piece, white_sq, Side::White, false),
                    pst_bonus(piece, black_sq, Side::Black, false),
                );
            }
        }
    }
}
