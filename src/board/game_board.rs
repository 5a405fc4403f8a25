// Chess position backed by the `chess` crate
//
// `chess::Board` is an immutable copy-make board. GameBoard layers a history
// stack on top of it so the search can apply/undo in place, and keeps the hash
// of every position reached so far for repetition detection.

use super::{BoardError, MoveList, Outcome, SearchPosition, Side};
use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece};
use std::fmt;
use std::str::FromStr;

/// Standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Material value for MVV-LVA (Most Valuable Victim - Least Valuable Attacker)
fn piece_value_for_mvv_lva(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 10000,
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

/// A game in progress: current board plus everything needed to take moves back
#[derive(Clone, Debug)]
pub struct GameBoard {
    board: Board,
    /// Boards preceding each applied move (top = position before the last move)
    undo_stack: Vec<Board>,
    /// Hash of every position reached, current position last
    hashes: Vec<u64>,
}

impl Default for GameBoard {
    fn default() -> Self {
        Self::from_board(Board::default())
    }
}

impl GameBoard {
    /// Start a game history from an arbitrary board
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            undo_stack: Vec::new(),
            hashes: vec![board.get_hash()],
        }
    }

    /// Parse a FEN string
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let board = Board::from_str(fen.trim()).map_err(|_| BoardError::InvalidFen {
            fen: fen.to_string(),
        })?;
        Ok(Self::from_board(board))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    /// Number of moves applied since this history started
    pub fn plies_played(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_legal(&self, mv: ChessMove) -> bool {
        self.board.legal(mv)
    }

    /// Validate and play a move coming from outside the search (players, oracle)
    pub fn try_apply(&mut self, mv: ChessMove) -> Result<(), BoardError> {
        if !self.is_legal(mv) {
            return Err(BoardError::IllegalMove {
                mv: mv.to_string(),
                fen: self.fen(),
            });
        }
        self.apply(mv);
        Ok(())
    }

    /// Resolve a UCI move string (`e2e4`, `e7e8q`) against the legal moves
    pub fn parse_uci(&self, text: &str) -> Result<ChessMove, BoardError> {
        let text = text.trim().to_ascii_lowercase();
        if !(4..=5).contains(&text.len()) || !text.is_ascii() {
            return Err(BoardError::UnparsableMove(text));
        }

        MoveGen::new_legal(&self.board)
            .find(|mv| mv.to_string() == text)
            .ok_or_else(|| BoardError::IllegalMove {
                mv: text,
                fen: self.fen(),
            })
    }

    /// How many times the current position has occurred, current one included
    pub fn repetition_count(&self) -> usize {
        let current = self.board.get_hash();
        self.hashes.iter().filter(|&&h| h == current).count()
    }

    /// Neither side can possibly deliver mate: bare kings, or a single minor piece
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = *self.board.pieces(Piece::Pawn)
            | *self.board.pieces(Piece::Rook)
            | *self.board.pieces(Piece::Queen);
        if heavy.popcnt() > 0 {
            return false;
        }
        let minors = *self.board.pieces(Piece::Knight) | *self.board.pieces(Piece::Bishop);
        minors.popcnt() <= 1
    }

    /// Why the game is over, if it is
    pub fn outcome(&self) -> Option<Outcome> {
        match self.board.status() {
            BoardStatus::Checkmate => Some(Outcome::Checkmate {
                winner: Side::from(self.board.side_to_move()).opposite(),
            }),
            BoardStatus::Stalemate => Some(Outcome::Stalemate),
            BoardStatus::Ongoing if self.is_insufficient_material() => {
                Some(Outcome::InsufficientMaterial)
            }
            BoardStatus::Ongoing if self.repetition_count() >= 3 => Some(Outcome::Repetition),
            BoardStatus::Ongoing => None,
        }
    }

    pub fn is_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }

    /// Captured piece for `mv`, en passant included
    fn captured_piece(&self, mv: ChessMove) -> Option<Piece> {
        if let Some(victim) = self.board.piece_on(mv.get_dest()) {
            return Some(victim);
        }
        let is_pawn = self.board.piece_on(mv.get_source()) == Some(Piece::Pawn);
        let changes_file = mv.get_source().get_file() != mv.get_dest().get_file();
        if is_pawn && changes_file {
            Some(Piece::Pawn)
        } else {
            None
        }
    }
}

impl SearchPosition for GameBoard {
    type Move = ChessMove;

    fn side_to_move(&self) -> Side {
        self.board.side_to_move().into()
    }

    fn legal_moves(&self) -> MoveList<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    fn apply(&mut self, mv: ChessMove) {
        debug_assert!(self.board.legal(mv), "search applied unvalidated move {mv}");
        let next = self.board.make_move_new(mv);
        self.undo_stack.push(self.board);
        self.hashes.push(next.get_hash());
        self.board = next;
    }

    fn undo(&mut self) {
        if let Some(previous) = self.undo_stack.pop() {
            self.hashes.pop();
            self.board = previous;
        }
    }

    fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    fn is_repetition(&self, count: usize) -> bool {
        self.repetition_count() >= count
    }

    fn capture_score(&self, mv: ChessMove) -> Option<i32> {
        let victim = self.captured_piece(mv)?;
        let attacker = self
            .board
            .piece_on(mv.get_source())
            .map(piece_value_for_mvv_lva)
            .unwrap_or(0);
        Some(piece_value_for_mvv_lva(victim) - attacker / 10)
    }

    fn serialize(&self) -> String {
        self.fen()
    }

    fn deserialize(text: &str) -> Result<Self, BoardError> {
        Self::from_fen(text)
    }
}

impl fmt::Display for GameBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let square = square_at(rank, file);
                let symbol = match (self.board.piece_on(square), self.board.color_on(square)) {
                    (Some(piece), Some(color)) => piece.to_string(color),
                    _ => ".".to_string(),
                };
                write!(f, "{symbol} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}

fn square_at(rank: usize, file: usize) -> chess::Square {
    chess::Square::make_square(chess::Rank::from_index(rank), chess::File::from_index(file))
}
