//! Board-state provider interface consumed by the search core.
//!
//! The search never looks inside a position. Everything it needs (legal move
//! enumeration, in-place apply/undo, terminal detection, snapshots for the
//! parallel workers) goes through the [`SearchPosition`] trait. The concrete
//! chess implementation is [`GameBoard`], backed by the `chess` crate.
//!
//! # Apply/undo discipline
//!
//! Positions are searched in place. Every `apply` on a recursive path must be
//! matched by an `undo` before control returns to the caller, otherwise sibling
//! branches see a corrupted position. [`ScopedMove`] enforces this: the move is
//! undone when the guard is dropped, which covers early returns, alpha-beta
//! cutoffs and panics alike.
//!
//! ```rust,ignore
//! let mut board = GameBoard::default();
//! for mv in board.legal_moves() {
//!     let child = ScopedMove::new(&mut board, mv);
//!     // search `child` ...
//! } // undone here
//! ```

mod game_board;

pub use game_board::{GameBoard, START_FEN};

use smallvec::SmallVec;
use std::fmt;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

/// Move list used throughout the search (no heap allocation for typical positions)
pub type MoveList<M> = SmallVec<[M; 64]>;

/// Side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// White is the maximizing side, Black the minimizing one
    pub fn is_maximizing(self) -> bool {
        self == Side::White
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Side },
    Stalemate,
    InsufficientMaterial,
    /// Threefold repetition
    Repetition,
}

impl Outcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }

    /// PGN-style result string
    pub fn result(&self) -> &'static str {
        match self.winner() {
            Some(Side::White) => "1-0",
            Some(Side::Black) => "0-1",
            None => "1/2-1/2",
        }
    }
}

/// Errors reported by a board-state provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("invalid FEN `{fen}`")]
    InvalidFen { fen: String },
    #[error("illegal move `{mv}` in position `{fen}`")]
    IllegalMove { mv: String, fen: String },
    #[error("cannot parse move `{0}`")]
    UnparsableMove(String),
}

/// Capability the search core requires from a position.
///
/// Implementors own the chess rules. `apply` is only ever called with a move
/// returned by `legal_moves` on the same position, and every `apply` is paired
/// with exactly one `undo`.
pub trait SearchPosition: Clone + Send + Sized {
    type Move: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync;

    fn side_to_move(&self) -> Side;

    /// All legal moves, unordered, without duplicates. Empty exactly when the
    /// side to move has no legal move.
    fn legal_moves(&self) -> MoveList<Self::Move>;

    /// Plays `mv` in place. `mv` must come from `legal_moves`.
    fn apply(&mut self, mv: Self::Move);

    /// Reverts the most recent `apply`.
    fn undo(&mut self);

    fn is_game_over(&self) -> bool;

    /// True when the current position has occurred at least `count` times in
    /// the game history, the current occurrence included.
    fn is_repetition(&self, count: usize) -> bool;

    /// Ordering hint for captures: `Some(weight)` when `mv` captures, where a
    /// higher weight means a more attractive capture.
    fn capture_score(&self, mv: Self::Move) -> Option<i32>;

    /// Canonical text snapshot, accepted back by `deserialize`.
    fn serialize(&self) -> String;

    fn deserialize(text: &str) -> Result<Self, BoardError>;
}

/// A move applied to a borrowed position, undone on drop.
///
/// Dereferences to the position after the move so it can be handed straight to
/// a recursive search.
pub struct ScopedMove<'a, P: SearchPosition> {
    pos: &'a mut P,
}

impl<'a, P: SearchPosition> ScopedMove<'a, P> {
    pub fn new(pos: &'a mut P, mv: P::Move) -> Self {
        pos.apply(mv);
        Self { pos }
    }
}

impl<P: SearchPosition> Deref for ScopedMove<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.pos
    }
}

impl<P: SearchPosition> DerefMut for ScopedMove<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.pos
    }
}

impl<P: SearchPosition> Drop for ScopedMove<'_, P> {
    fn drop(&mut self) {
        self.pos.undo();
    }
}
