//! Player trait and the two kinds of player a game is played between.
//!
//! A player is anything that can be asked for a move in a position: the
//! search engine ([`EnginePlayer`]) or the external reference engine
//! ([`OraclePlayer`]). The game loop owns the board and validates every move a
//! player returns before applying it, so players never mutate the game.
//!
//! # Synchronous Design
//!
//! `get_move()` blocks until the player has decided. An engine move can be
//! bounded with a wall-clock timeout; a late answer counts as no answer.

use crate::agent::ai::{Engine, Evaluator, PositionalEvaluator, SearchResult};
use crate::board::{GameBoard, Outcome};
use crate::oracle::{Oracle, OracleError};
use chess::ChessMove;
use log::warn;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("reference engine failed: {0}")]
    Oracle(#[from] OracleError),
    #[error("no move within {0:?}")]
    Timeout(Duration),
    #[error("search thread died")]
    SearchAborted,
}

/// Trait for entities that can provide chess moves.
pub trait Player {
    /// Request the next move for the side to move in `board`.
    ///
    /// `Ok(None)` means the player has nothing to play (no legal move, or it
    /// gives up). The returned move is validated by the caller.
    fn get_move(&mut self, board: &GameBoard) -> Result<Option<ChessMove>, PlayerError>;

    /// Bound the time this player may spend on a move. Players that cannot
    /// be bounded ignore it.
    fn set_move_timeout(&mut self, _timeout: Option<Duration>) {}

    /// Notify this player that the opponent made a move.
    fn opponent_moved(&mut self, _mv: ChessMove) {}

    /// Notify this player that the game has ended.
    fn game_ended(&mut self, _outcome: Option<Outcome>) {}

    /// Get the display name of this player.
    fn name(&self) -> &str {
        "Player"
    }
}

/// The fixed-depth search engine as a player
pub struct EnginePlayer<E = PositionalEvaluator> {
    engine: Arc<Engine<E>>,
    name: String,
    move_timeout: Option<Duration>,
    last_result: Option<SearchResult<ChessMove>>,
}

impl<E> EnginePlayer<E>
where
    E: Evaluator<GameBoard> + 'static,
{
    pub fn new(engine: Engine<E>, name: impl Into<String>) -> Self {
        Self {
            engine: Arc::new(engine),
            name: name.into(),
            move_timeout: None,
            last_result: None,
        }
    }

    /// Give up on a search that takes longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.move_timeout = timeout;
        self
    }

    pub fn engine(&self) -> &Engine<E> {
        &self.engine
    }

    /// Result of the most recent completed search
    pub fn last_result(&self) -> Option<&SearchResult<ChessMove>> {
        self.last_result.as_ref()
    }

    /// Run the search on a helper thread and wait at most `timeout` for it.
    ///
    /// The search cannot be cancelled; a late thread finishes in the
    /// background and its answer is dropped.
    fn search_with_timeout(
        &self,
        board: &GameBoard,
        timeout: Duration,
    ) -> Result<SearchResult<ChessMove>, PlayerError> {
        let (tx, rx) = mpsc::channel();
        let engine = Arc::clone(&self.engine);
        let board = board.clone();
        thread::spawn(move || {
            let _ = tx.send(engine.search(&board));
        });

        rx.recv_timeout(timeout).map_err(|err| match err {
            mpsc::RecvTimeoutError::Timeout => PlayerError::Timeout(timeout),
            mpsc::RecvTimeoutError::Disconnected => PlayerError::SearchAborted,
        })
    }
}

impl<E> Player for EnginePlayer<E>
where
    E: Evaluator<GameBoard> + 'static,
{
    fn get_move(&mut self, board: &GameBoard) -> Result<Option<ChessMove>, PlayerError> {
        let result = match self.move_timeout {
            Some(timeout) => self.search_with_timeout(board, timeout)?,
            None => self.engine.search(board),
        };
        let mv = result.best_move;
        self.last_result = Some(result);
        Ok(mv)
    }

    fn set_move_timeout(&mut self, timeout: Option<Duration>) {
        self.move_timeout = timeout;
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The reference engine as a player
pub struct OraclePlayer<O> {
    oracle: O,
    name: String,
}

impl<O: Oracle> OraclePlayer<O> {
    pub fn new(oracle: O, name: impl Into<String>) -> Self {
        Self {
            oracle,
            name: name.into(),
        }
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn into_inner(self) -> O {
        self.oracle
    }
}

impl<O: Oracle> Player for OraclePlayer<O> {
    fn get_move(&mut self, board: &GameBoard) -> Result<Option<ChessMove>, PlayerError> {
        match self.oracle.best_move(board) {
            Ok(mv) => Ok(Some(mv)),
            Err(OracleError::NoMove) => Ok(None),
            Err(err) => {
                warn!("{} failed to produce a move: {err}", self.name);
                Err(err.into())
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
