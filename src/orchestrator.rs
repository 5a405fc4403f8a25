//! Game loop: two players alternate moves on one shared board.
//!
//! The [`Orchestrator`] owns the board. Each turn it:
//! 1. Stops if the game is over (checkmate, stalemate, insufficient material,
//!    threefold repetition) or the ply limit is reached
//! 2. Asks the player to move for a move
//! 3. Validates the move against the current position and applies it
//! 4. Optionally has a reference engine judge the move for the metrics
//! 5. Tells the other player what was played
//!
//! ```text
//! [Check End] -> [Request Move] -> [Validate + Apply] -> [Judge] -> [Notify] -> ...
//! ```

use crate::agent::player::{Player, PlayerError};
use crate::board::{BoardError, GameBoard, Outcome, SearchPosition, Side, START_FEN};
use crate::metrics::GameMetrics;
use crate::oracle::Oracle;
use log::{debug, info, warn};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid start position: {0}")]
    StartPosition(#[source] BoardError),
    #[error("{player} played an illegal move: {source}")]
    IllegalMove {
        player: String,
        #[source]
        source: BoardError,
    },
    #[error("{player} failed to move: {source}")]
    Player {
        player: String,
        #[source]
        source: PlayerError,
    },
}

/// Settings for one game
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub start_fen: String,
    /// Stop after this many plies even if the game goes on
    pub max_plies: usize,
    /// Wall-clock limit for each engine move
    pub move_timeout: Option<Duration>,
    /// Side whose moves the reference engine judges
    pub judged_side: Side,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_fen: START_FEN.to_string(),
            max_plies: 200,
            move_timeout: None,
            judged_side: Side::White,
        }
    }
}

/// Why a game stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEnd {
    Finished(Outcome),
    /// The side to move had nothing to play
    NoMove { side: Side },
    MaxPlies,
}

impl GameEnd {
    /// PGN-style result, `*` when the game did not reach a result
    pub fn result(&self) -> &'static str {
        match self {
            GameEnd::Finished(outcome) => outcome.result(),
            GameEnd::NoMove { side: Side::White } => "0-1",
            GameEnd::NoMove { side: Side::Black } => "1-0",
            GameEnd::MaxPlies => "*",
        }
    }
}

impl fmt::Display for GameEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEnd::Finished(Outcome::Checkmate { winner }) => write!(f, "{winner} mates"),
            GameEnd::Finished(Outcome::Stalemate) => write!(f, "stalemate"),
            GameEnd::Finished(Outcome::InsufficientMaterial) => write!(f, "insufficient material"),
            GameEnd::Finished(Outcome::Repetition) => write!(f, "threefold repetition"),
            GameEnd::NoMove { side } => write!(f, "{side} has no move"),
            GameEnd::MaxPlies => write!(f, "ply limit reached"),
        }
    }
}

/// A finished game
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub end: GameEnd,
    /// Moves in UCI notation
    pub moves: Vec<String>,
    pub final_fen: String,
    pub metrics: GameMetrics,
}

impl GameRecord {
    pub fn result(&self) -> &'static str {
        self.end.result()
    }
}

/// Runs a game between two players
pub struct Orchestrator {
    board: GameBoard,
    white: Box<dyn Player>,
    black: Box<dyn Player>,
    judge: Option<Box<dyn Oracle>>,
    config: GameConfig,
    metrics: GameMetrics,
    moves: Vec<String>,
}

impl Orchestrator {
    /// Set up a game. A `move_timeout` in `config` is handed to both players,
    /// replacing whatever limit they were built with.
    pub fn new(
        mut white: Box<dyn Player>,
        mut black: Box<dyn Player>,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        let board = GameBoard::from_fen(&config.start_fen).map_err(GameError::StartPosition)?;
        if config.move_timeout.is_some() {
            white.set_move_timeout(config.move_timeout);
            black.set_move_timeout(config.move_timeout);
        }
        Ok(Self {
            board,
            white,
            black,
            judge: None,
            config,
            metrics: GameMetrics::new(),
            moves: Vec::new(),
        })
    }

    /// Have `judge` score every move of the judged side
    pub fn with_judge(mut self, judge: Box<dyn Oracle>) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn board(&self) -> &GameBoard {
        &self.board
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    /// Why the game cannot continue, if it cannot
    fn check_game_end(&self) -> Option<GameEnd> {
        if let Some(outcome) = self.board.outcome() {
            return Some(GameEnd::Finished(outcome));
        }
        if self.board.plies_played() >= self.config.max_plies {
            return Some(GameEnd::MaxPlies);
        }
        None
    }

    /// Play a single ply. Returns the end of the game once it is reached.
    pub fn play_ply(&mut self) -> Result<Option<GameEnd>, GameError> {
        if let Some(end) = self.check_game_end() {
            return Ok(Some(end));
        }

        let side = self.board.side_to_move();
        let (player, opponent) = match side {
            Side::White => (&mut self.white, &mut self.black),
            Side::Black => (&mut self.black, &mut self.white),
        };
        let name = player.name().to_string();

        let start = Instant::now();
        let mv = match player.get_move(&self.board) {
            Ok(Some(mv)) => mv,
            Ok(None) => return Ok(Some(GameEnd::NoMove { side })),
            Err(source) => return Err(GameError::Player { player: name, source }),
        };
        let elapsed = start.elapsed();

        let before = self.board.clone();
        self.board.try_apply(mv).map_err(|source| GameError::IllegalMove {
            player: name.clone(),
            source,
        })?;
        opponent.opponent_moved(mv);
        self.moves.push(mv.to_string());
        info!(
            "ply {}: {side} ({name}) plays {mv} in {}ms",
            before.plies_played() + 1,
            elapsed.as_millis()
        );

        if side == self.config.judged_side {
            if let Some(judge) = self.judge.as_mut() {
                match self.metrics.record_ply(judge.as_mut(), &before, mv) {
                    Ok(ply) => debug!(
                        "judged {}: reference {} loss {}cp",
                        ply.our_move, ply.oracle_move, ply.centipawn_loss
                    ),
                    Err(err) => warn!("could not judge {mv}: {err}"),
                }
            }
        }

        Ok(None)
    }

    /// Play until the game ends
    pub fn play(mut self) -> Result<GameRecord, GameError> {
        info!(
            "{} (White) vs {} (Black) from {}",
            self.white.name(),
            self.black.name(),
            self.board.fen()
        );

        let end = loop {
            if let Some(end) = self.play_ply()? {
                break end;
            }
        };

        let outcome = match end {
            GameEnd::Finished(outcome) => Some(outcome),
            _ => None,
        };
        self.white.game_ended(outcome);
        self.black.game_ended(outcome);
        info!("game over after {} plies: {} ({end})", self.moves.len(), end.result());

        Ok(GameRecord {
            end,
            moves: self.moves,
            final_fen: self.board.fen(),
            metrics: self.metrics,
        })
    }
}
