//! Engine - fixed-depth alpha-beta search behind a single handle
//!
//! The engine bundles an evaluator with a search depth and picks between the
//! sequential and the parallel root search. It holds no state between calls:
//! two searches of the same position are independent.
//!
//! # Difficulty Levels
//!
//! - **Easy**: Depth 2
//! - **Medium**: Depth 3
//! - **Hard**: Depth 4
//! - **Expert**: Depth 5
//!
//! # Examples
//!
//! ```rust,no_run
//! use minimax_chess::agent::ai::{Difficulty, Engine};
//! use minimax_chess::board::GameBoard;
//!
//! let engine = Engine::with_difficulty(Difficulty::Medium);
//! let result = engine.find_best_move(&GameBoard::default());
//! println!("{:?} ({} cp)", result.best_move, result.score);
//! ```

use super::evaluation::{EvalWeights, Evaluator, PositionalEvaluator};
use super::parallel::find_best_move_parallel;
use super::search::{find_best_move, SearchResult};
use crate::board::SearchPosition;
use std::fmt;

/// Search strength presets that map to a fixed search depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Search depth in plies
    pub fn depth(&self) -> u8 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
            Difficulty::Expert => 5,
        }
    }

    /// Get a display name for this difficulty level
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-depth search engine
#[derive(Debug, Clone)]
pub struct Engine<E = PositionalEvaluator> {
    evaluator: E,
    depth: u8,
    parallel: bool,
}

impl Engine<PositionalEvaluator> {
    /// Production evaluator at the depth of `difficulty`
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self::new(PositionalEvaluator::default(), difficulty.depth())
    }

    pub fn with_weights(weights: EvalWeights, depth: u8) -> Self {
        Self::new(PositionalEvaluator::new(weights), depth)
    }
}

impl Default for Engine<PositionalEvaluator> {
    fn default() -> Self {
        Self::with_difficulty(Difficulty::default())
    }
}

impl<E> Engine<E> {
    pub fn new(evaluator: E, depth: u8) -> Self {
        Self {
            evaluator,
            depth: depth.max(1),
            parallel: false,
        }
    }

    /// Use the parallel root search for [`Engine::search`]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn find_best_move<P>(&self, pos: &P) -> SearchResult<P::Move>
    where
        P: SearchPosition,
        E: Evaluator<P>,
    {
        find_best_move(pos, self.depth, &self.evaluator)
    }

    pub fn find_best_move_parallel<P>(&self, pos: &P) -> SearchResult<P::Move>
    where
        P: SearchPosition,
        E: Evaluator<P>,
    {
        find_best_move_parallel(pos, self.depth, &self.evaluator)
    }

    /// Sequential or parallel search, whichever the engine is configured for
    pub fn search<P>(&self, pos: &P) -> SearchResult<P::Move>
    where
        P: SearchPosition,
        E: Evaluator<P>,
    {
        if self.parallel {
            self.find_best_move_parallel(pos)
        } else {
            self.find_best_move(pos)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ai::evaluation::MaterialEvaluator;
    use crate::board::GameBoard;

    #[test]
    fn test_difficulty_depths_increase() {
        let depths: Vec<u8> = [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Expert,
        ]
        .iter()
        .map(Difficulty::depth)
        .collect();
        assert!(depths.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Engine::default().depth(), Difficulty::Medium.depth());
    }

    #[test]
    fn test_zero_depth_clamped() {
        assert_eq!(Engine::new(MaterialEvaluator, 0).depth(), 1);
    }

    #[test]
    fn test_engine_takes_hanging_queen() {
        let pos = GameBoard::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        for engine in [
            Engine::new(MaterialEvaluator, 2),
            Engine::new(MaterialEvaluator, 2).parallel(true),
        ] {
            let result = engine.search(&pos);
            assert_eq!(result.best_move.map(|mv| mv.to_string()), Some("d1d5".to_string()));
            assert_eq!(result.score, 500);
        }
    }
}
