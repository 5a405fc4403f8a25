//! Per-ply comparison of the engine against the reference engine.
//!
//! For every engine move the reference engine is asked what it would have
//! played in the same position. Both resulting positions are evaluated by the
//! reference engine; the absolute difference is the centipawn loss of our move.

use crate::board::GameBoard;
use crate::oracle::{Oracle, OracleError};
use chess::ChessMove;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One engine move measured against the reference engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyMetrics {
    /// Half-move number in the game, starting at 1
    pub ply: usize,
    pub our_move: String,
    pub oracle_move: String,
    pub same_move: bool,
    pub centipawn_loss: i32,
}

/// Aggregate over a whole game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSummary {
    pub plies: usize,
    /// Share of moves identical to the reference engine's, 0.0 to 1.0
    pub match_rate: f64,
    pub avg_cpl: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GameMetrics {
    data: Vec<PlyMetrics>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plies(&self) -> &[PlyMetrics] {
        &self.data
    }

    pub fn push(&mut self, ply: PlyMetrics) {
        self.data.push(ply);
    }

    /// Score `our_move`, about to be played in `before`, against the oracle
    pub fn record_ply<O: Oracle + ?Sized>(
        &mut self,
        oracle: &mut O,
        before: &GameBoard,
        our_move: ChessMove,
    ) -> Result<&PlyMetrics, OracleError> {
        let oracle_move = oracle.best_move(before)?;

        let mut after_oracle = before.clone();
        after_oracle.try_apply(oracle_move)?;
        let oracle_eval = oracle.evaluate(&after_oracle)?;

        let mut after_ours = before.clone();
        after_ours.try_apply(our_move)?;
        let our_eval = if our_move == oracle_move {
            oracle_eval
        } else {
            oracle.evaluate(&after_ours)?
        };

        self.data.push(PlyMetrics {
            ply: before.plies_played() + 1,
            our_move: our_move.to_string(),
            oracle_move: oracle_move.to_string(),
            same_move: our_move == oracle_move,
            centipawn_loss: (oracle_eval - our_eval).abs(),
        });
        Ok(&self.data[self.data.len() - 1])
    }

    pub fn summary(&self) -> MetricsSummary {
        let plies = self.data.len();
        if plies == 0 {
            return MetricsSummary {
                plies,
                match_rate: 0.0,
                avg_cpl: 0.0,
            };
        }
        let matches = self.data.iter().filter(|d| d.same_move).count();
        let total_cpl: i64 = self.data.iter().map(|d| d.centipawn_loss as i64).sum();
        MetricsSummary {
            plies,
            match_rate: matches as f64 / plies as f64,
            avg_cpl: total_cpl as f64 / plies as f64,
        }
    }

    /// Header plus one row per ply
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "ply,our_move,oracle_move,same_move,centipawn_loss")?;
        for d in &self.data {
            writeln!(
                out,
                "{},{},{},{},{}",
                d.ply, d.our_move, d.oracle_move, d.same_move, d.centipawn_loss
            )?;
        }
        out.flush()
    }

    /// Write the CSV to `path`, creating parent directories
    pub fn save_csv(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.write_csv(BufWriter::new(File::create(path)?))
    }
}
