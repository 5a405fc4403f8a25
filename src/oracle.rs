//! Reference engine client.
//!
//! Talks UCI to an external engine process (Stockfish or any other UCI
//! engine) over its stdin/stdout. The engine supplies the best moves and
//! evaluations the game metrics are scored against, and plays the opponent in
//! the game loop.
//!
//! The connection is an explicit handle: [`UciEngine::spawn`] starts the
//! process, [`UciEngine::quit`] (or dropping the handle) stops it. The search
//! core never touches it.

use crate::board::{BoardError, GameBoard};
use chess::ChessMove;
use log::{debug, info, warn};
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use thiserror::Error;

/// Centipawn value a forced mate is reported as
pub const MATE_EVAL: i32 = 10_000;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("cannot start engine `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("engine i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("engine closed the connection while waiting for `{0}`")]
    Disconnected(&'static str),
    #[error("engine reported no legal move")]
    NoMove,
    #[error("engine reported no evaluation")]
    NoEvaluation,
    #[error("engine suggested an unusable move: {0}")]
    BadMove(#[from] BoardError),
}

/// Evaluation as reported by a UCI engine, from the side to move's view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciScore {
    Centipawns(i32),
    /// Mate in N moves; negative when the side to move gets mated
    Mate(i32),
}

impl UciScore {
    /// Collapse to centipawns, mates become ±[`MATE_EVAL`]
    pub fn centipawns(self) -> i32 {
        match self {
            UciScore::Centipawns(cp) => cp,
            UciScore::Mate(n) if n > 0 => MATE_EVAL,
            UciScore::Mate(_) => -MATE_EVAL,
        }
    }
}

/// Move text of a `bestmove` line; `None` for other lines and for "no move"
pub fn parse_bestmove(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return None;
    }
    tokens
        .next()
        .filter(|mv| *mv != "(none)" && *mv != "0000")
}

/// Score carried by an `info` line, if any
pub fn parse_info_score(line: &str) -> Option<UciScore> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("info") {
        return None;
    }
    tokens.by_ref().find(|&token| token == "score")?;
    let kind = tokens.next()?;
    let value = tokens.next()?.parse().ok()?;
    match kind {
        "cp" => Some(UciScore::Centipawns(value)),
        "mate" => Some(UciScore::Mate(value)),
        _ => None,
    }
}

/// A source of reference moves and evaluations
pub trait Oracle {
    /// Engine's choice for the side to move, checked against `board`
    fn best_move(&mut self, board: &GameBoard) -> Result<ChessMove, OracleError>;

    /// Centipawn evaluation from the side to move's point of view
    fn evaluate(&mut self, board: &GameBoard) -> Result<i32, OracleError>;
}

/// Child process speaking UCI
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    depth: u8,
    closed: bool,
}

impl UciEngine {
    /// Start `program`, complete the UCI handshake and fix the search depth
    pub fn spawn(program: &str, depth: u8) -> Result<Self, OracleError> {
        Self::spawn_with_args(program, &[], depth)
    }

    pub fn spawn_with_args(program: &str, args: &[&str], depth: u8) -> Result<Self, OracleError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| OracleError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(OracleError::Disconnected("stdin"))?;
        let stdout = child.stdout.take().ok_or(OracleError::Disconnected("stdout"))?;
        let mut engine = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            depth: depth.max(1),
            closed: false,
        };

        engine.send("uci")?;
        engine.wait_for("uciok")?;
        engine.sync()?;
        info!("reference engine `{program}` ready, depth {}", engine.depth);
        Ok(engine)
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Forget everything about the previous game
    pub fn new_game(&mut self) -> Result<(), OracleError> {
        self.send("ucinewgame")?;
        self.sync()
    }

    fn send(&mut self, command: &str) -> Result<(), OracleError> {
        debug!("uci > {command}");
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self, waiting_for: &'static str) -> Result<String, OracleError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(OracleError::Disconnected(waiting_for));
        }
        let line = line.trim().to_string();
        debug!("uci < {line}");
        Ok(line)
    }

    fn wait_for(&mut self, token: &'static str) -> Result<(), OracleError> {
        while self.read_line(token)? != token {}
        Ok(())
    }

    fn sync(&mut self) -> Result<(), OracleError> {
        self.send("isready")?;
        self.wait_for("readyok")
    }

    /// Search `board` to the configured depth: best move text and last score
    fn go(&mut self, board: &GameBoard) -> Result<(Option<String>, Option<UciScore>), OracleError> {
        self.send(&format!("position fen {}", board.fen()))?;
        self.send(&format!("go depth {}", self.depth))?;

        let mut score = None;
        loop {
            let line = self.read_line("bestmove")?;
            if let Some(latest) = parse_info_score(&line) {
                score = Some(latest);
            } else if line.starts_with("bestmove") {
                return Ok((parse_bestmove(&line).map(str::to_string), score));
            }
        }
    }

    /// Send `quit` and reap the process
    pub fn quit(mut self) -> Result<(), OracleError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), OracleError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.send("quit")?;
        self.child.wait()?;
        Ok(())
    }
}

impl Oracle for UciEngine {
    fn best_move(&mut self, board: &GameBoard) -> Result<ChessMove, OracleError> {
        let (mv, _) = self.go(board)?;
        let mv = mv.ok_or(OracleError::NoMove)?;
        Ok(board.parse_uci(&mv)?)
    }

    fn evaluate(&mut self, board: &GameBoard) -> Result<i32, OracleError> {
        let (_, score) = self.go(board)?;
        score
            .map(UciScore::centipawns)
            .ok_or(OracleError::NoEvaluation)
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!("reference engine did not quit cleanly ({err}), killing it");
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(parse_bestmove("bestmove e2e4 ponder e7e5"), Some("e2e4"));
        assert_eq!(parse_bestmove("bestmove e7e8q"), Some("e7e8q"));
        assert_eq!(parse_bestmove("bestmove (none)"), None);
        assert_eq!(parse_bestmove("bestmove 0000"), None);
        assert_eq!(parse_bestmove("info depth 3"), None);
    }

    #[test]
    fn test_parse_info_score() {
        assert_eq!(
            parse_info_score("info depth 12 seldepth 18 score cp 34 nodes 1000 pv e2e4"),
            Some(UciScore::Centipawns(34))
        );
        assert_eq!(
            parse_info_score("info depth 5 score cp -120 lowerbound"),
            Some(UciScore::Centipawns(-120))
        );
        assert_eq!(
            parse_info_score("info depth 9 score mate -2 pv h7h8"),
            Some(UciScore::Mate(-2))
        );
        assert_eq!(parse_info_score("info string NNUE enabled"), None);
        assert_eq!(parse_info_score("bestmove e2e4"), None);
    }

    #[test]
    fn test_mate_scores_collapse() {
        assert_eq!(UciScore::Mate(3).centipawns(), MATE_EVAL);
        assert_eq!(UciScore::Mate(-1).centipawns(), -MATE_EVAL);
        assert_eq!(UciScore::Mate(0).centipawns(), -MATE_EVAL);
        assert_eq!(UciScore::Centipawns(-45).centipawns(), -45);
    }

    #[test]
    fn test_spawn_missing_program() {
        let err = UciEngine::spawn("/nonexistent/uci-engine", 4).err().unwrap();
        assert!(matches!(err, OracleError::Spawn { .. }));
    }

    #[cfg(unix)]
    const MOCK_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "id name mock"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "info depth 1 score cp 15 pv e2e4"; echo "info depth 2 score cp 28 pv e2e4"; echo "bestmove e2e4" ;;
    quit) exit 0 ;;
  esac
done
"#;

    #[cfg(unix)]
    #[test]
    fn test_talks_to_mock_engine() {
        let mut engine = UciEngine::spawn_with_args("sh", &["-c", MOCK_ENGINE], 2).unwrap();
        let board = GameBoard::default();
        engine.new_game().unwrap();
        assert_eq!(engine.best_move(&board).unwrap().to_string(), "e2e4");
        assert_eq!(engine.evaluate(&board).unwrap(), 28);
        engine.quit().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_mock_engine_illegal_suggestion_rejected() {
        let mut engine = UciEngine::spawn_with_args("sh", &["-c", MOCK_ENGINE], 2).unwrap();
        // e2e4 is not legal for Black
        let board =
            GameBoard::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        assert!(matches!(engine.best_move(&board), Err(OracleError::BadMove(_))));
    }
}
