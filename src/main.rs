use anyhow::{Context, Result};
use clap::Parser;
use minimax_chess::agent::ai::{Difficulty, EvalWeights, Engine};
use minimax_chess::agent::player::{EnginePlayer, OraclePlayer, Player};
use minimax_chess::board::{GameBoard, START_FEN};
use minimax_chess::oracle::{Oracle, UciEngine};
use minimax_chess::orchestrator::{GameConfig, Orchestrator};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "minimax_chess")]
#[command(about = "Fixed-depth alpha-beta chess engine", long_about = None)]
struct Args {
    /// Strength preset, sets the search depth
    #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// Search depth in plies, overrides the difficulty
    #[arg(short, long)]
    depth: Option<u8>,

    /// Search root moves in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Start position (FEN)
    #[arg(short, long)]
    fen: Option<String>,

    /// Only print the engine's choice for the start position
    #[arg(long)]
    analyse: bool,

    /// UCI reference engine to play against and judge moves with.
    /// Without one the engine plays itself.
    #[arg(short, long)]
    oracle: Option<PathBuf>,

    /// Search depth of the reference engine
    #[arg(long, default_value_t = 12)]
    oracle_depth: u8,

    /// Stop the game after this many plies
    #[arg(long, default_value_t = 200)]
    max_plies: usize,

    /// Give up on an engine move after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Write per-move metrics to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Evaluate material only, without piece-square tables
    #[arg(long)]
    no_positional: bool,

    #[arg(long, default_value_t = 2)]
    mobility_weight: i32,

    #[arg(long, default_value_t = 50)]
    repetition_penalty: i32,
}

impl Args {
    fn eval_weights(&self) -> EvalWeights {
        EvalWeights {
            positional: !self.no_positional,
            mobility_weight: self.mobility_weight,
            repetition_penalty: self.repetition_penalty,
        }
    }

    fn search_depth(&self) -> u8 {
        self.depth.unwrap_or_else(|| self.difficulty.depth())
    }

    fn game_config(&self) -> GameConfig {
        GameConfig {
            start_fen: self.fen.clone().unwrap_or_else(|| START_FEN.to_string()),
            max_plies: self.max_plies,
            move_timeout: self.timeout_ms.map(Duration::from_millis),
            ..GameConfig::default()
        }
    }
}

fn analyse(engine: &Engine, fen: &str) -> Result<()> {
    let board = GameBoard::from_fen(fen).context("cannot analyse position")?;
    println!("{board}\n");

    let result = engine.search(&board);
    match result.best_move {
        Some(mv) => println!(
            "bestmove {mv} score {} pruned {} nodes {}",
            result.score, result.pruned, result.nodes
        ),
        None => println!("no legal move ({:?})", board.outcome()),
    }
    Ok(())
}

fn spawn_oracle(path: &Path, depth: u8) -> Result<UciEngine> {
    let program = path.to_string_lossy();
    let mut engine = UciEngine::spawn(&program, depth)
        .with_context(|| format!("cannot start reference engine {}", path.display()))?;
    engine.new_game()?;
    Ok(engine)
}

fn play(args: &Args, engine: Engine) -> Result<()> {
    let config = args.game_config();
    let depth = engine.depth();

    let white = EnginePlayer::new(engine.clone(), format!("minimax d{depth}"));
    let (black, judge): (Box<dyn Player>, Option<Box<dyn Oracle>>) = match &args.oracle {
        Some(path) => {
            let opponent = spawn_oracle(path, args.oracle_depth)?;
            let judge = spawn_oracle(path, args.oracle_depth)?;
            (
                Box::new(OraclePlayer::new(opponent, "reference")),
                Some(Box::new(judge) as Box<dyn Oracle>),
            )
        }
        None => (
            Box::new(EnginePlayer::new(engine, format!("minimax d{depth} (black)"))),
            None,
        ),
    };

    let mut game = Orchestrator::new(Box::new(white), black, config)?;
    if let Some(judge) = judge {
        game = game.with_judge(judge);
    }
    let record = game.play()?;

    println!("{} {}", record.result(), record.end);
    println!("moves: {}", record.moves.join(" "));
    println!("final: {}", record.final_fen);

    if !record.metrics.plies().is_empty() {
        let summary = record.metrics.summary();
        println!(
            "plies judged: {}  match rate: {:.1}%  avg CPL: {:.1}",
            summary.plies,
            summary.match_rate * 100.0,
            summary.avg_cpl
        );
    }
    if let Some(path) = &args.csv {
        record
            .metrics
            .save_csv(path)
            .with_context(|| format!("cannot write metrics to {}", path.display()))?;
        println!("metrics written to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let engine =
        Engine::with_weights(args.eval_weights(), args.search_depth()).parallel(args.parallel);
    if args.analyse {
        let fen = args.fen.as_deref().unwrap_or(START_FEN);
        return analyse(&engine, fen);
    }
    play(&args, engine)
}
