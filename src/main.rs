//! Gomoku AI Engine CLI
//!
//! Asks the engine for a move in a given position, or lets it play a whole
//! game against itself. Set `RUST_LOG=gomoku_ai=debug` to watch the search.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gomoku_ai::rules::{check_winner, GameResult};
use gomoku_ai::{AIEngine, Board, EngineConfig, Pos, DEFAULT_SIZE};

#[derive(Parser, Debug)]
#[command(name = "gomoku-ai", about = "Connect-five engine", version)]
struct Args {
    /// Difficulty level, 1 (beginner) to 5 (expert)
    #[arg(short, long)]
    level: Option<u8>,

    /// Board size
    #[arg(short, long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Moves already played, Black first, e.g. "7,7 6,8 8,6"
    #[arg(short, long, default_value = "")]
    moves: String,

    /// Never answer from the opening book
    #[arg(long)]
    no_book: bool,

    /// Per-move time budget in milliseconds (overrides the level)
    #[arg(long)]
    time_ms: Option<u64>,

    /// Seed for the difficulty randomization
    #[arg(long)]
    seed: Option<u64>,

    /// Play the engine against itself from the given position
    #[arg(long)]
    self_play: bool,

    /// JSON engine configuration; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = build_config(&args)?;
    let mut engine = AIEngine::new(config)?;
    let mut board = Board::new(args.size)?;
    for pos in parse_moves(&args.moves)? {
        board.play(pos)?;
    }

    if args.self_play {
        self_play(&mut engine, &mut board)
    } else {
        println!("{board}");
        let side = board.side_to_move();
        let result = engine.get_move_with_stats(&board, side)?;
        match result.best_move {
            Some(pos) => println!(
                "{side:?} plays {pos} (score {}, depth {}, {} nodes, {}ms, {:?})",
                result.score, result.depth, result.nodes, result.time_ms, result.source
            ),
            None => println!("no legal move"),
        }
        Ok(())
    }
}

fn build_config(args: &Args) -> Result<EngineConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if let Some(level) = args.level {
        config.level = level;
    }
    if args.no_book {
        config.use_opening_book = false;
    }
    if args.time_ms.is_some() {
        config.time_budget_ms = args.time_ms;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

/// Parse whitespace separated `row,col` pairs.
fn parse_moves(text: &str) -> Result<Vec<Pos>, String> {
    text.split_whitespace()
        .map(|token| {
            let (r, c) = token
                .split_once(',')
                .ok_or_else(|| format!("expected row,col but got {token:?}"))?;
            let row = r.trim().parse::<u8>().map_err(|e| format!("bad row in {token:?}: {e}"))?;
            let col = c.trim().parse::<u8>().map_err(|e| format!("bad column in {token:?}: {e}"))?;
            Ok(Pos { row, col })
        })
        .collect()
}

fn self_play(engine: &mut AIEngine, board: &mut Board) -> Result<(), Box<dyn Error>> {
    loop {
        if let Some(result) = check_winner(board) {
            println!("{board}");
            match result {
                GameResult::Win(stone) => println!("{stone:?} wins after {} moves", board.stone_count()),
                GameResult::Draw => println!("draw"),
            }
            return Ok(());
        }

        let side = board.side_to_move();
        let result = engine.get_move_with_stats(board, side)?;
        let Some(pos) = result.best_move else {
            println!("{board}");
            println!("no legal move");
            return Ok(());
        };
        board.play(pos)?;
        info!(?side, %pos, score = result.score, source = ?result.source, "self-play move");
        println!("{side:?} {pos}");
    }
}
