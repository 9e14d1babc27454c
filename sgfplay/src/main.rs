use clap::Parser;
use log::debug;
use sgfplay_cache::{CacheConfig, CachedGameState, GameCacheManager, PrecomputePolicy};
use sgfplay_core::{
    format_move, parse_moves, parse_setup, GameRecord, MoveParseError, RecordError,
};
use sgfplay_jitter::JitterConfig;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "sgfplay")]
#[command(about = "Show cached replay state and jittered stone offsets", long_about = None)]
struct Args {
    /// Board size
    #[arg(long = "size", default_value = "19")]
    size: u8,

    /// Setup stones, e.g. "B:2,2 W:6,6"
    #[arg(long = "setup", default_value = "")]
    setup: String,

    /// Moves, e.g. "B:3,3 W:3,4 B:pass"
    #[arg(short = 'm', long = "moves", default_value = "")]
    moves: String,

    /// Move index to show (defaults to the last move)
    #[arg(short = 'i', long = "index")]
    index: Option<usize>,

    /// Jitter amplitude
    #[arg(short = 'e', long = "eccentricity", default_value = "1.0")]
    eccentricity: f64,

    /// Stone radius in grid units
    #[arg(short = 'r', long = "radius", default_value = "0.48")]
    radius: f64,

    /// Print the board
    #[arg(long = "board")]
    board: bool,

    /// Derive every index and print cache totals
    #[arg(long = "all")]
    all: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Notation(#[from] MoveParseError),

    #[error("{0}")]
    Record(#[from] RecordError),

    #[error("eccentricity must be a positive number, got {0}")]
    Eccentricity(f64),

    #[error("radius must be a positive number, got {0}")]
    Radius(f64),

    #[error("index {index} is past the last move ({moves})")]
    IndexOutOfRange { index: usize, moves: usize },
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    if !args.radius.is_finite() || args.radius <= 0.0 {
        return Err(CliError::Radius(args.radius));
    }

    let record = GameRecord::new(args.size, parse_setup(&args.setup)?, parse_moves(&args.moves)?)?;
    let index = args.index.unwrap_or(record.move_count());
    let move_count = record.move_count();

    let config = CacheConfig {
        jitter: JitterConfig::default(),
        stone_radius: args.radius,
        policy: if args.all {
            PrecomputePolicy::Eager
        } else {
            PrecomputePolicy::OnDemand
        },
        ..CacheConfig::default()
    };
    let manager = GameCacheManager::new(config);
    if !manager.set_eccentricity(args.eccentricity) {
        return Err(CliError::Eccentricity(args.eccentricity));
    }

    let game = manager.load_game(record);
    debug!("Game fingerprint {}", game.fingerprint());

    if args.all {
        manager.pre_calculate_all();
    }

    let state = game
        .get_or_calculate(index)
        .ok_or(CliError::IndexOutOfRange {
            index,
            moves: move_count,
        })?;
    print_state(&state, args.board);

    if args.all {
        let info = manager.cache_info();
        println!("cache: {} games, {} states", info.games, info.states);
    }
    Ok(())
}

fn print_state(state: &CachedGameState, show_board: bool) {
    match &state.last_move {
        Some(mv) => println!("move {}: {}", state.move_index, format_move(mv)),
        None => println!("move {}: start", state.move_index),
    }
    println!(
        "captured: black {} white {}",
        state.captures.black_captured, state.captures.white_captured
    );
    println!(
        "bowls: black {} white {}",
        state.bowls.black.len(),
        state.bowls.white.len()
    );

    if show_board {
        print!("{}", state.board);
    }

    for (pos, color) in state.board.occupied_positions() {
        let offset = state.offset_or_zero(pos);
        println!(
            "{} {} {:+.4} {:+.4}",
            color.to_char(),
            pos,
            offset.dx,
            offset.dy
        );
    }
}
