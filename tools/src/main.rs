//! arcade-runner: headless session runner for the Lunchbreak Arcade.
//!
//! Usage:
//!   arcade-runner --game snake --seed 42 --ticks 400 --db run.db
//!   arcade-runner --game math --difficulty hard --operation mixed
//!   arcade-runner --game slot --ipc-mode

use anyhow::Result;
use arcade_core::{
    command::GameCommand,
    config::ArcadeConfig,
    event::GameEvent,
    game::GameSetup,
    math_game::{Difficulty, MathGame, MathOperation},
    puzzle_game::PuzzleGame,
    reel_game::ReelGame,
    rng::GameKind,
    session::GameSession,
    snake_game::{Direction, SnakeGame},
    store::ScoreStore,
    types::Tick,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Command { command: GameCommand },
    Quit,
}

#[derive(serde::Serialize)]
struct IpcReply {
    tick: Tick,
    paused: bool,
    events: Vec<GameEvent>,
    state: serde_json::Value,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 400u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let game = str_arg(&args, "--game").unwrap_or("slot");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");

    let config = ArcadeConfig::load(data_dir)?;

    let theme = str_arg(&args, "--theme").unwrap_or(&config.slot.default_theme);
    let credits = parse_arg(&args, "--credits", config.slot.initial_credits);
    let grid = parse_arg(&args, "--grid", config.puzzle.default_grid_size);
    let difficulty = str_arg(&args, "--difficulty")
        .map(|s| Difficulty::parse(s).ok_or_else(|| anyhow::anyhow!("unknown difficulty '{s}'")))
        .transpose()?
        .unwrap_or(Difficulty::Easy);
    let operation = str_arg(&args, "--operation")
        .map(|s| MathOperation::parse(s).ok_or_else(|| anyhow::anyhow!("unknown operation '{s}'")))
        .transpose()?
        .unwrap_or(MathOperation::Mixed);

    if !ipc_mode {
        println!("Lunchbreak Arcade — arcade-runner");
        println!("  started:   {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!("  game:      {game}");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let setup = match game {
        "slot" => GameSetup::Slot {
            theme: theme.to_string(),
            initial_credits: credits,
        },
        "puzzle" => GameSetup::Puzzle { grid_size: grid },
        "snake" => GameSetup::Snake,
        "math" => GameSetup::Math {
            difficulty,
            operation,
        },
        other => anyhow::bail!("unknown game '{other}' (expected slot|puzzle|snake|math)"),
    };

    let store = ScoreStore::open(db)?;
    store.migrate()?;

    let session_id = format!("{game}-{}", uuid::Uuid::new_v4());
    let mut session = GameSession::build(session_id, seed, store, setup, &config)?;

    if ipc_mode {
        run_ipc_loop(&mut session)?;
    } else {
        run_demo(&mut session, game, ticks)?;
        print_summary(&session, ticks)?;
    }

    Ok(())
}

// ── IPC mode ───────────────────────────────────────────────────────
// One JSON command per stdin line, one JSON reply per line. This is
// the boundary the web host drives; it schedules ticks at whatever
// cadence the returned state asks for.

fn run_ipc_loop(session: &mut GameSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    // The host owns the cadence, so the clock stays live for the
    // duration of the connection.
    session.clock.resume();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("unknown ipc command: {}", buffer.trim());
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => build_reply(session, vec![])?,
            IpcCommand::Tick { count } => {
                let mut events = Vec::new();
                for _ in 0..count {
                    events.extend(session.tick()?);
                }
                build_reply(session, events)?
            }
            IpcCommand::Command { command } => match session.apply(command) {
                Ok(events) => build_reply(session, events)?,
                Err(e) => {
                    writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                    stdout.flush()?;
                    continue;
                }
            },
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    session.clock.pause();
    Ok(())
}

fn build_reply(session: &GameSession, events: Vec<GameEvent>) -> Result<String> {
    let reply = IpcReply {
        tick: session.clock.current_tick,
        paused: session.clock.paused,
        events,
        state: session.state_json()?,
    };
    Ok(serde_json::to_string(&reply)?)
}

// ── Headless demo mode ─────────────────────────────────────────────
// Scripted per-game policies for soak and determinism runs. Choices
// derive from step counters and the engine's own state, never from a
// host-side RNG, so a given seed always replays the same session.

fn run_demo(session: &mut GameSession, game: &str, ticks: u64) -> Result<()> {
    match game {
        "slot" => run_slot_demo(session, ticks),
        "puzzle" => run_puzzle_demo(session, ticks),
        "snake" => run_snake_demo(session, ticks),
        "math" => run_math_demo(session, ticks),
        _ => unreachable!("game validated in main"),
    }
}

/// Auto-play until the tick budget runs out or the credits do.
fn run_slot_demo(session: &mut GameSession, ticks: u64) -> Result<()> {
    session.apply(GameCommand::SetAutoPlay { enabled: true })?;
    session.run_ticks(ticks)?;
    Ok(())
}

/// Shuffle, then walk legal moves until solved or out of ticks. The
/// neighbour pick cycles with the step index.
fn run_puzzle_demo(session: &mut GameSession, ticks: u64) -> Result<()> {
    session.apply(GameCommand::Shuffle)?;
    for step in 0..ticks {
        session.run_ticks(1)?;
        let state = session.state_json()?;
        let size = state["size"].as_u64().unwrap_or(2) as i64;
        let row = state["empty"]["row"].as_i64().unwrap_or(0);
        let col = state["empty"]["col"].as_i64().unwrap_or(0);
        let mut candidates = Vec::new();
        for (dr, dc) in [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)] {
            let (r, c) = (row + dr, col + dc);
            if (0..size).contains(&r) && (0..size).contains(&c) {
                candidates.push((r as usize, c as usize));
            }
        }
        let (row, col) = candidates[step as usize % candidates.len()];
        let events = session.apply(GameCommand::MoveTile { row, col })?;
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::PuzzleSolved { .. }))
        {
            break;
        }
    }
    Ok(())
}

/// Start, turn clockwise every few ticks, reset after a crash and go
/// again until the tick budget is spent.
fn run_snake_demo(session: &mut GameSession, ticks: u64) -> Result<()> {
    const TURNS: [Direction; 4] = [
        Direction::Down,
        Direction::Left,
        Direction::Up,
        Direction::Right,
    ];
    session.apply(GameCommand::Start)?;
    session.clock.resume();
    let mut turn = 0usize;
    for step in 0..ticks {
        if step % 7 == 6 {
            session.apply(GameCommand::SetDirection {
                direction: TURNS[turn % TURNS.len()],
            })?;
            turn += 1;
        }
        let events = session.tick()?;
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::SnakeCrashed { .. }))
        {
            session.apply(GameCommand::Reset)?;
            session.apply(GameCommand::Start)?;
        }
    }
    session.clock.pause();
    Ok(())
}

/// Answer straight from the engine's own posed question; every fifth
/// submission is deliberately wrong to exercise streak resets.
fn run_math_demo(session: &mut GameSession, ticks: u64) -> Result<()> {
    session.clock.resume();
    let mut submissions = 0u64;
    for step in 0..ticks {
        let events = session.tick()?;
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::MathSessionEnded { .. }))
        {
            break;
        }
        if step % 2 == 1 {
            let state = session.state_json()?;
            let answer = state["question"]["answer"].as_i64().unwrap_or(0);
            submissions += 1;
            let given = if submissions % 5 == 0 { answer + 1 } else { answer };
            session.apply(GameCommand::SubmitAnswer {
                input: given.to_string(),
            })?;
        }
    }
    session.clock.pause();
    Ok(())
}

fn print_summary(session: &GameSession, ticks: u64) -> Result<()> {
    let events = session.store.event_count(&session.session_id)?;

    println!("=== SESSION SUMMARY ===");
    println!("  session_id:  {}", session.session_id);
    println!("  ticks run:   {ticks}");
    println!("  final tick:  {}", session.clock.current_tick);
    println!("  events:      {events}");

    match session.game().kind() {
        GameKind::Slot => {
            if let Some(slot) = session.game().as_any().downcast_ref::<ReelGame>() {
                let stats = &slot.state.stats;
                println!("  credits:     {:.2}", slot.state.credits);
                println!("  spins:       {}", stats.spins);
                println!("  rtp:         {:.3}", stats.rtp());
                println!("  hit_rate:    {:.3}", stats.hit_rate());
            }
        }
        GameKind::Puzzle => {
            if let Some(puzzle) = session.game().as_any().downcast_ref::<PuzzleGame>() {
                println!("  grid:        {0}x{0}", puzzle.state.size);
                println!("  moves:       {}", puzzle.state.moves);
                println!("  solved:      {}", puzzle.state.is_solved());
            }
        }
        GameKind::Snake => {
            if let Some(snake) = session.game().as_any().downcast_ref::<SnakeGame>() {
                println!("  phase:       {:?}", snake.state.phase);
                println!("  score:       {}", snake.state.score);
                println!("  length:      {}", snake.state.segments.len());
                println!("  interval_ms: {}", snake.state.tick_interval_ms);
            }
        }
        GameKind::Math => {
            if let Some(math) = session.game().as_any().downcast_ref::<MathGame>() {
                println!("  score:       {}", math.state.score);
                println!("  answered:    {}", math.state.questions_answered);
                println!("  streak:      {}", math.state.streak);
            }
        }
    }

    println!();
    println!("=== HIGH SCORES ===");
    let scores = session.store.all_high_scores()?;
    if scores.is_empty() {
        println!("  (none recorded yet)");
    } else {
        for (key, value) in scores {
            println!("  {key:<24} {value}");
        }
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
