//! High-score persistence and settlement.
//!
//! Games submit scores as events; the session compares each one
//! against the stored record and only a strict improvement writes the
//! table and emits HighScoreUpdated. Records are keyed per game
//! variant and outlive the sessions that set them.
//!
//! Tests cover:
//! - absent keys, first scores, and per-variant key separation
//! - strict improvement in both directions (higher for math, lower
//!   for puzzle moves)
//! - losing and tying runs leaving the record untouched

use arcade_core::command::GameCommand;
use arcade_core::config::ArcadeConfig;
use arcade_core::event::GameEvent;
use arcade_core::game::{ArcadeGame, GameSetup};
use arcade_core::math_game::{Difficulty, MathGame, MathOperation};
use arcade_core::puzzle_game::PuzzleGame;
use arcade_core::session::GameSession;
use arcade_core::store::ScoreStore;

/// A store with one pre-existing record, standing in for an earlier
/// session's play.
fn store_with_record(key: &str, value: i64) -> ScoreStore {
    let store = ScoreStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.save_score(key, value, "earlier-session", 1).unwrap();
    store
}

/// Build an easy-addition math session over the given store, answer
/// `correct` rounds right at tick 0, then run the clock out so the
/// score settles.
fn run_math_session(store: ScoreStore, session_id: &str, correct: usize) -> GameSession {
    let mut session = GameSession::build(
        session_id.to_string(),
        0xDEAD_BEEF,
        store,
        GameSetup::Math {
            difficulty: Difficulty::Easy,
            operation: MathOperation::Addition,
        },
        &ArcadeConfig::default_test(),
    )
    .unwrap();
    for _ in 0..correct {
        let answer = session
            .game()
            .as_any()
            .downcast_ref::<MathGame>()
            .unwrap()
            .state
            .question
            .answer;
        session
            .apply(GameCommand::SubmitAnswer {
                input: answer.to_string(),
            })
            .unwrap();
    }
    session.run_ticks(60).unwrap();
    session
}

/// Solve a shuffled 2x2 by always sliding the cell clockwise of the
/// empty one. The twelve reachable 2x2 states sit on a single cycle,
/// so the walk reaches the solved layout within a dozen slides from
/// anywhere. Returns the reported move count.
fn rotate_to_solved(session: &mut GameSession) -> u64 {
    for _ in 0..48 {
        let empty = session
            .game()
            .as_any()
            .downcast_ref::<PuzzleGame>()
            .unwrap()
            .state
            .empty;
        let (row, col) = match (empty.row, empty.col) {
            (0, 0) => (0, 1),
            (0, 1) => (1, 1),
            (1, 1) => (1, 0),
            _ => (0, 0),
        };
        let events = session.apply(GameCommand::MoveTile { row, col }).unwrap();
        for event in events {
            if let GameEvent::PuzzleSolved { moves, .. } = event {
                return moves;
            }
        }
    }
    panic!("the 2x2 rotation never reached the solved layout");
}

/// A key never scored reads back as None and lists nothing.
#[test]
fn missing_key_reads_none() {
    let store = ScoreStore::in_memory().unwrap();
    store.migrate().unwrap();
    assert_eq!(store.load_score("snake").unwrap(), None);
    assert!(store.all_high_scores().unwrap().is_empty());
}

/// The store itself takes any overwrite; the strict comparison lives
/// in the session, not here.
#[test]
fn store_overwrites_unconditionally() {
    let store = ScoreStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.save_score("snake", 40, "s1", 10).unwrap();
    assert_eq!(store.load_score("snake").unwrap(), Some(40));
    store.save_score("snake", 25, "s2", 20).unwrap();
    assert_eq!(store.load_score("snake").unwrap(), Some(25));
}

/// Each variant records under its own key; the listing is key-ordered.
#[test]
fn score_keys_are_per_game_variant() {
    let store = ScoreStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.save_score("puzzle-3x3", 40, "s", 1).unwrap();
    store.save_score("puzzle-4x4", 90, "s", 1).unwrap();
    store.save_score("math-easy-addition", 12, "s", 2).unwrap();

    assert_eq!(store.load_score("puzzle-3x3").unwrap(), Some(40));
    assert_eq!(store.load_score("puzzle-4x4").unwrap(), Some(90));
    let all = store.all_high_scores().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].0, "math-easy-addition");
}

/// The first score for a key always sets the record, with no previous
/// value in the update event.
#[test]
fn first_score_sets_the_record() {
    let store = ScoreStore::in_memory().unwrap();
    store.migrate().unwrap();
    let session = run_math_session(store, "hs-first-test", 2);

    assert_eq!(
        session.store.load_score("math-easy-addition").unwrap(),
        Some(2)
    );
    let updates = session
        .store
        .events_of_type("hs-first-test", "high_score_updated")
        .unwrap();
    assert_eq!(updates.len(), 1);
    assert!(
        updates[0].payload.contains("\"previous\":null"),
        "a first record has no previous value: {}",
        updates[0].payload
    );
}

/// A score below the record leaves it untouched and emits no update.
#[test]
fn losing_run_leaves_the_record() {
    let store = store_with_record("math-easy-addition", 3);
    let session = run_math_session(store, "hs-lose-test", 2);

    assert_eq!(
        session.store.load_score("math-easy-addition").unwrap(),
        Some(3),
        "2 does not beat 3"
    );
    assert!(session
        .store
        .events_of_type("hs-lose-test", "high_score_updated")
        .unwrap()
        .is_empty());
}

/// Matching the record is not beating it.
#[test]
fn tying_run_never_rewrites_the_record() {
    let store = store_with_record("math-easy-addition", 2);
    let session = run_math_session(store, "hs-tie-test", 2);
    assert!(session
        .store
        .events_of_type("hs-tie-test", "high_score_updated")
        .unwrap()
        .is_empty());
}

/// A winning run rewrites the record and reports the value it beat.
/// Settlement is session bookkeeping, attributed to "session" in the
/// log.
#[test]
fn winning_run_updates_with_previous() {
    let store = store_with_record("math-easy-addition", 3);
    let session = run_math_session(store, "hs-win-test", 4);

    assert_eq!(
        session.store.load_score("math-easy-addition").unwrap(),
        Some(4)
    );
    let updates = session
        .store
        .events_of_type("hs-win-test", "high_score_updated")
        .unwrap();
    assert_eq!(updates.len(), 1);
    assert!(
        updates[0].payload.contains("\"previous\":3"),
        "{}",
        updates[0].payload
    );
    assert_eq!(updates[0].tick, 60, "the score settles when the clock ends");
    assert_eq!(updates[0].game, "session");
}

/// Puzzle records count moves, so fewer is better: against a 1-move
/// record any real solve loses, against a soft record it wins.
#[test]
fn fewer_moves_beat_the_puzzle_record() {
    let cfg = ArcadeConfig::default_test();

    let store = store_with_record("puzzle-2x2", 1);
    let mut session = GameSession::build(
        "hs-puzzle-lose-test".to_string(),
        0xBEEF,
        store,
        GameSetup::Puzzle { grid_size: 2 },
        &cfg,
    )
    .unwrap();
    session.apply(GameCommand::Shuffle).unwrap();
    let moves = rotate_to_solved(&mut session);
    assert!(moves >= 1);
    assert_eq!(
        session.store.load_score("puzzle-2x2").unwrap(),
        Some(1),
        "{moves} moves cannot beat a 1-move record"
    );
    assert!(session
        .store
        .events_of_type("hs-puzzle-lose-test", "high_score_updated")
        .unwrap()
        .is_empty());

    let store = store_with_record("puzzle-2x2", 1000);
    let mut session = GameSession::build(
        "hs-puzzle-win-test".to_string(),
        0xBEEF,
        store,
        GameSetup::Puzzle { grid_size: 2 },
        &cfg,
    )
    .unwrap();
    session.apply(GameCommand::Shuffle).unwrap();
    let moves = rotate_to_solved(&mut session);
    assert!(moves < 1000);
    assert_eq!(
        session.store.load_score("puzzle-2x2").unwrap(),
        Some(moves as i64)
    );
    let updates = session
        .store
        .events_of_type("hs-puzzle-win-test", "high_score_updated")
        .unwrap();
    assert_eq!(updates.len(), 1);
    assert!(
        updates[0].payload.contains("\"previous\":1000"),
        "{}",
        updates[0].payload
    );
}
