//! The game session — one player, one game, one seed.
//!
//! TICK ORDER (fixed, documented, never reordered):
//!   1. Clock advances.
//!   2. The tick's RNG stream is derived from (seed, game, tick).
//!   3. TickStarted is recorded.
//!   4. The game consumes the heartbeat.
//!   5. Submitted scores are settled against the high score table.
//!   6. TickCompleted is recorded.
//!   7. On snapshot ticks, full state is saved.
//!
//! Commands applied between heartbeats draw from the current tick's
//! stream, after whatever the heartbeat already consumed. A command
//! that fails leaves the log and the stream untouched.
//!
//! RULES:
//!   - Games never see the store; they emit ScoreSubmitted and the
//!     session settles it.
//!   - All randomness flows through the per-tick GameRng.
//!   - All state changes are recorded in the event log.

use crate::{
    clock::SessionClock,
    command::GameCommand,
    config::ArcadeConfig,
    error::ArcadeResult,
    event::{EventLogEntry, GameEvent, ScoreDirection},
    game::{ArcadeGame, GameSetup},
    math_game::MathGame,
    puzzle_game::PuzzleGame,
    reel_game::ReelGame,
    rng::{GameKind, GameRng},
    snake_game::SnakeGame,
    snapshot::{SessionSnapshot, SNAPSHOT_INTERVAL},
    store::ScoreStore,
    types::{SessionId, Tick},
};

pub struct GameSession {
    pub session_id: SessionId,
    pub clock:      SessionClock,
    pub store:      ScoreStore,
    seed:           u64,
    kind:           GameKind,
    rng:            GameRng,
    game:           Box<dyn ArcadeGame>,
    command_seq:    u64,
}

impl GameSession {
    /// Build a fully wired session: game constructed from its setup,
    /// session row inserted, SessionStarted in the log at tick 0.
    pub fn build(
        session_id: SessionId,
        seed: u64,
        store: ScoreStore,
        setup: GameSetup,
        config: &ArcadeConfig,
    ) -> ArcadeResult<Self> {
        let kind = setup.kind();
        // Construction draws (initial food, first question, reel fill)
        // come from the tick-0 stream; tick-0 commands continue it.
        let mut rng = GameRng::for_game_at_tick(seed, kind, 0);
        let game: Box<dyn ArcadeGame> = match setup {
            GameSetup::Slot {
                theme,
                initial_credits,
            } => Box::new(ReelGame::new(&config.slot, &theme, initial_credits, &mut rng)?),
            GameSetup::Puzzle { grid_size } => {
                Box::new(PuzzleGame::new(&config.puzzle, grid_size))
            }
            GameSetup::Snake => Box::new(SnakeGame::new(&config.snake, &mut rng)),
            GameSetup::Math {
                difficulty,
                operation,
            } => Box::new(MathGame::new(&config.math, difficulty, operation, &mut rng)),
        };

        store.insert_session(&session_id, kind.name(), seed, env!("CARGO_PKG_VERSION"))?;
        let session = Self {
            clock: SessionClock::new(session_id.clone()),
            session_id: session_id.clone(),
            seed,
            kind,
            rng,
            game,
            store,
            command_seq: 0,
        };
        let started = GameEvent::SessionStarted {
            session_id,
            game: kind.name().to_string(),
            seed,
        };
        session.persist_events(0, std::slice::from_ref(&started))?;
        log::info!(
            "session {} started: game={} seed={seed}",
            session.session_id,
            kind.name()
        );
        Ok(session)
    }

    /// Build against an in-memory store and the hardcoded test config.
    /// Used by integration tests; production callers use build().
    pub fn build_test(session_id: &str, seed: u64, setup: GameSetup) -> ArcadeResult<Self> {
        let store = ScoreStore::in_memory()?;
        store.migrate()?;
        Self::build(
            session_id.to_string(),
            seed,
            store,
            setup,
            &ArcadeConfig::default_test(),
        )
    }

    /// Apply one player command at the current tick.
    ///
    /// Returns every event the command produced, already persisted.
    /// On error nothing is persisted and the command id is not spent.
    pub fn apply(&mut self, command: GameCommand) -> ArcadeResult<Vec<GameEvent>> {
        let tick = self.clock.current_tick;
        let mut events = vec![GameEvent::CommandReceived {
            tick,
            command_id: format!("cmd-{tick}-{}", self.command_seq),
            command_type: command.type_name().to_string(),
        }];
        let game_events = self.game.apply(tick, &command, &mut self.rng)?;
        let settled = self.settle_scores(&game_events)?;
        events.extend(game_events);
        events.extend(settled);
        self.persist_events(tick, &events)?;
        self.command_seq += 1;
        log::debug!(
            "tick={tick} cmd={} events={}",
            command.type_name(),
            events.len()
        );
        Ok(events)
    }

    /// Advance one tick. This is the core session step.
    pub fn tick(&mut self) -> ArcadeResult<Vec<GameEvent>> {
        assert!(!self.clock.paused, "tick() called on paused session");

        let current_tick = self.clock.advance();
        self.rng = GameRng::for_game_at_tick(self.seed, self.kind, current_tick);

        let mut tick_events = vec![GameEvent::TickStarted { tick: current_tick }];
        let game_events = self.game.tick(current_tick, &mut self.rng)?;
        let settled = self.settle_scores(&game_events)?;
        tick_events.extend(game_events);
        tick_events.extend(settled);
        tick_events.push(GameEvent::TickCompleted { tick: current_tick });

        self.persist_events(current_tick, &tick_events)?;

        if current_tick.is_multiple_of(SNAPSHOT_INTERVAL) {
            self.take_snapshot(current_tick)?;
        }

        Ok(tick_events)
    }

    /// Run n ticks in a loop. Used for testing and headless runs.
    pub fn run_ticks(&mut self, n: u64) -> ArcadeResult<()> {
        self.clock.resume();
        for _ in 0..n {
            self.tick()?;
        }
        self.clock.pause();
        Ok(())
    }

    /// Compare each submitted score against the stored record and
    /// emit HighScoreUpdated for every new best.
    fn settle_scores(&self, events: &[GameEvent]) -> ArcadeResult<Vec<GameEvent>> {
        let mut updates = Vec::new();
        for event in events {
            let GameEvent::ScoreSubmitted {
                tick,
                key,
                value,
                direction,
            } = event
            else {
                continue;
            };
            let previous = self.store.load_score(key)?;
            let beats_record = match (previous, direction) {
                (None, _) => true,
                (Some(old), ScoreDirection::HigherIsBetter) => *value > old,
                (Some(old), ScoreDirection::LowerIsBetter) => *value < old,
            };
            if beats_record {
                self.store
                    .save_score(key, *value, &self.session_id, *tick)?;
                log::info!("new high score: {key}={value} (previous {previous:?})");
                updates.push(GameEvent::HighScoreUpdated {
                    tick: *tick,
                    key: key.clone(),
                    value: *value,
                    previous,
                });
            }
        }
        Ok(updates)
    }

    fn persist_events(&self, tick: Tick, events: &[GameEvent]) -> ArcadeResult<()> {
        for event in events {
            let entry = EventLogEntry {
                id:         None,
                session_id: self.session_id.clone(),
                tick,
                game:       self.event_source(event).to_string(),
                event_type: event.type_name().to_string(),
                payload:    serde_json::to_string(event)?,
            };
            self.store.append_event(&entry)?;
        }
        Ok(())
    }

    /// The event_log `game` column: session bookkeeping events are
    /// attributed to "session", everything else to the running game.
    fn event_source(&self, event: &GameEvent) -> &'static str {
        match event {
            GameEvent::SessionStarted { .. }
            | GameEvent::TickStarted { .. }
            | GameEvent::TickCompleted { .. }
            | GameEvent::CommandReceived { .. }
            | GameEvent::HighScoreUpdated { .. } => "session",
            _ => self.kind.name(),
        }
    }

    fn take_snapshot(&self, tick: Tick) -> ArcadeResult<()> {
        let snapshot = SessionSnapshot {
            session_id: self.session_id.clone(),
            tick,
            clock: self.clock.clone(),
            game: self.kind,
            state: self.game.state()?,
        };
        let json = serde_json::to_string(&snapshot)?;
        self.store.save_snapshot(&self.session_id, tick, &json)?;
        log::debug!("snapshot saved at tick {tick}");
        Ok(())
    }

    /// The running game's render-ready state.
    pub fn state_json(&self) -> ArcadeResult<serde_json::Value> {
        self.game.state()
    }

    /// The running game, for downcasting in tests and tooling.
    pub fn game(&self) -> &dyn ArcadeGame {
        self.game.as_ref()
    }

    /// Query events for a specific tick from the store.
    /// Used by the determinism test and replay tooling.
    pub fn events_for_tick(&self, tick: Tick) -> ArcadeResult<Vec<EventLogEntry>> {
        self.store.events_for_tick(&self.session_id, tick)
    }
}
