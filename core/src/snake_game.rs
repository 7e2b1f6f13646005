//! Snake engine on a toroidal grid.
//!
//! Leaving one edge re-enters on the opposite edge — walls are never
//! lethal here. Only self-collision ends a run, and the check is
//! strict: the cell the tail is about to vacate still counts.

use crate::{
    command::GameCommand,
    config::SnakeConfig,
    error::{ArcadeError, ArcadeResult},
    event::{GameEvent, ScoreDirection},
    game::ArcadeGame,
    rng::{GameKind, GameRng},
    types::Tick,
};
use serde::{Deserialize, Serialize};

pub const SNAKE_SCORE_KEY: &str = "snake";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    fn delta(&self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnakePhase {
    Ready,
    Running,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    pub x: i32,
    pub y: i32,
    pub special: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnakeState {
    pub phase: SnakePhase,
    /// Head-first segment list; no two segments share a cell.
    pub segments: Vec<Cell>,
    pub direction: Direction,
    /// Buffered input, promoted at the next movement step.
    /// Last writer before the step wins.
    pub pending_direction: Option<Direction>,
    pub food: Food,
    pub score: i64,
    pub tick_interval_ms: u32,
    /// Growth still owed from special food. Realised one segment per
    /// step so cells stay unique.
    pub pending_growth: u32,
}

pub struct SnakeGame {
    cfg: SnakeConfig,
    pub state: SnakeState,
}

impl SnakeGame {
    pub fn new(cfg: &SnakeConfig, rng: &mut GameRng) -> Self {
        Self {
            cfg: cfg.clone(),
            state: Self::initial_state(cfg, rng),
        }
    }

    /// Snake starts horizontal at mid-grid, head east, body trailing
    /// west. Food spawn is the first rng draw of the session.
    fn initial_state(cfg: &SnakeConfig, rng: &mut GameRng) -> SnakeState {
        let cx = cfg.grid_width / 2;
        let cy = cfg.grid_height / 2;
        let segments: Vec<Cell> = (0..cfg.initial_length as i32)
            .map(|i| Cell {
                x: (cx - i).rem_euclid(cfg.grid_width),
                y: cy,
            })
            .collect();
        let food = Self::spawn_food(cfg, &segments, rng);
        SnakeState {
            phase: SnakePhase::Ready,
            segments,
            direction: Direction::Right,
            pending_direction: None,
            food,
            score: 0,
            tick_interval_ms: cfg.initial_interval_ms,
            pending_growth: 0,
        }
    }

    /// Pick a free cell, then roll whether the food is special.
    /// Free cells are enumerated row-major so the index draw is stable.
    fn spawn_food(cfg: &SnakeConfig, segments: &[Cell], rng: &mut GameRng) -> Food {
        let mut free = Vec::with_capacity((cfg.grid_width * cfg.grid_height) as usize);
        for y in 0..cfg.grid_height {
            for x in 0..cfg.grid_width {
                let cell = Cell { x, y };
                if !segments.contains(&cell) {
                    free.push(cell);
                }
            }
        }
        assert!(!free.is_empty(), "snake fills the whole grid");
        let cell = free[rng.next_index(free.len())];
        let special = rng.chance(cfg.special_food_chance);
        Food {
            x: cell.x,
            y: cell.y,
            special,
        }
    }

    fn set_direction(&mut self, tick: Tick, direction: Direction) -> Vec<GameEvent> {
        if self.state.phase == SnakePhase::GameOver {
            return vec![];
        }
        // A 180° turn would have the head step straight into the neck.
        if direction == self.state.direction.opposite() {
            return vec![];
        }
        if self.state.pending_direction == Some(direction) {
            return vec![];
        }
        self.state.pending_direction = Some(direction);
        vec![GameEvent::DirectionChanged { tick, direction }]
    }

    fn change_phase(&mut self, tick: Tick, phase: SnakePhase) -> Vec<GameEvent> {
        self.state.phase = phase;
        vec![GameEvent::SnakePhaseChanged { tick, phase }]
    }

    fn step(&mut self, tick: Tick, rng: &mut GameRng) -> Vec<GameEvent> {
        if let Some(direction) = self.state.pending_direction.take() {
            self.state.direction = direction;
        }
        let (dx, dy) = self.state.direction.delta();
        let head = self.state.segments[0];
        let new_head = Cell {
            x: (head.x + dx).rem_euclid(self.cfg.grid_width),
            y: (head.y + dy).rem_euclid(self.cfg.grid_height),
        };

        if self.state.segments.contains(&new_head) {
            self.state.phase = SnakePhase::GameOver;
            log::info!(
                "snake crashed: score={} length={}",
                self.state.score,
                self.state.segments.len()
            );
            return vec![
                GameEvent::SnakeCrashed {
                    tick,
                    score: self.state.score,
                    length: self.state.segments.len(),
                },
                GameEvent::ScoreSubmitted {
                    tick,
                    key: SNAKE_SCORE_KEY.into(),
                    value: self.state.score,
                    direction: ScoreDirection::HigherIsBetter,
                },
            ];
        }

        self.state.segments.insert(0, new_head);
        let mut events = Vec::new();

        if new_head.x == self.state.food.x && new_head.y == self.state.food.y {
            // Eating keeps the tail, so the snake grows by one; special
            // food owes one more segment via pending_growth.
            let special = self.state.food.special;
            self.state.score += if special {
                self.cfg.special_food_score
            } else {
                self.cfg.food_score
            };
            if special {
                self.state.pending_growth += 1;
            }
            events.push(GameEvent::FoodEaten {
                tick,
                x: new_head.x,
                y: new_head.y,
                special,
                score: self.state.score,
            });

            let food = Self::spawn_food(&self.cfg, &self.state.segments, rng);
            self.state.food = food;
            events.push(GameEvent::FoodSpawned {
                tick,
                x: food.x,
                y: food.y,
                special: food.special,
            });

            let next_interval = self
                .state
                .tick_interval_ms
                .saturating_sub(self.cfg.interval_step_ms)
                .max(self.cfg.min_interval_ms);
            if next_interval != self.state.tick_interval_ms {
                self.state.tick_interval_ms = next_interval;
                events.push(GameEvent::SpeedIncreased {
                    tick,
                    interval_ms: next_interval,
                });
            }
        } else if self.state.pending_growth > 0 {
            self.state.pending_growth -= 1;
        } else {
            self.state.segments.pop();
        }

        log::debug!(
            "tick={tick} snake: head=({},{}) len={} score={}",
            new_head.x,
            new_head.y,
            self.state.segments.len(),
            self.state.score
        );
        events
    }
}

impl ArcadeGame for SnakeGame {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn apply(
        &mut self,
        tick: Tick,
        command: &GameCommand,
        rng: &mut GameRng,
    ) -> ArcadeResult<Vec<GameEvent>> {
        let events = match command {
            GameCommand::Start => {
                if self.state.phase == SnakePhase::Ready {
                    self.change_phase(tick, SnakePhase::Running)
                } else {
                    vec![]
                }
            }
            GameCommand::Pause => {
                if self.state.phase == SnakePhase::Running {
                    self.change_phase(tick, SnakePhase::Paused)
                } else {
                    vec![]
                }
            }
            GameCommand::Resume => {
                if self.state.phase == SnakePhase::Paused {
                    self.change_phase(tick, SnakePhase::Running)
                } else {
                    vec![]
                }
            }
            GameCommand::Reset => {
                self.state = Self::initial_state(&self.cfg, rng);
                self.change_phase(tick, SnakePhase::Ready)
            }
            GameCommand::SetDirection { direction } => self.set_direction(tick, *direction),
            other => {
                return Err(ArcadeError::CommandNotSupported {
                    game: self.kind().name(),
                    command: other.type_name().to_string(),
                })
            }
        };
        Ok(events)
    }

    fn tick(&mut self, tick: Tick, rng: &mut GameRng) -> ArcadeResult<Vec<GameEvent>> {
        // Ready, Paused and GameOver hold still; score and layout stay
        // frozen for the host to render.
        if self.state.phase != SnakePhase::Running {
            return Ok(vec![]);
        }
        Ok(self.step(tick, rng))
    }

    fn state(&self) -> ArcadeResult<serde_json::Value> {
        Ok(serde_json::to_value(&self.state)?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
