//! Sliding puzzle engine.
//!
//! An N×N board holding N²−1 numbered tiles and one empty cell.
//! Shuffling is a random walk of legal moves starting from the solved
//! layout, so every shuffled board is solvable by construction — no
//! parity check needed.

use crate::{
    command::GameCommand,
    config::PuzzleConfig,
    error::{ArcadeError, ArcadeResult},
    event::{GameEvent, ScoreDirection},
    game::ArcadeGame,
    rng::{GameKind, GameRng},
    types::Tick,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub fn manhattan(&self, other: &GridPos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleTile {
    pub value: u16,
    pub current: GridPos,
    pub target: GridPos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleBoard {
    pub size: usize,
    pub tiles: Vec<PuzzleTile>,
    pub empty: GridPos,
    pub moves: u64,
    /// Set by shuffle, cleared on solve. Guards score submission so an
    /// untouched solved board cannot post a zero-move record.
    pub solve_armed: bool,
}

impl PuzzleBoard {
    /// The solved layout: tiles 1..N²−1 in row-major order, empty cell
    /// bottom-right.
    pub fn solved(size: usize) -> Self {
        assert!(size >= 2, "grid must be at least 2x2");
        let mut tiles = Vec::with_capacity(size * size - 1);
        for row in 0..size {
            for col in 0..size {
                if row == size - 1 && col == size - 1 {
                    continue;
                }
                let pos = GridPos { row, col };
                tiles.push(PuzzleTile {
                    value: (row * size + col + 1) as u16,
                    current: pos,
                    target: pos,
                });
            }
        }
        Self {
            size,
            tiles,
            empty: GridPos {
                row: size - 1,
                col: size - 1,
            },
            moves: 0,
            solve_armed: false,
        }
    }

    pub fn tile_at(&self, pos: GridPos) -> Option<&PuzzleTile> {
        self.tiles.iter().find(|t| t.current == pos)
    }

    pub fn is_solved(&self) -> bool {
        self.tiles.iter().all(|t| t.current == t.target)
    }

    fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Cells orthogonally adjacent to the empty cell, in a fixed
    /// up/down/left/right order so shuffle draws stay deterministic.
    fn neighbours_of_empty(&self) -> Vec<GridPos> {
        let GridPos { row, col } = self.empty;
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.push(GridPos { row: row - 1, col });
        }
        if row + 1 < self.size {
            out.push(GridPos { row: row + 1, col });
        }
        if col > 0 {
            out.push(GridPos { row, col: col - 1 });
        }
        if col + 1 < self.size {
            out.push(GridPos { row, col: col + 1 });
        }
        out
    }

    /// Slide the tile at `from` into the empty cell. Callers must have
    /// checked adjacency.
    fn swap_into_empty(&mut self, from: GridPos) {
        debug_assert_eq!(from.manhattan(&self.empty), 1, "illegal swap");
        let empty = self.empty;
        let tile = self
            .tiles
            .iter_mut()
            .find(|t| t.current == from)
            .expect("a legal neighbour of the empty cell holds a tile");
        tile.current = empty;
        self.empty = from;
    }

    /// Random walk of legal moves. Returns the walk as the sequence of
    /// positions slid from, oldest first, so tests can invert it.
    pub fn shuffle(&mut self, steps: u64, rng: &mut GameRng) -> Vec<GridPos> {
        let mut trace = Vec::with_capacity(steps as usize);
        for _ in 0..steps {
            let neighbours = self.neighbours_of_empty();
            let from = neighbours[rng.next_index(neighbours.len())];
            self.swap_into_empty(from);
            trace.push(from);
        }
        trace
    }

    /// Try to slide the tile at `target`. Moves that are off the board
    /// or not adjacent to the empty cell return false and change
    /// nothing — not even the move counter.
    pub fn attempt_move(&mut self, target: GridPos) -> bool {
        if !self.in_bounds(target.row, target.col) {
            return false;
        }
        if target.manhattan(&self.empty) != 1 {
            return false;
        }
        self.swap_into_empty(target);
        self.moves += 1;
        true
    }
}

pub struct PuzzleGame {
    shuffle_steps: u64,
    score_key: String,
    pub state: PuzzleBoard,
}

impl PuzzleGame {
    /// Requested sizes outside the configured bounds are clamped, not
    /// rejected; the host learns the real size from PuzzleShuffled.
    pub fn new(cfg: &PuzzleConfig, grid_size: usize) -> Self {
        let size = grid_size.clamp(cfg.min_grid_size, cfg.max_grid_size);
        Self {
            shuffle_steps: cfg.shuffle_factor * (size * size) as u64,
            score_key: format!("puzzle-{size}x{size}"),
            state: PuzzleBoard::solved(size),
        }
    }

    fn shuffle(&mut self, tick: Tick, rng: &mut GameRng) -> Vec<GameEvent> {
        self.state.shuffle(self.shuffle_steps, rng);
        self.state.moves = 0;
        self.state.solve_armed = true;
        log::debug!(
            "tick={tick} puzzle: shuffled {}x{} over {} steps",
            self.state.size,
            self.state.size,
            self.shuffle_steps
        );
        vec![GameEvent::PuzzleShuffled {
            tick,
            grid_size: self.state.size,
            steps: self.shuffle_steps,
        }]
    }

    fn move_tile(&mut self, tick: Tick, row: usize, col: usize) -> Vec<GameEvent> {
        let target = GridPos { row, col };
        let Some(value) = self.state.tile_at(target).map(|t| t.value) else {
            // The empty cell or an off-board cell; nothing to slide.
            return vec![];
        };
        let destination = self.state.empty;
        if !self.state.attempt_move(target) {
            return vec![];
        }
        let mut events = vec![GameEvent::TileMoved {
            tick,
            value,
            row: destination.row,
            col: destination.col,
            moves: self.state.moves,
        }];
        if self.state.solve_armed && self.state.is_solved() {
            self.state.solve_armed = false;
            log::info!(
                "puzzle solved: {}x{} in {} moves",
                self.state.size,
                self.state.size,
                self.state.moves
            );
            events.push(GameEvent::PuzzleSolved {
                tick,
                moves: self.state.moves,
            });
            events.push(GameEvent::ScoreSubmitted {
                tick,
                key: self.score_key.clone(),
                value: self.state.moves as i64,
                direction: ScoreDirection::LowerIsBetter,
            });
        }
        events
    }
}

impl ArcadeGame for PuzzleGame {
    fn kind(&self) -> GameKind {
        GameKind::Puzzle
    }

    fn apply(
        &mut self,
        tick: Tick,
        command: &GameCommand,
        rng: &mut GameRng,
    ) -> ArcadeResult<Vec<GameEvent>> {
        match command {
            GameCommand::Shuffle => Ok(self.shuffle(tick, rng)),
            GameCommand::MoveTile { row, col } => Ok(self.move_tile(tick, *row, *col)),
            other => Err(ArcadeError::CommandNotSupported {
                game: self.kind().name(),
                command: other.type_name().to_string(),
            }),
        }
    }

    fn tick(&mut self, _tick: Tick, _rng: &mut GameRng) -> ArcadeResult<Vec<GameEvent>> {
        // The puzzle is untimed; the heartbeat passes through.
        Ok(vec![])
    }

    fn state(&self) -> ArcadeResult<serde_json::Value> {
        Ok(serde_json::to_value(&self.state)?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
