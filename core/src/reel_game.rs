//! Weighted slot reel engine.
//!
//! Three reels by three rows. Every spin resamples all nine cells from
//! the theme's weighted symbol table; only the middle row is a payline.

use crate::{
    command::GameCommand,
    config::{SlotConfig, SlotThemeConfig},
    error::{ArcadeError, ArcadeResult},
    event::GameEvent,
    game::ArcadeGame,
    rng::{GameKind, GameRng},
    types::Tick,
};
use serde::{Deserialize, Serialize};

/// Symbol identifier, stable within a theme's config.
pub type SymbolId = u8;

pub const REELS: usize = 3;
pub const ROWS: usize = 3;
/// The middle row — the only row evaluated for wins.
pub const PAYLINE_ROW: usize = 1;

/// Flattened sampling table: each symbol id appears `weight` times, so
/// one uniform index draw selects a symbol with probability
/// weight / total_weight.
#[derive(Debug, Clone)]
pub struct WeightedSymbolTable {
    slots: Vec<SymbolId>,
    bonus: SymbolId,
}

impl WeightedSymbolTable {
    pub fn from_theme(theme: &SlotThemeConfig) -> Self {
        assert!(
            !theme.symbols.is_empty(),
            "theme '{}' has no symbols",
            theme.id
        );
        let mut slots = Vec::new();
        for symbol in &theme.symbols {
            for _ in 0..symbol.weight {
                slots.push(symbol.id);
            }
        }
        assert!(!slots.is_empty(), "theme '{}' has zero total weight", theme.id);
        // The last symbol in the theme is its bonus symbol.
        let bonus = theme.symbols[theme.symbols.len() - 1].id;
        Self { slots, bonus }
    }

    pub fn sample(&self, rng: &mut GameRng) -> SymbolId {
        self.slots[rng.next_index(self.slots.len())]
    }

    pub fn bonus_symbol(&self) -> SymbolId {
        self.bonus
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Running per-session spin statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpinStats {
    pub spins: u64,
    pub hits: u64,
    pub total_bet: f64,
    pub total_won: f64,
}

impl SpinStats {
    fn record(&mut self, bet: f64, win: f64) {
        self.spins += 1;
        self.total_bet += bet;
        self.total_won += win;
        if win > 0.0 {
            self.hits += 1;
        }
    }

    /// Return-to-player so far: total won over total bet.
    pub fn rtp(&self) -> f64 {
        if self.total_bet == 0.0 {
            return 0.0;
        }
        self.total_won / self.total_bet
    }

    /// Fraction of spins that paid anything.
    pub fn hit_rate(&self) -> f64 {
        if self.spins == 0 {
            return 0.0;
        }
        self.hits as f64 / self.spins as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelState {
    /// reels[reel][row], resampled in full on every spin.
    pub reels: [[SymbolId; ROWS]; REELS],
    pub credits: f64,
    pub bet: i64,
    pub auto_play: bool,
    pub last_win: f64,
    pub stats: SpinStats,
}

impl ReelState {
    pub fn payline(&self) -> [SymbolId; REELS] {
        [
            self.reels[0][PAYLINE_ROW],
            self.reels[1][PAYLINE_ROW],
            self.reels[2][PAYLINE_ROW],
        ]
    }
}

/// Evaluate a payline. Three equal symbols beat an adjacent pair; the
/// split pair [A, B, A] deliberately pays nothing.
fn evaluate_payline(payline: &[SymbolId; REELS]) -> Option<(SymbolId, u8)> {
    if payline[0] == payline[1] && payline[1] == payline[2] {
        Some((payline[0], 3))
    } else if payline[0] == payline[1] {
        Some((payline[0], 2))
    } else if payline[1] == payline[2] {
        Some((payline[1], 2))
    } else {
        None
    }
}

pub struct ReelGame {
    cfg: SlotConfig,
    theme: SlotThemeConfig,
    table: WeightedSymbolTable,
    pub state: ReelState,
}

impl ReelGame {
    pub fn new(
        cfg: &SlotConfig,
        theme_id: &str,
        initial_credits: f64,
        rng: &mut GameRng,
    ) -> ArcadeResult<Self> {
        let theme = cfg
            .theme(theme_id)
            .ok_or_else(|| ArcadeError::UnknownTheme {
                theme: theme_id.to_string(),
            })?
            .clone();
        let table = WeightedSymbolTable::from_theme(&theme);
        let mut state = ReelState {
            reels: [[0; ROWS]; REELS],
            credits: initial_credits,
            bet: cfg.min_bet,
            auto_play: false,
            last_win: 0.0,
            stats: SpinStats::default(),
        };
        Self::fill_reels(&mut state, &table, rng);
        Ok(Self {
            cfg: cfg.clone(),
            theme,
            table,
            state,
        })
    }

    pub fn theme_id(&self) -> &str {
        &self.theme.id
    }

    fn payout_value(&self, symbol: SymbolId) -> f64 {
        self.theme
            .symbols
            .iter()
            .find(|s| s.id == symbol)
            .map(|s| s.payout_value)
            .unwrap_or(0.0)
    }

    /// Draw order contract: nine cells reel-by-reel, top to bottom.
    fn fill_reels(state: &mut ReelState, table: &WeightedSymbolTable, rng: &mut GameRng) {
        for reel in 0..REELS {
            for row in 0..ROWS {
                state.reels[reel][row] = table.sample(rng);
            }
        }
    }

    fn spin(&mut self, tick: Tick, rng: &mut GameRng) -> ArcadeResult<Vec<GameEvent>> {
        let bet = self.state.bet as f64;
        if self.state.credits < bet {
            return Err(ArcadeError::InsufficientCredits {
                required: bet,
                available: self.state.credits,
            });
        }
        self.state.credits -= bet;

        // Draws happen in a fixed order: the nine grid cells, then the
        // bonus trigger (only when a bonus symbol landed on the
        // payline), then the bonus multiplier (only when triggered).
        Self::fill_reels(&mut self.state, &self.table, rng);
        let payline = self.state.payline();

        let natural = evaluate_payline(&payline);
        let mut win = 0.0;
        let mut detail: Option<GameEvent> = None;

        if payline.contains(&self.table.bonus_symbol()) && rng.chance(self.cfg.bonus_chance) {
            // The bonus round replaces whatever the payline would have
            // paid, even a jackpot line.
            let multiplier =
                rng.next_range_i64(self.cfg.bonus_multiplier_min, self.cfg.bonus_multiplier_max);
            win = bet * multiplier as f64 * self.cfg.bonus_payout_multiplier;
            detail = Some(GameEvent::BonusRoundWon {
                tick,
                multiplier,
                payout: win,
            });
        } else if let Some((symbol, count)) = natural {
            let line_multiplier = match count {
                3 => self.cfg.three_of_a_kind_multiplier,
                _ => self.cfg.two_of_a_kind_multiplier,
            };
            win = bet * self.payout_value(symbol) * line_multiplier;
            if win > 0.0 {
                detail = Some(GameEvent::PaylineHit {
                    tick,
                    symbol,
                    count,
                    payout: win,
                });
            }
        }

        self.state.credits += win;
        self.state.last_win = win;
        self.state.stats.record(bet, win);

        log::debug!(
            "tick={tick} slot: payline={payline:?} win={win:.2} credits={:.2}",
            self.state.credits
        );

        let mut events = vec![GameEvent::ReelsSpun {
            tick,
            bet: self.state.bet,
            payline: payline.to_vec(),
            credits: self.state.credits,
        }];
        events.extend(detail);
        Ok(events)
    }

    fn adjust_bet(&mut self, tick: Tick, delta: i64) -> Vec<GameEvent> {
        let next = self.state.bet + delta;
        if next < self.cfg.min_bet || next > self.cfg.max_bet {
            // Out-of-range adjustments are silent no-ops.
            return vec![];
        }
        self.state.bet = next;
        vec![GameEvent::BetChanged { tick, bet: next }]
    }

    fn set_auto_play(&mut self, tick: Tick, enabled: bool) -> Vec<GameEvent> {
        if self.state.auto_play == enabled {
            return vec![];
        }
        self.state.auto_play = enabled;
        vec![GameEvent::AutoPlayChanged {
            tick,
            enabled,
            reason: "requested".into(),
        }]
    }
}

impl ArcadeGame for ReelGame {
    fn kind(&self) -> GameKind {
        GameKind::Slot
    }

    fn apply(
        &mut self,
        tick: Tick,
        command: &GameCommand,
        rng: &mut GameRng,
    ) -> ArcadeResult<Vec<GameEvent>> {
        match command {
            GameCommand::Spin => self.spin(tick, rng),
            GameCommand::AdjustBet { delta } => Ok(self.adjust_bet(tick, *delta)),
            GameCommand::SetAutoPlay { enabled } => Ok(self.set_auto_play(tick, *enabled)),
            other => Err(ArcadeError::CommandNotSupported {
                game: self.kind().name(),
                command: other.type_name().to_string(),
            }),
        }
    }

    fn tick(&mut self, tick: Tick, rng: &mut GameRng) -> ArcadeResult<Vec<GameEvent>> {
        // Auto-play: one spin per heartbeat while the flag is set and
        // credits cover the bet; flips itself off when they no longer do.
        if !self.state.auto_play {
            return Ok(vec![]);
        }
        if self.state.credits < self.state.bet as f64 {
            self.state.auto_play = false;
            return Ok(vec![GameEvent::AutoPlayChanged {
                tick,
                enabled: false,
                reason: "insufficient_credits".into(),
            }]);
        }
        self.spin(tick, rng)
    }

    fn state(&self) -> ArcadeResult<serde_json::Value> {
        Ok(serde_json::to_value(&self.state)?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
