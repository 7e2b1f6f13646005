use crate::math_game::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Slot machine ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSymbolConfig {
    pub id: u8,
    pub label: String,
    pub weight: u32,
    /// Per-symbol payout factor; a 3-of-a-kind win pays
    /// bet * payout_value * three_of_a_kind_multiplier.
    pub payout_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotThemeConfig {
    pub id: String,
    pub label: String,
    /// Ordered: the LAST symbol is the theme's bonus symbol.
    pub symbols: Vec<SlotSymbolConfig>,
}

#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub default_theme: String,
    pub initial_credits: f64,
    pub min_bet: i64,
    pub max_bet: i64,
    pub three_of_a_kind_multiplier: f64,
    pub two_of_a_kind_multiplier: f64,
    /// Probability that a bonus symbol on the payline triggers the
    /// bonus round.
    pub bonus_chance: f64,
    pub bonus_multiplier_min: i64,
    pub bonus_multiplier_max: i64,
    pub bonus_payout_multiplier: f64,
    pub themes: HashMap<String, SlotThemeConfig>,
}

impl SlotConfig {
    pub fn theme(&self, id: &str) -> Option<&SlotThemeConfig> {
        self.themes.get(id)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SlotThemesFile {
    default_theme: String,
    initial_credits: f64,
    min_bet: i64,
    max_bet: i64,
    three_of_a_kind_multiplier: f64,
    two_of_a_kind_multiplier: f64,
    bonus_chance: f64,
    bonus_multiplier_min: i64,
    bonus_multiplier_max: i64,
    bonus_payout_multiplier: f64,
    themes: Vec<SlotThemeConfig>,
}

// ── Sliding puzzle ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub default_grid_size: usize,
    pub min_grid_size: usize,
    pub max_grid_size: usize,
    /// Shuffle walk length = shuffle_factor * grid_size².
    pub shuffle_factor: u64,
}

// ── Snake ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnakeConfig {
    pub grid_width: i32,
    pub grid_height: i32,
    pub initial_length: usize,
    pub initial_interval_ms: u32,
    /// Interval reduction applied on every food eaten.
    pub interval_step_ms: u32,
    pub min_interval_ms: u32,
    pub food_score: i64,
    pub special_food_score: i64,
    pub special_food_chance: f64,
}

// ── Math challenge ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathTierConfig {
    pub difficulty: Difficulty,
    pub base_points: i64,
    pub operand_min: i64,
    pub operand_max: i64,
    pub mul_min: i64,
    pub mul_max: i64,
    pub div_min: i64,
    pub div_max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathConfig {
    pub session_seconds: u32,
    pub time_bonus_seconds: u32,
    /// Doubles points at this streak and marks every multiple of it.
    pub streak_bonus_threshold: u32,
    pub tiers: Vec<MathTierConfig>,
}

impl MathConfig {
    pub fn tier(&self, difficulty: Difficulty) -> &MathTierConfig {
        self.tiers
            .iter()
            .find(|t| t.difficulty == difficulty)
            .expect("validated: tier table covers every difficulty")
    }
}

// ── Top-level config ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ArcadeConfig {
    pub slot: SlotConfig,
    pub puzzle: PuzzleConfig,
    pub snake: SnakeConfig,
    pub math: MathConfig,
}

impl ArcadeConfig {
    /// Load from the data/ directory.
    /// In tests, use ArcadeConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let slot_path = format!("{data_dir}/slot_themes.json");
        let slot_content = std::fs::read_to_string(&slot_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {slot_path}: {e}"))?;
        let slot_file: SlotThemesFile = serde_json::from_str(&slot_content)?;
        let themes = slot_file
            .themes
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        let slot = SlotConfig {
            default_theme: slot_file.default_theme,
            initial_credits: slot_file.initial_credits,
            min_bet: slot_file.min_bet,
            max_bet: slot_file.max_bet,
            three_of_a_kind_multiplier: slot_file.three_of_a_kind_multiplier,
            two_of_a_kind_multiplier: slot_file.two_of_a_kind_multiplier,
            bonus_chance: slot_file.bonus_chance,
            bonus_multiplier_min: slot_file.bonus_multiplier_min,
            bonus_multiplier_max: slot_file.bonus_multiplier_max,
            bonus_payout_multiplier: slot_file.bonus_payout_multiplier,
            themes,
        };

        let puzzle_path = format!("{data_dir}/puzzle.json");
        let puzzle_content = std::fs::read_to_string(&puzzle_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {puzzle_path}: {e}"))?;
        let puzzle: PuzzleConfig = serde_json::from_str(&puzzle_content)?;

        let snake_path = format!("{data_dir}/snake.json");
        let snake_content = std::fs::read_to_string(&snake_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {snake_path}: {e}"))?;
        let snake: SnakeConfig = serde_json::from_str(&snake_content)?;

        let math_path = format!("{data_dir}/math.json");
        let math_content = std::fs::read_to_string(&math_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {math_path}: {e}"))?;
        let math: MathConfig = serde_json::from_str(&math_content)?;

        let config = Self {
            slot,
            puzzle,
            snake,
            math,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that would corrupt play before a session starts.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.slot.themes.is_empty() {
            anyhow::bail!("slot config defines no themes");
        }
        if self.slot.theme(&self.slot.default_theme).is_none() {
            anyhow::bail!("default theme '{}' is not defined", self.slot.default_theme);
        }
        for theme in self.slot.themes.values() {
            if theme.symbols.is_empty() {
                anyhow::bail!("theme '{}' has no symbols", theme.id);
            }
            let total: u32 = theme.symbols.iter().map(|s| s.weight).sum();
            if total == 0 {
                anyhow::bail!("theme '{}' has zero total weight", theme.id);
            }
        }
        if self.slot.min_bet < 1 || self.slot.max_bet < self.slot.min_bet {
            anyhow::bail!(
                "bad bet range [{}, {}]",
                self.slot.min_bet,
                self.slot.max_bet
            );
        }
        if self.slot.bonus_multiplier_min > self.slot.bonus_multiplier_max {
            anyhow::bail!("bad bonus multiplier range");
        }

        if self.puzzle.min_grid_size < 2 {
            anyhow::bail!("puzzle grids below 2x2 have no tiles to slide");
        }
        if self.puzzle.max_grid_size < self.puzzle.min_grid_size
            || self.puzzle.default_grid_size < self.puzzle.min_grid_size
            || self.puzzle.default_grid_size > self.puzzle.max_grid_size
        {
            anyhow::bail!("bad puzzle grid size bounds");
        }
        if self.puzzle.shuffle_factor == 0 {
            anyhow::bail!("shuffle_factor must be at least 1");
        }

        if self.snake.grid_width < 4 || self.snake.grid_height < 4 {
            anyhow::bail!("snake grid too small to play on");
        }
        let area = (self.snake.grid_width * self.snake.grid_height) as usize;
        if self.snake.initial_length == 0 || self.snake.initial_length >= area {
            anyhow::bail!("bad snake initial length {}", self.snake.initial_length);
        }
        if self.snake.min_interval_ms == 0
            || self.snake.min_interval_ms > self.snake.initial_interval_ms
        {
            anyhow::bail!("bad snake interval bounds");
        }

        if self.math.session_seconds == 0 || self.math.streak_bonus_threshold == 0 {
            anyhow::bail!("bad math session parameters");
        }
        for difficulty in [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Expert,
        ] {
            let Some(tier) = self.math.tiers.iter().find(|t| t.difficulty == difficulty) else {
                anyhow::bail!("math tier table is missing {difficulty:?}");
            };
            if tier.base_points < 1 {
                anyhow::bail!("math tier {difficulty:?} has non-positive base points");
            }
            if tier.operand_min < 0
                || tier.operand_min > tier.operand_max
                || tier.mul_min > tier.mul_max
                || tier.div_min < 1
                || tier.div_min > tier.div_max
            {
                anyhow::bail!("math tier {difficulty:?} has a bad operand range");
            }
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let classic = SlotThemeConfig {
            id: "classic".into(),
            label: "Classic".into(),
            symbols: vec![
                SlotSymbolConfig {
                    id: 0,
                    label: "cherry".into(),
                    weight: 30,
                    payout_value: 1.5,
                },
                SlotSymbolConfig {
                    id: 1,
                    label: "lemon".into(),
                    weight: 25,
                    payout_value: 2.0,
                },
                SlotSymbolConfig {
                    id: 2,
                    label: "bell".into(),
                    weight: 20,
                    payout_value: 3.0,
                },
                SlotSymbolConfig {
                    id: 3,
                    label: "seven".into(),
                    weight: 15,
                    payout_value: 5.0,
                },
                SlotSymbolConfig {
                    id: 4,
                    label: "diamond".into(),
                    weight: 10,
                    payout_value: 10.0,
                },
            ],
        };
        let space = SlotThemeConfig {
            id: "space".into(),
            label: "Deep Space".into(),
            symbols: vec![
                SlotSymbolConfig {
                    id: 0,
                    label: "moon".into(),
                    weight: 35,
                    payout_value: 1.0,
                },
                SlotSymbolConfig {
                    id: 1,
                    label: "rocket".into(),
                    weight: 25,
                    payout_value: 2.0,
                },
                SlotSymbolConfig {
                    id: 2,
                    label: "alien".into(),
                    weight: 18,
                    payout_value: 3.0,
                },
                SlotSymbolConfig {
                    id: 3,
                    label: "star".into(),
                    weight: 14,
                    payout_value: 6.0,
                },
                SlotSymbolConfig {
                    id: 4,
                    label: "ufo".into(),
                    weight: 8,
                    payout_value: 12.0,
                },
            ],
        };
        let themes = [classic, space]
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        Self {
            slot: SlotConfig {
                default_theme: "classic".into(),
                initial_credits: 100.0,
                min_bet: 1,
                max_bet: 10,
                three_of_a_kind_multiplier: 5.0,
                two_of_a_kind_multiplier: 2.0,
                bonus_chance: 0.30,
                bonus_multiplier_min: 2,
                bonus_multiplier_max: 10,
                bonus_payout_multiplier: 5.0,
                themes,
            },
            puzzle: PuzzleConfig {
                default_grid_size: 4,
                min_grid_size: 2,
                max_grid_size: 5,
                shuffle_factor: 100,
            },
            snake: SnakeConfig {
                grid_width: 20,
                grid_height: 20,
                initial_length: 3,
                initial_interval_ms: 200,
                interval_step_ms: 10,
                min_interval_ms: 80,
                food_score: 10,
                special_food_score: 25,
                special_food_chance: 0.2,
            },
            math: MathConfig {
                session_seconds: 60,
                time_bonus_seconds: 2,
                streak_bonus_threshold: 5,
                tiers: vec![
                    MathTierConfig {
                        difficulty: Difficulty::Easy,
                        base_points: 1,
                        operand_min: 1,
                        operand_max: 10,
                        mul_min: 1,
                        mul_max: 5,
                        div_min: 1,
                        div_max: 5,
                    },
                    MathTierConfig {
                        difficulty: Difficulty::Medium,
                        base_points: 2,
                        operand_min: 1,
                        operand_max: 25,
                        mul_min: 2,
                        mul_max: 10,
                        div_min: 2,
                        div_max: 9,
                    },
                    MathTierConfig {
                        difficulty: Difficulty::Hard,
                        base_points: 3,
                        operand_min: 10,
                        operand_max: 50,
                        mul_min: 3,
                        mul_max: 12,
                        div_min: 3,
                        div_max: 12,
                    },
                    MathTierConfig {
                        difficulty: Difficulty::Expert,
                        base_points: 5,
                        operand_min: 25,
                        operand_max: 100,
                        mul_min: 5,
                        mul_max: 20,
                        div_min: 5,
                        div_max: 15,
                    },
                ],
            },
        }
    }
}
