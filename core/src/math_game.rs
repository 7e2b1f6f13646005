//! Timed mental-arithmetic engine.
//!
//! Questions are constructed backwards so answers are always whole and
//! never negative: division draws divisor and quotient first, then
//! multiplies; subtraction swaps operands when needed.

use crate::{
    command::GameCommand,
    config::{MathConfig, MathTierConfig},
    error::{ArcadeError, ArcadeResult},
    event::{GameEvent, ScoreDirection},
    game::ArcadeGame,
    rng::{GameKind, GameRng},
    types::Tick,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathOperation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Mixed,
}

impl MathOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::Mixed => "mixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "addition" => Some(Self::Addition),
            "subtraction" => Some(Self::Subtraction),
            "multiplication" => Some(Self::Multiplication),
            "division" => Some(Self::Division),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// The operator actually drawn for one question. Serialized as the
/// arithmetic sign so hosts can render "a op b" directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl MathOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathQuestion {
    pub operand_a: i64,
    pub operand_b: i64,
    pub operator: MathOperator,
    pub answer: i64,
}

/// Build one question for the tier.
///
/// Draw order contract: the operator first (mixed mode only), then the
/// operands left to right. Division draws divisor then quotient and
/// presents their product.
pub fn generate_question(
    tier: &MathTierConfig,
    operation: MathOperation,
    rng: &mut GameRng,
) -> MathQuestion {
    let operator = match operation {
        MathOperation::Addition => MathOperator::Add,
        MathOperation::Subtraction => MathOperator::Sub,
        MathOperation::Multiplication => MathOperator::Mul,
        MathOperation::Division => MathOperator::Div,
        MathOperation::Mixed => [
            MathOperator::Add,
            MathOperator::Sub,
            MathOperator::Mul,
            MathOperator::Div,
        ][rng.next_index(4)],
    };
    match operator {
        MathOperator::Add => {
            let a = rng.next_range_i64(tier.operand_min, tier.operand_max);
            let b = rng.next_range_i64(tier.operand_min, tier.operand_max);
            MathQuestion {
                operand_a: a,
                operand_b: b,
                operator,
                answer: a + b,
            }
        }
        MathOperator::Sub => {
            let a = rng.next_range_i64(tier.operand_min, tier.operand_max);
            let b = rng.next_range_i64(tier.operand_min, tier.operand_max);
            // Larger operand first; the answer may be zero, never
            // negative.
            let (a, b) = if b > a { (b, a) } else { (a, b) };
            MathQuestion {
                operand_a: a,
                operand_b: b,
                operator,
                answer: a - b,
            }
        }
        MathOperator::Mul => {
            let a = rng.next_range_i64(tier.mul_min, tier.mul_max);
            let b = rng.next_range_i64(tier.mul_min, tier.mul_max);
            MathQuestion {
                operand_a: a,
                operand_b: b,
                operator,
                answer: a * b,
            }
        }
        MathOperator::Div => {
            let divisor = rng.next_range_i64(tier.div_min, tier.div_max);
            let quotient = rng.next_range_i64(tier.div_min, tier.div_max);
            MathQuestion {
                operand_a: divisor * quotient,
                operand_b: divisor,
                operator,
                answer: quotient,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathPhase {
    Running,
    Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathSessionState {
    pub phase: MathPhase,
    pub difficulty: Difficulty,
    pub operation: MathOperation,
    pub score: i64,
    pub streak: u32,
    /// Seconds left; one host tick is one second.
    pub time_remaining: u32,
    pub questions_answered: u32,
    pub question: MathQuestion,
}

pub struct MathGame {
    cfg: MathConfig,
    tier: MathTierConfig,
    score_key: String,
    pub state: MathSessionState,
}

impl MathGame {
    pub fn new(
        cfg: &MathConfig,
        difficulty: Difficulty,
        operation: MathOperation,
        rng: &mut GameRng,
    ) -> Self {
        let tier = cfg.tier(difficulty).clone();
        let question = generate_question(&tier, operation, rng);
        Self {
            cfg: cfg.clone(),
            tier,
            score_key: format!("math-{}-{}", difficulty.name(), operation.name()),
            state: MathSessionState {
                phase: MathPhase::Running,
                difficulty,
                operation,
                score: 0,
                streak: 0,
                time_remaining: cfg.session_seconds,
                questions_answered: 0,
                question,
            },
        }
    }

    fn submit_answer(
        &mut self,
        tick: Tick,
        input: &str,
        rng: &mut GameRng,
    ) -> ArcadeResult<Vec<GameEvent>> {
        if self.state.phase == MathPhase::Ended {
            // Answers after the bell change nothing.
            return Ok(vec![]);
        }
        let answer: i64 = input
            .trim()
            .parse()
            .map_err(|_| ArcadeError::InvalidInput {
                raw: input.to_string(),
            })?;

        let mut events = Vec::new();
        if answer == self.state.question.answer {
            self.state.streak += 1;
            let mut points = self.tier.base_points;
            if self.state.streak >= self.cfg.streak_bonus_threshold {
                points *= 2;
            }
            self.state.score += points;
            self.state.time_remaining = (self.state.time_remaining
                + self.cfg.time_bonus_seconds)
                .min(self.cfg.session_seconds);
            events.push(GameEvent::AnswerAccepted {
                tick,
                answer,
                points,
                streak: self.state.streak,
                time_remaining: self.state.time_remaining,
            });
            if self.state.streak % self.cfg.streak_bonus_threshold == 0 {
                events.push(GameEvent::StreakMilestone {
                    tick,
                    streak: self.state.streak,
                });
            }
        } else {
            events.push(GameEvent::AnswerRejected {
                tick,
                given: answer,
                correct: self.state.question.answer,
            });
            self.state.streak = 0;
        }

        self.state.questions_answered += 1;
        self.state.question = generate_question(&self.tier, self.state.operation, rng);
        events.push(GameEvent::QuestionPosed {
            tick,
            number: self.state.questions_answered + 1,
            operand_a: self.state.question.operand_a,
            operand_b: self.state.question.operand_b,
            operator: self.state.question.operator,
        });

        log::debug!(
            "tick={tick} math: score={} streak={} time={}s",
            self.state.score,
            self.state.streak,
            self.state.time_remaining
        );
        Ok(events)
    }
}

impl ArcadeGame for MathGame {
    fn kind(&self) -> GameKind {
        GameKind::Math
    }

    fn apply(
        &mut self,
        tick: Tick,
        command: &GameCommand,
        rng: &mut GameRng,
    ) -> ArcadeResult<Vec<GameEvent>> {
        match command {
            GameCommand::SubmitAnswer { input } => self.submit_answer(tick, input, rng),
            other => Err(ArcadeError::CommandNotSupported {
                game: self.kind().name(),
                command: other.type_name().to_string(),
            }),
        }
    }

    fn tick(&mut self, tick: Tick, _rng: &mut GameRng) -> ArcadeResult<Vec<GameEvent>> {
        if self.state.phase == MathPhase::Ended {
            return Ok(vec![]);
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        if self.state.time_remaining > 0 {
            return Ok(vec![]);
        }
        self.state.phase = MathPhase::Ended;
        log::info!(
            "math session over: score={} answered={}",
            self.state.score,
            self.state.questions_answered
        );
        Ok(vec![
            GameEvent::MathSessionEnded {
                tick,
                score: self.state.score,
                questions_answered: self.state.questions_answered,
            },
            GameEvent::ScoreSubmitted {
                tick,
                key: self.score_key.clone(),
                value: self.state.score,
                direction: ScoreDirection::HigherIsBetter,
            },
        ])
    }

    fn state(&self) -> ArcadeResult<serde_json::Value> {
        Ok(serde_json::to_value(&self.state)?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
