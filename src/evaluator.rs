use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// Floor below which an ease factor never drops.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// The slice of a schedule record the evaluators operate on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SrsState {
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
}

/// Recall signal submitted with a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSignal {
    /// Graded recall quality, 0 (blackout) through 5 (perfect).
    Quality(u8),
    Remembered,
    Forgot,
}

impl ReviewSignal {
    pub fn is_success(self) -> bool {
        match self {
            ReviewSignal::Quality(q) => q >= 3,
            ReviewSignal::Remembered => true,
            ReviewSignal::Forgot => false,
        }
    }
}

/// Result of evaluating one review against the current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub state: SrsState,
    pub success: bool,
}

/// Pure mapping from a recall signal and current state to the next state.
/// The two variants share this seam so the same property checks run against
/// both; their ease-adjustment and minimum-interval rules genuinely differ
/// and are never merged.
pub trait ReviewOutcomeEvaluator: Sync {
    fn evaluate(&self, signal: ReviewSignal, state: &SrsState)
    -> Result<Evaluation, SchedulerError>;
}

/// Classical SM-2: the ease penalty scales with how bad the miss was, and is
/// applied on every review, failed or not.
pub struct GradedSm2;

impl ReviewOutcomeEvaluator for GradedSm2 {
    fn evaluate(
        &self,
        signal: ReviewSignal,
        state: &SrsState,
    ) -> Result<Evaluation, SchedulerError> {
        let quality = match signal {
            ReviewSignal::Quality(q) if q <= 5 => q,
            ReviewSignal::Quality(q) => {
                return Err(SchedulerError::Validation(format!(
                    "recall quality must be between 0 and 5, got {q}"
                )));
            }
            ReviewSignal::Remembered | ReviewSignal::Forgot => {
                return Err(SchedulerError::Validation(
                    "the graded track requires a 0-5 quality signal".into(),
                ));
            }
        };

        let miss = f64::from(5 - quality);
        let ease_factor =
            (state.ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR);

        if quality < 3 {
            return Ok(Evaluation {
                state: SrsState {
                    ease_factor,
                    interval_days: 0,
                    repetitions: 0,
                },
                success: false,
            });
        }

        let repetitions = state.repetitions + 1;
        let interval_days = match repetitions {
            1 => 1,
            2 => 6,
            _ => (f64::from(state.interval_days) * ease_factor).round() as i32,
        };

        Ok(Evaluation {
            state: SrsState {
                ease_factor,
                interval_days,
                repetitions,
            },
            success: true,
        })
    }
}

/// Binary knew-it/forgot-it variant for the drill loop: a forgotten item
/// keeps its ease and comes back in one day, a remembered item earns a flat
/// +0.1 ease. Interval growth uses the ease in effect before that increment.
pub struct BinarySm2;

impl ReviewOutcomeEvaluator for BinarySm2 {
    fn evaluate(
        &self,
        signal: ReviewSignal,
        state: &SrsState,
    ) -> Result<Evaluation, SchedulerError> {
        match signal {
            ReviewSignal::Quality(_) => Err(SchedulerError::Validation(
                "the binary track takes forgot/remembered, not a graded quality".into(),
            )),
            ReviewSignal::Forgot => Ok(Evaluation {
                state: SrsState {
                    ease_factor: state.ease_factor,
                    interval_days: 1,
                    repetitions: 0,
                },
                success: false,
            }),
            ReviewSignal::Remembered => {
                let repetitions = state.repetitions + 1;
                let interval_days = match repetitions {
                    1 => 1,
                    2 => 3,
                    _ => (f64::from(state.interval_days) * state.ease_factor).round() as i32,
                };
                let ease_factor = (state.ease_factor + 0.1).max(MIN_EASE_FACTOR);

                Ok(Evaluation {
                    state: SrsState {
                        ease_factor,
                        interval_days,
                        repetitions,
                    },
                    success: true,
                })
            }
        }
    }
}
