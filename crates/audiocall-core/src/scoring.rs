//! Score multiplier and point awards.
//!
//! The multiplier starts at 1.0, grows by 0.1 with every correct answer and
//! shrinks by 0.1 with every mistake, bottoming out at 0.2. It is tracked in
//! tenths so repeated steps never drift below the floor.

use serde::{Deserialize, Serialize};

/// Points awarded for a correct answer at multiplier 1.0.
pub const BASE_POINTS: f64 = 30.0;

const START_TENTHS: u32 = 10;
const FLOOR_TENTHS: u32 = 2;

/// Round a point value to two decimal places.
pub fn round_points(points: f64) -> f64 {
    (points * 100.0).round() / 100.0
}

/// Session-scoped scoring state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringState {
    multiplier_tenths: u32,
    score: f64,
    base_points: f64,
}

impl Default for ScoringState {
    fn default() -> Self {
        Self::new(BASE_POINTS)
    }
}

impl ScoringState {
    /// Fresh state with multiplier 1.0. Negative base points are treated as zero.
    pub fn new(base_points: f64) -> Self {
        Self {
            multiplier_tenths: START_TENTHS,
            score: 0.0,
            base_points: base_points.max(0.0),
        }
    }

    pub fn multiplier(&self) -> f64 {
        f64::from(self.multiplier_tenths) / 10.0
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Points the next correct answer would earn.
    pub fn award(&self) -> f64 {
        round_points(self.base_points * self.multiplier())
    }

    #[must_use]
    pub fn on_correct(self) -> Self {
        Self {
            score: self.score + self.award(),
            multiplier_tenths: self.multiplier_tenths.saturating_add(1),
            ..self
        }
    }

    #[must_use]
    pub fn on_incorrect(self) -> Self {
        Self {
            multiplier_tenths: self
                .multiplier_tenths
                .saturating_sub(1)
                .max(FLOOR_TENTHS),
            ..self
        }
    }
}
