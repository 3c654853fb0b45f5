//! Session eco score with duplicate suppression
//!
//! The score changes only when an input is seen for the first time since
//! the previous input of the same kind. Resubmitting the identical input is
//! reported back as not applied and leaves the score alone.

use serde::Serialize;

/// Points for a new (non-duplicate) energy advisory submission
pub const ENERGY_QUERY_POINTS: i64 = 5;

/// Score at which the progress indicator is full
pub const PROGRESS_SCALE: f64 = 100.0;

/// Kinds of scored events, each with its own last-seen key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Upload,
    EnergyQuery,
}

/// Result of [`ScoreTracker::apply_event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreUpdate {
    /// False when the input matched the last-seen key (duplicate)
    pub applied: bool,
    pub score: i64,
}

/// Running score plus the last-seen input per event kind
#[derive(Debug, Clone, Default)]
pub struct ScoreTracker {
    score: i64,
    last_upload: Option<String>,
    last_energy_query: Option<String>,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Last-seen input key for an event kind
    pub fn last_key(&self, kind: EventKind) -> Option<&str> {
        match kind {
            EventKind::Upload => self.last_upload.as_deref(),
            EventKind::EnergyQuery => self.last_energy_query.as_deref(),
        }
    }

    /// Apply `delta` unless `input_key` repeats the last input of this kind
    pub fn apply_event(&mut self, kind: EventKind, input_key: &str, delta: i64) -> ScoreUpdate {
        let last = match kind {
            EventKind::Upload => &mut self.last_upload,
            EventKind::EnergyQuery => &mut self.last_energy_query,
        };

        if last.as_deref() == Some(input_key) {
            return ScoreUpdate {
                applied: false,
                score: self.score,
            };
        }

        *last = Some(input_key.to_string());
        self.score += delta;
        ScoreUpdate {
            applied: true,
            score: self.score,
        }
    }

    pub fn progress(&self) -> f64 {
        progress_fraction(self.score)
    }
}

/// Progress bar fill for a score, clamped to [0, 1]
pub fn progress_fraction(score: i64) -> f64 {
    (score as f64 / PROGRESS_SCALE).clamp(0.0, 1.0)
}
