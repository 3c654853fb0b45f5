//! Per-session context
//!
//! One `SessionContext` per browser session: the eco score tracker, the tip
//! chosen when the session started, and activity timestamps. Operations
//! that fail leave the context untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::advisory::{energy_query_key, recommend, validate_energy_query};
use crate::classifier::{Classification, WasteLabel};
use crate::score::{progress_fraction, EventKind, ScoreTracker, ENERGY_QUERY_POINTS};
use crate::Result;

pub const DUPLICATE_UPLOAD_NOTICE: &str = "This file was already uploaded, score not updated.";

pub const DUPLICATE_ENERGY_NOTICE: &str =
    "You have already submitted this input. Please change the input to get new recommendations.";

/// Score display state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSnapshot {
    pub score: i64,
    /// Progress bar fill in [0, 1]
    pub progress: f64,
    pub daily_tip: Option<String>,
}

/// Result of recording a classified upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub file_name: String,
    pub label: WasteLabel,
    pub label_text: String,
    pub probability: f32,
    pub recommendation: String,
    pub applied: bool,
    pub score: i64,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Result of an energy advisory submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyOutcome {
    pub suggestions: Vec<String>,
    pub applied: bool,
    pub score: i64,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    id: Uuid,
    tracker: ScoreTracker,
    daily_tip: Option<String>,
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(id: Uuid, daily_tip: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            tracker: ScoreTracker::new(),
            daily_tip,
            created_at: now,
            last_seen: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn score(&self) -> i64 {
        self.tracker.score()
    }

    pub fn tracker(&self) -> &ScoreTracker {
        &self.tracker
    }

    pub fn daily_tip(&self) -> Option<&str> {
        self.daily_tip.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    /// Mark activity at `now`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            score: self.tracker.score(),
            progress: self.tracker.progress(),
            daily_tip: self.daily_tip.clone(),
        }
    }

    /// Score a classified upload, keyed on its file name
    ///
    /// The label is always reported; only the scoring is skipped when the
    /// same file name was the last upload.
    pub fn record_classification(
        &mut self,
        file_name: &str,
        classification: Classification,
    ) -> UploadOutcome {
        let label = classification.label;
        let update = self
            .tracker
            .apply_event(EventKind::Upload, file_name, label.score_delta());

        UploadOutcome {
            file_name: file_name.to_string(),
            label,
            label_text: label.display_name().to_string(),
            probability: classification.probability,
            recommendation: label.disposal_recommendation().to_string(),
            applied: update.applied,
            score: update.score,
            progress: progress_fraction(update.score),
            notice: (!update.applied).then(|| DUPLICATE_UPLOAD_NOTICE.to_string()),
        }
    }

    /// Validate, compute advisories and score an energy query
    pub fn submit_energy_query(&mut self, appliance: &str, hours: f64) -> Result<EnergyOutcome> {
        validate_energy_query(appliance, hours)?;

        let suggestions = recommend(appliance, hours);
        let key = energy_query_key(appliance, hours);
        let update = self
            .tracker
            .apply_event(EventKind::EnergyQuery, &key, ENERGY_QUERY_POINTS);

        Ok(EnergyOutcome {
            suggestions,
            applied: update.applied,
            score: update.score,
            progress: progress_fraction(update.score),
            notice: (!update.applied).then(|| DUPLICATE_ENERGY_NOTICE.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::DEFAULT_ADVICE;
    use crate::Error;

    fn session() -> SessionContext {
        SessionContext::new(Uuid::new_v4(), Some("Unplug idle chargers".to_string()))
    }

    fn classified(label: WasteLabel) -> Classification {
        let probability = match label {
            WasteLabel::Recyclable => 0.2,
            WasteLabel::NonRecyclable => 0.9,
        };
        Classification { label, probability }
    }

    #[test]
    fn test_new_session_snapshot() {
        let ctx = session();
        let snapshot = ctx.snapshot();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.progress, 0.0);
        assert_eq!(snapshot.daily_tip.as_deref(), Some("Unplug idle chargers"));
        assert_eq!(ctx.created_at(), ctx.last_seen());
    }

    #[test]
    fn test_upload_scoring_and_duplicates() {
        let mut ctx = session();

        let first = ctx.record_classification("imgA.jpg", classified(WasteLabel::Recyclable));
        assert!(first.applied);
        assert_eq!(first.score, 10);
        assert_eq!(first.label_text, "Recyclable");
        assert!(first.notice.is_none());

        let repeat = ctx.record_classification("imgA.jpg", classified(WasteLabel::Recyclable));
        assert!(!repeat.applied);
        assert_eq!(repeat.score, 10);
        assert_eq!(repeat.label, WasteLabel::Recyclable);
        assert_eq!(repeat.notice.as_deref(), Some(DUPLICATE_UPLOAD_NOTICE));

        let other = ctx.record_classification("imgB.png", classified(WasteLabel::NonRecyclable));
        assert!(other.applied);
        assert_eq!(other.score, 5);
        assert_eq!(other.recommendation, "Dispose this in general waste.");
    }

    #[test]
    fn test_energy_duplicate_still_returns_suggestions() {
        let mut ctx = session();

        let first = ctx.submit_energy_query("Fan", 2.0).unwrap();
        let second = ctx.submit_energy_query("fan", 2.0).unwrap();

        assert_eq!(first.suggestions, second.suggestions);
        assert!(first.applied);
        assert!(!second.applied);
        assert_eq!(second.score, 5);
        assert_eq!(second.notice.as_deref(), Some(DUPLICATE_ENERGY_NOTICE));
    }

    #[test]
    fn test_energy_points_are_flat() {
        let mut ctx = session();
        let outcome = ctx.submit_energy_query("Toaster", 5.0).unwrap();
        assert_eq!(outcome.suggestions, vec![DEFAULT_ADVICE.to_string()]);
        assert_eq!(outcome.score, 5);

        let outcome = ctx.submit_energy_query("Toaster", 6.0).unwrap();
        assert_eq!(outcome.score, 10);
        assert!((outcome.progress - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_query_leaves_state_unchanged() {
        let mut ctx = session();
        ctx.submit_energy_query("Light", 3.0).unwrap();

        let err = ctx.submit_energy_query("", 3.0).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let err = ctx.submit_energy_query("Light", 0.0).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert_eq!(ctx.score(), 5);
        assert_eq!(ctx.tracker().last_key(EventKind::EnergyQuery), Some("light-3.0"));
    }

    #[test]
    fn test_touch_updates_last_seen() {
        let mut ctx = session();
        let later = ctx.created_at() + chrono::Duration::minutes(5);
        ctx.touch(later);
        assert_eq!(ctx.last_seen(), later);
    }
}
