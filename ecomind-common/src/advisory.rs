//! Energy advisory rule table
//!
//! Maps an appliance name and hours of use to canned energy-saving
//! suggestions. Every rule is evaluated; all that fire are returned in
//! definition order.

use crate::{Error, Result};

/// Returned when no rule fires
pub const DEFAULT_ADVICE: &str = "Your usage looks efficient.";

/// Shown when the appliance/hours input is rejected
pub const INVALID_QUERY_MESSAGE: &str = "Please enter a valid appliance and hours of usage.";

/// Condition over (lowercased appliance, hours) paired with its message
struct AdvisoryRule {
    appliance: &'static str,
    /// Rule fires only when hours is strictly greater than this
    min_hours: Option<f64>,
    message: &'static str,
}

impl AdvisoryRule {
    fn matches(&self, appliance: &str, hours: f64) -> bool {
        appliance == self.appliance && self.min_hours.map_or(true, |min| hours > min)
    }
}

const RULES: &[AdvisoryRule] = &[
    AdvisoryRule {
        appliance: "fan",
        min_hours: Some(1.0),
        message: "Switch off the fan after 30 minutes to save electricity.",
    },
    AdvisoryRule {
        appliance: "washing machine",
        min_hours: None,
        message: "Use eco-mode to reduce energy and water consumption.",
    },
    AdvisoryRule {
        appliance: "light",
        min_hours: Some(2.0),
        message: "Turn off lights when not in use.",
    },
];

/// Suggestions for an appliance used for `hours`; never empty
pub fn recommend(appliance: &str, hours: f64) -> Vec<String> {
    let appliance = appliance.to_lowercase();

    let mut suggestions: Vec<String> = RULES
        .iter()
        .filter(|rule| rule.matches(&appliance, hours))
        .map(|rule| rule.message.to_string())
        .collect();

    if suggestions.is_empty() {
        suggestions.push(DEFAULT_ADVICE.to_string());
    }
    suggestions
}

/// Reject empty appliance names and non-positive (or non-finite) hours
pub fn validate_energy_query(appliance: &str, hours: f64) -> Result<()> {
    if appliance.trim().is_empty() || !hours.is_finite() || hours <= 0.0 {
        return Err(Error::Validation(INVALID_QUERY_MESSAGE.to_string()));
    }
    Ok(())
}

/// Duplicate-suppression key for an energy query
pub fn energy_query_key(appliance: &str, hours: f64) -> String {
    format!("{}-{:?}", appliance.to_lowercase(), hours)
}
