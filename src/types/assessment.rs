//! Risk assessment data structures

use crate::explainer::Explanation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicted outcome for one employee. Serializes as its display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    /// Predicted class 1
    #[serde(rename = "predicted: at risk")]
    AtRisk,
    /// Predicted class 0
    #[serde(rename = "predicted: likely to stay")]
    LikelyToStay,
}

impl RiskLabel {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            RiskLabel::AtRisk
        } else {
            RiskLabel::LikelyToStay
        }
    }

    pub fn class(&self) -> u8 {
        match self {
            RiskLabel::AtRisk => 1,
            RiskLabel::LikelyToStay => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::AtRisk => "predicted: at risk",
            RiskLabel::LikelyToStay => "predicted: likely to stay",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one employee profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Unique assessment identifier
    pub assessment_id: String,

    /// Assessment generation timestamp
    pub timestamp: DateTime<Utc>,

    pub label: RiskLabel,

    /// Predicted class (1 = resign)
    pub class: u8,

    /// Estimated probability of resignation (0.0 - 1.0)
    pub probability: f64,

    /// Probability as a percentage, rounded to two decimals
    pub probability_percent: f64,

    /// Rule-based factors for the same profile
    pub explanation: Explanation,
}

impl RiskAssessment {
    pub fn new(class: u8, probability: f64, explanation: Explanation) -> Self {
        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            label: RiskLabel::from_class(class),
            class,
            probability,
            probability_percent: (probability * 10_000.0).round() / 100.0,
            explanation,
        }
    }

    /// e.g. "Estimated probability of resignation: 73.41%"
    pub fn probability_display(&self) -> String {
        format!(
            "Estimated probability of resignation: {:.2}%",
            self.probability_percent
        )
    }
}
