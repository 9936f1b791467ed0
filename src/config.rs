//! Policy constants for scoring and report status.
//!
//! Defaults reproduce the published weights and thresholds. Every field is
//! optional in JSON, so a deployment can override a single constant.

use crate::error::{OnboardingError, Result};
use crate::schema::Priority;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringPolicy {
    pub high_penalty: u32,
    pub medium_penalty: u32,
    pub low_penalty: u32,
    /// Points removed when every expected month is a gap; scaled by the gap ratio.
    pub gap_weight: f64,
}

impl ScoringPolicy {
    pub fn penalty(&self, priority: Priority) -> u32 {
        match priority {
            Priority::High => self.high_penalty,
            Priority::Medium => self.medium_penalty,
            Priority::Low => self.low_penalty,
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            high_penalty: 20,
            medium_penalty: 10,
            low_penalty: 5,
            gap_weight: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportPolicy {
    pub ready_threshold: u32,
    pub review_threshold: u32,
    /// Subtracted from the completeness score when suggestions were offered
    /// but no custom account made it into the chart.
    pub unreviewed_suggestion_penalty: u32,
    pub top_vendor_count: usize,
    pub largest_transaction_count: usize,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            ready_threshold: 80,
            review_threshold: 50,
            unreviewed_suggestion_penalty: 10,
            top_vendor_count: 5,
            largest_transaction_count: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub scoring: ScoringPolicy,
    pub report: ReportPolicy,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scoring.gap_weight.is_finite() || self.scoring.gap_weight < 0.0 {
            return Err(OnboardingError::InvalidConfig(format!(
                "gap weight must be a non-negative number, got {}",
                self.scoring.gap_weight
            )));
        }

        if self.report.ready_threshold > 100 {
            return Err(OnboardingError::InvalidConfig(format!(
                "ready threshold {} exceeds 100",
                self.report.ready_threshold
            )));
        }

        if self.report.review_threshold > self.report.ready_threshold {
            return Err(OnboardingError::InvalidConfig(format!(
                "review threshold {} is above ready threshold {}",
                self.report.review_threshold, self.report.ready_threshold
            )));
        }

        Ok(())
    }
}
