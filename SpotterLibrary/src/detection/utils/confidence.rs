use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Confidence tier assigned to a finished detection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceCategory {
    Uncertain,
    Low,
    Medium,
    High,
    Certain,
}

impl ConfidenceCategory {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            ConfidenceCategory::Certain
        } else if score >= 75.0 {
            ConfidenceCategory::High
        } else if score >= 60.0 {
            ConfidenceCategory::Medium
        } else if score >= 45.0 {
            ConfidenceCategory::Low
        } else {
            ConfidenceCategory::Uncertain
        }
    }

    pub fn is_retained(&self) -> bool {
        *self >= ConfidenceCategory::Medium
    }
}

impl Display for ConfidenceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            ConfidenceCategory::Uncertain => "uncertain",
            ConfidenceCategory::Low => "low",
            ConfidenceCategory::Medium => "medium",
            ConfidenceCategory::High => "high",
            ConfidenceCategory::Certain => "certain",
        };
        write!(f, "{}", str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(ConfidenceCategory::from_score(90.0), ConfidenceCategory::Certain);
        assert_eq!(ConfidenceCategory::from_score(89.9), ConfidenceCategory::High);
        assert_eq!(ConfidenceCategory::from_score(75.0), ConfidenceCategory::High);
        assert_eq!(ConfidenceCategory::from_score(60.0), ConfidenceCategory::Medium);
        assert_eq!(ConfidenceCategory::from_score(45.0), ConfidenceCategory::Low);
        assert_eq!(ConfidenceCategory::from_score(44.9), ConfidenceCategory::Uncertain);
        assert_eq!(ConfidenceCategory::from_score(0.0), ConfidenceCategory::Uncertain);
    }

    #[test]
    fn only_medium_and_above_are_retained() {
        assert!(ConfidenceCategory::Certain.is_retained());
        assert!(ConfidenceCategory::High.is_retained());
        assert!(ConfidenceCategory::Medium.is_retained());
        assert!(!ConfidenceCategory::Low.is_retained());
        assert!(!ConfidenceCategory::Uncertain.is_retained());
    }
}
