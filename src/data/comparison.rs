use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Qualitative label for a tasteometer score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, AsRefStr, Serialize, Deserialize)]
pub enum ScoreRating {
    #[strum(serialize = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
    #[strum(serialize = "Very High")]
    VeryHigh,
    Super,
}

impl ScoreRating {
    /// Map a score in [0, 1] to a label. Thresholds are inclusive lower bounds.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            ScoreRating::Super
        } else if score >= 0.7 {
            ScoreRating::VeryHigh
        } else if score >= 0.5 {
            ScoreRating::High
        } else if score >= 0.3 {
            ScoreRating::Medium
        } else if score >= 0.1 {
            ScoreRating::Low
        } else {
            ScoreRating::VeryLow
        }
    }
}

/// Result of comparing the taste of two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub score: f64,
    /// Shared artists, most significant first
    pub artists: Vec<String>,
}

impl Comparison {
    pub fn rating(&self) -> ScoreRating {
        ScoreRating::from_score(self.score)
    }

    /// Score rounded to two decimals with its label, e.g. "0.83 (Very High)"
    pub fn score_text(&self) -> String {
        format!("{:.2} ({})", self.score, self.rating())
    }
}
