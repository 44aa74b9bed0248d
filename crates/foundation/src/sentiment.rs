use std::fmt;

use serde::{Deserialize, Serialize};

/// Scores strictly above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.2;

/// Scores strictly below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.2;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBucket {
    Positive,
    Neutral,
    Negative,
}

impl SentimentBucket {
    pub const ALL: [SentimentBucket; 3] = [Self::Positive, Self::Neutral, Self::Negative];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a score. NaN lands in neutral.
pub fn bucket_of(score: f64) -> SentimentBucket {
    if score > POSITIVE_THRESHOLD {
        SentimentBucket::Positive
    } else if score < NEGATIVE_THRESHOLD {
        SentimentBucket::Negative
    } else {
        SentimentBucket::Neutral
    }
}
