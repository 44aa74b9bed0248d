//! Client-side bucket filter over the loaded country list.
//!
//! Buckets are recomputed from whatever snapshot is current; nothing here is
//! cached between renders.

use datasync::CountryData;
use foundation::{SentimentBucket, bucket_of};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum SentimentFilter {
    #[default]
    All,
    Only(SentimentBucket),
}

impl SentimentFilter {
    /// Clicking the active bucket resets to `All`; any other bucket replaces it.
    pub fn toggled(self, bucket: SentimentBucket) -> Self {
        if self == Self::Only(bucket) {
            Self::All
        } else {
            Self::Only(bucket)
        }
    }

    pub fn bucket(self) -> Option<SentimentBucket> {
        match self {
            Self::All => None,
            Self::Only(bucket) => Some(bucket),
        }
    }

    pub fn matches(self, score: f64) -> bool {
        match self {
            Self::All => true,
            Self::Only(bucket) => bucket_of(score) == bucket,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.bucket().map_or("all", SentimentBucket::as_str)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BucketCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: SentimentBucket) -> usize {
        match bucket {
            SentimentBucket::Positive => self.positive,
            SentimentBucket::Neutral => self.neutral,
            SentimentBucket::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Countries split by bucket, each keeping input order.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub positive: Vec<&'a CountryData>,
    pub neutral: Vec<&'a CountryData>,
    pub negative: Vec<&'a CountryData>,
}

impl Partition<'_> {
    pub fn counts(&self) -> BucketCounts {
        BucketCounts {
            positive: self.positive.len(),
            neutral: self.neutral.len(),
            negative: self.negative.len(),
        }
    }
}

pub fn partition(countries: &[CountryData]) -> Partition<'_> {
    let mut out = Partition::default();
    for country in countries {
        match bucket_of(country.sentiment_score) {
            SentimentBucket::Positive => out.positive.push(country),
            SentimentBucket::Neutral => out.neutral.push(country),
            SentimentBucket::Negative => out.negative.push(country),
        }
    }
    out
}

pub fn apply(filter: SentimentFilter, countries: &[CountryData]) -> Vec<&CountryData> {
    countries
        .iter()
        .filter(|c| filter.matches(c.sentiment_score))
        .collect()
}
