use serde::{Deserialize, Serialize};
use std::fmt;

/// Market sentiment read off the put-call ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    StronglyBullish,
    Bullish,
    Neutral,
    Bearish,
    StronglyBearish,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Sentiment::StronglyBullish => "Strongly Bullish",
            Sentiment::Bullish => "Bullish",
            Sentiment::Neutral => "Neutral",
            Sentiment::Bearish => "Bearish",
            Sentiment::StronglyBearish => "Strongly Bearish",
        };
        write!(f, "{}", label)
    }
}

/// Threshold table mapping a finite ratio to a sentiment band.
///
/// Two conventions exist in the wild and both are kept selectable; the
/// five-band table is the default everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SentimentScale {
    /// Five ordered bands with left-closed lower bounds: a ratio equal to a
    /// band's bound belongs to that band.
    FiveBand {
        strongly_bullish: f64,
        bullish: f64,
        neutral: f64,
        bearish: f64,
    },

    /// Older four-band table with strict comparisons. Ratios inside the
    /// unlabelled gap between `bearish_below` and `bullish_above` fall back
    /// to Neutral.
    FourBandStrict {
        strongly_bullish_above: f64,
        bullish_above: f64,
        bearish_below: f64,
        strongly_bearish_below: f64,
    },
}

impl SentimentScale {
    /// The canonical five-band thresholds: 1.3 / 1.1 / 0.9 / 0.7.
    pub fn canonical() -> Self {
        SentimentScale::FiveBand {
            strongly_bullish: 1.3,
            bullish: 1.1,
            neutral: 0.9,
            bearish: 0.7,
        }
    }

    /// Strict-comparison table with a dead zone at exactly [1.0, 1.2].
    /// Kept only to reproduce older dashboards; prefer `canonical`.
    pub fn legacy_four_band() -> Self {
        SentimentScale::FourBandStrict {
            strongly_bullish_above: 1.3,
            bullish_above: 1.2,
            bearish_below: 1.0,
            strongly_bearish_below: 0.7,
        }
    }

    pub fn classify(&self, ratio: f64) -> Sentiment {
        match *self {
            SentimentScale::FiveBand {
                strongly_bullish,
                bullish,
                neutral,
                bearish,
            } => {
                if ratio >= strongly_bullish {
                    Sentiment::StronglyBullish
                } else if ratio >= bullish {
                    Sentiment::Bullish
                } else if ratio >= neutral {
                    Sentiment::Neutral
                } else if ratio >= bearish {
                    Sentiment::Bearish
                } else {
                    Sentiment::StronglyBearish
                }
            }
            SentimentScale::FourBandStrict {
                strongly_bullish_above,
                bullish_above,
                bearish_below,
                strongly_bearish_below,
            } => {
                if ratio > strongly_bullish_above {
                    Sentiment::StronglyBullish
                } else if ratio > bullish_above {
                    Sentiment::Bullish
                } else if ratio < strongly_bearish_below {
                    Sentiment::StronglyBearish
                } else if ratio < bearish_below {
                    Sentiment::Bearish
                } else {
                    Sentiment::Neutral
                }
            }
        }
    }
}

impl Default for SentimentScale {
    fn default() -> Self {
        SentimentScale::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_band_boundaries() {
        let scale = SentimentScale::canonical();
        // Lower bounds are inclusive
        assert_eq!(scale.classify(1.3), Sentiment::StronglyBullish);
        assert_eq!(scale.classify(1.2999), Sentiment::Bullish);
        assert_eq!(scale.classify(1.1), Sentiment::Bullish);
        assert_eq!(scale.classify(1.0999), Sentiment::Neutral);
        assert_eq!(scale.classify(0.9), Sentiment::Neutral);
        assert_eq!(scale.classify(0.7), Sentiment::Bearish);
        assert_eq!(scale.classify(0.6999), Sentiment::StronglyBearish);
    }

    #[test]
    fn test_legacy_gap_maps_to_neutral() {
        let scale = SentimentScale::legacy_four_band();
        // Strict comparisons leave [1.0, 1.2] unlabelled
        assert_eq!(scale.classify(1.0), Sentiment::Neutral);
        assert_eq!(scale.classify(1.1), Sentiment::Neutral);
        assert_eq!(scale.classify(1.2), Sentiment::Neutral);
        assert_eq!(scale.classify(1.21), Sentiment::Bullish);
        assert_eq!(scale.classify(0.99), Sentiment::Bearish);
        assert_eq!(scale.classify(1.31), Sentiment::StronglyBullish);
        assert_eq!(scale.classify(0.69), Sentiment::StronglyBearish);
    }
}
