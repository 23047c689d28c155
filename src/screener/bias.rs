use crate::error::AnalysisError;
use crate::indicators::{compute_indicators, IndicatorSnapshot};
use crate::nse::models::PriceBar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional read of the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Bias::Bullish => "Bullish",
            Bias::Bearish => "Bearish",
            Bias::Neutral => "Neutral",
        };
        write!(f, "{}", label)
    }
}

/// Point-scoring rubric applied to the latest bar's indicator snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiasRubric {
    /// +1 for close > EMA20 > EMA50, +1 for RSI14 > 50.
    /// 2 → Bullish, 0 → Bearish, otherwise Neutral.
    TwoPoint,

    /// The two-point checks plus +1 for MACD above its signal line.
    /// ≥2 → Bullish, 1 → Neutral, 0 → Bearish.
    ThreePoint,

    /// Same three checks but with the older two-way cut: ≥2 → Bullish,
    /// everything else Bearish. Neutral is unreachable here; the variant
    /// exists to reproduce dashboards that shipped with that behavior.
    ThreePointTwoWay,
}

impl BiasRubric {
    fn uses_macd(&self) -> bool {
        !matches!(self, BiasRubric::TwoPoint)
    }
}

/// Score one snapshot against a rubric.
///
/// A check whose inputs are undefined at this bar is skipped, not scored.
/// When no check is evaluable at all the result is `InsufficientHistory`
/// rather than a score of zero masquerading as Bearish.
pub fn classify_bias(
    snapshot: &IndicatorSnapshot,
    rubric: BiasRubric,
) -> Result<Bias, AnalysisError> {
    let mut score = 0u8;
    let mut evaluated = 0u8;

    if let (Some(ema20), Some(ema50)) = (snapshot.ema20, snapshot.ema50) {
        evaluated += 1;
        if snapshot.close > ema20 && ema20 > ema50 {
            score += 1;
        }
    }

    if let Some(rsi) = snapshot.rsi14 {
        evaluated += 1;
        if rsi > 50.0 {
            score += 1;
        }
    }

    if rubric.uses_macd() {
        if let (Some(macd), Some(signal)) = (snapshot.macd, snapshot.macd_signal) {
            evaluated += 1;
            if macd > signal {
                score += 1;
            }
        }
    }

    if evaluated == 0 {
        return Err(AnalysisError::InsufficientHistory(
            "no rubric check has enough bars at the latest close".to_string(),
        ));
    }

    let bias = match rubric {
        BiasRubric::TwoPoint => match score {
            2 => Bias::Bullish,
            0 => Bias::Bearish,
            _ => Bias::Neutral,
        },
        BiasRubric::ThreePoint => match score {
            s if s >= 2 => Bias::Bullish,
            1 => Bias::Neutral,
            _ => Bias::Bearish,
        },
        BiasRubric::ThreePointTwoWay => {
            if score >= 2 {
                Bias::Bullish
            } else {
                Bias::Bearish
            }
        }
    };

    Ok(bias)
}

/// Compute indicators over a bar sequence and classify its final bar.
pub fn classify_latest_bias(
    bars: &[PriceBar],
    rubric: BiasRubric,
) -> Result<Bias, AnalysisError> {
    if bars.is_empty() {
        return Err(AnalysisError::NoData("empty price series".to_string()));
    }

    let series = compute_indicators(bars);
    let snapshot = series
        .snapshot(bars, bars.len() - 1)
        .ok_or_else(|| AnalysisError::NoData("indicator series misaligned".to_string()))?;

    classify_bias(&snapshot, rubric)
}
