pub mod bias;

pub use bias::{classify_bias, classify_latest_bias, Bias, BiasRubric};

use crate::error::AnalysisError;
use crate::indicators::compute_indicators;
use crate::nse::models::PriceBar;
use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

/// One security's latest indicator readings plus its classified bias.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenerRow {
    pub symbol: String,
    pub bars: usize,
    pub close: f64,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bias: Bias,
}

/// Indicator pipeline for one symbol: compute the series, classify the last
/// bar, report the latest values.
pub fn screen_symbol(
    symbol: &str,
    bars: &[PriceBar],
    rubric: BiasRubric,
) -> Result<ScreenerRow, AnalysisError> {
    if bars.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "no price bars for {}",
            symbol
        )));
    }

    let series = compute_indicators(bars);
    let snapshot = series
        .snapshot(bars, bars.len() - 1)
        .ok_or_else(|| AnalysisError::NoData("indicator series misaligned".to_string()))?;
    let bias = classify_bias(&snapshot, rubric)?;

    Ok(ScreenerRow {
        symbol: symbol.to_string(),
        bars: bars.len(),
        close: snapshot.close,
        ema20: snapshot.ema20,
        ema50: snapshot.ema50,
        rsi14: snapshot.rsi14,
        macd: snapshot.macd,
        macd_signal: snapshot.macd_signal,
        bias,
    })
}

/// Screen many symbols at once. Each symbol's computation is independent, so
/// the per-symbol passes run on the rayon pool; symbols that cannot be
/// classified (too little history, empty series) are logged and dropped.
pub fn screen_universe(
    data: &[(String, Vec<PriceBar>)],
    rubric: BiasRubric,
) -> Vec<ScreenerRow> {
    data.par_iter()
        .filter_map(|(symbol, bars)| match screen_symbol(symbol, bars, rubric) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "skipping symbol in screener");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: NaiveDate::from_ymd_opt(2025, 1, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(i as u64))
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn test_rising_series_screens_bullish() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let row = screen_symbol("TEST", &bars(&closes), BiasRubric::ThreePoint).unwrap();
        assert_eq!(row.bias, Bias::Bullish);
        assert_eq!(row.bars, 60);
    }

    #[test]
    fn test_empty_series_is_no_data() {
        assert!(matches!(
            screen_symbol("TEST", &[], BiasRubric::TwoPoint),
            Err(AnalysisError::NoData(_))
        ));
    }

    #[test]
    fn test_universe_drops_unclassifiable_symbols() {
        let rising: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let universe = vec![
            ("LONG".to_string(), bars(&rising)),
            ("SHORT".to_string(), bars(&[100.0, 101.0])),
        ];
        let rows = screen_universe(&universe, BiasRubric::TwoPoint);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "LONG");
    }
}
