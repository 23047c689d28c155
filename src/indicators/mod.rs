pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use bollinger::{BollingerBands, BollingerPoint};
pub use ema::Ema;
pub use macd::{Macd, MacdPoint};
pub use rsi::Rsi;

use crate::nse::models::PriceBar;
use serde::Serialize;

pub const EMA_FAST_SPAN: usize = 20;
pub const EMA_SLOW_SPAN: usize = 50;
pub const RSI_WINDOW: usize = 14;
pub const MACD_FAST_SPAN: usize = 12;
pub const MACD_SLOW_SPAN: usize = 26;
pub const MACD_SIGNAL_SPAN: usize = 9;
pub const BOLLINGER_WINDOW: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;

/// Fixed-capacity window over the most recent values, for rolling mean and
/// standard deviation. Overwrites oldest-first once full; insertion order is
/// irrelevant to both statistics, so no ordered iteration is kept.
#[derive(Debug, Clone)]
pub(crate) struct RollingWindow {
    values: Vec<f64>,
    next: usize,
    filled: usize,
}

impl RollingWindow {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            values: vec![0.0; capacity],
            next: 0,
            filled: 0,
        }
    }

    pub(crate) fn push(&mut self, value: f64) {
        self.values[self.next] = value;
        self.next = (self.next + 1) % self.values.len();
        if self.filled < self.values.len() {
            self.filled += 1;
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.filled == self.values.len()
    }

    pub(crate) fn mean(&self) -> f64 {
        if self.filled == 0 {
            return 0.0;
        }
        self.values[..self.filled].iter().sum::<f64>() / self.filled as f64
    }

    /// Population standard deviation (ddof = 0).
    pub(crate) fn std_pop(&self) -> f64 {
        if self.filled == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self.values[..self.filled]
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.filled as f64;
        variance.sqrt()
    }
}

/// Per-bar indicator values aligned 1:1 with the input bar sequence.
/// `None` marks positions where the indicator's window has not filled yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub ema20: Vec<Option<f64>>,
    pub ema50: Vec<Option<f64>>,
    pub rsi14: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub bollinger_middle: Vec<Option<f64>>,
    pub bollinger_upper: Vec<Option<f64>>,
    pub bollinger_lower: Vec<Option<f64>>,
}

impl IndicatorSeries {
    fn with_capacity(n: usize) -> Self {
        Self {
            ema20: Vec::with_capacity(n),
            ema50: Vec::with_capacity(n),
            rsi14: Vec::with_capacity(n),
            macd: Vec::with_capacity(n),
            macd_signal: Vec::with_capacity(n),
            bollinger_middle: Vec::with_capacity(n),
            bollinger_upper: Vec::with_capacity(n),
            bollinger_lower: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.ema20.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema20.is_empty()
    }

    /// Values aligned with bar `index`, paired with that bar's close.
    /// Returns `None` only when the index is out of range.
    pub fn snapshot(&self, bars: &[PriceBar], index: usize) -> Option<IndicatorSnapshot> {
        let bar = bars.get(index)?;
        if index >= self.len() {
            return None;
        }
        Some(IndicatorSnapshot {
            close: bar.close,
            ema20: self.ema20[index],
            ema50: self.ema50[index],
            rsi14: self.rsi14[index],
            macd: self.macd[index],
            macd_signal: self.macd_signal[index],
        })
    }
}

/// One bar's close plus its aligned indicator values, as consumed by the
/// bias rubrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

/// Single left-to-right pass over an ordered bar sequence.
///
/// Every window operates on past-and-current bars only; the function is pure,
/// so two runs over the same bars produce identical output. Callers are
/// expected to hand in bars already sorted strictly ascending by timestamp
/// (the parse layer enforces this).
pub fn compute_indicators(bars: &[PriceBar]) -> IndicatorSeries {
    let mut series = IndicatorSeries::with_capacity(bars.len());

    let mut ema20 = Ema::new(EMA_FAST_SPAN);
    let mut ema50 = Ema::new(EMA_SLOW_SPAN);
    let mut rsi14 = Rsi::new(RSI_WINDOW);
    let mut macd = Macd::new(MACD_FAST_SPAN, MACD_SLOW_SPAN, MACD_SIGNAL_SPAN);
    let mut bollinger = BollingerBands::new(BOLLINGER_WINDOW, BOLLINGER_WIDTH);

    for bar in bars {
        let close = bar.close;

        ema20.update(close);
        ema50.update(close);
        series.ema20.push(ema20.value());
        series.ema50.push(ema50.value());

        series.rsi14.push(rsi14.update(close));

        let macd_point = macd.update(close);
        series.macd.push(macd_point.macd);
        series.macd_signal.push(macd_point.signal);

        let band = bollinger.update(close);
        series.bollinger_middle.push(band.map(|b| b.middle));
        series.bollinger_upper.push(band.map(|b| b.upper));
        series.bollinger_lower.push(band.map(|b| b.lower));
    }

    series
}
