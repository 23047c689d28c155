use super::ema::Ema;

/// MACD line and its signal line.
///
/// `macd = EMA(fast) - EMA(slow)`, reported once the slow EMA is warm
/// (bar 26 onward for the standard 12/26 spans). The signal EMA is fed only
/// with reported MACD values, so it turns on `signal_span` bars later
/// (bar 34 for the standard 9-span signal).
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

/// One bar's MACD output; either line is `None` inside its warmup region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
}

impl Macd {
    pub fn new(fast_span: usize, slow_span: usize, signal_span: usize) -> Self {
        Self {
            fast: Ema::new(fast_span),
            slow: Ema::new(slow_span),
            signal: Ema::new(signal_span),
        }
    }

    pub fn update(&mut self, close: f64) -> MacdPoint {
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);

        if self.slow.value().is_none() {
            return MacdPoint {
                macd: None,
                signal: None,
            };
        }

        let line = fast - slow;
        self.signal.update(line);

        MacdPoint {
            macd: Some(line),
            signal: self.signal.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_turns_on_with_slow_ema() {
        let mut macd = Macd::new(12, 26, 9);
        for i in 0..25 {
            let point = macd.update(100.0 + i as f64);
            assert_eq!(point.macd, None, "bar {}", i);
            assert_eq!(point.signal, None, "bar {}", i);
        }
        // Bar 26 (index 25): line defined, signal still warming
        let point = macd.update(125.0);
        assert!(point.macd.is_some());
        assert_eq!(point.signal, None);
    }

    #[test]
    fn test_signal_turns_on_nine_bars_later() {
        let mut macd = Macd::new(12, 26, 9);
        let mut points = Vec::new();
        for i in 0..40 {
            points.push(macd.update(100.0 + i as f64));
        }
        // Indices 25..=32: line only; index 33 onward: both
        assert!(points[32].macd.is_some());
        assert_eq!(points[32].signal, None);
        assert!(points[33].signal.is_some());
    }

    #[test]
    fn test_rising_series_keeps_line_positive() {
        let mut macd = Macd::new(12, 26, 9);
        for i in 0..60 {
            let point = macd.update(100.0 + 2.0 * i as f64);
            if let Some(line) = point.macd {
                assert!(line >= 0.0, "bar {}", i);
            }
        }
    }
}
