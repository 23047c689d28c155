/// Exponential moving average, computed incrementally.
///
/// Smoothing factor `α = 2/(span+1)`, first value seeded from the first
/// observation (the pandas `ewm(span, adjust=False)` convention). The raw
/// recurrence runs from bar 0, but `value()` reports `None` until `span`
/// observations have been seen so callers can mask the warmup region.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    span: usize,
    seen: usize,
    current: f64,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self {
            alpha: 2.0 / (span as f64 + 1.0),
            span,
            seen: 0,
            current: 0.0,
        }
    }

    /// Feed one observation, returning the raw recurrence value.
    pub fn update(&mut self, price: f64) -> f64 {
        if self.seen == 0 {
            self.current = price;
        } else {
            self.current = self.alpha * price + (1.0 - self.alpha) * self.current;
        }
        self.seen += 1;
        self.current
    }

    /// Current EMA, or `None` while fewer than `span` observations exist.
    pub fn value(&self) -> Option<f64> {
        if self.seen >= self.span {
            Some(self.current)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recurrence_matches_pandas_ewm_adjust_false() {
        // pd.Series([10,11,12,13]).ewm(span=3, adjust=False).mean()
        let mut ema = Ema::new(3);
        // alpha = 2/(3+1) = 0.5

        assert!((ema.update(10.0) - 10.0).abs() < 1e-12);
        assert_eq!(ema.value(), None);

        assert!((ema.update(11.0) - 10.5).abs() < 1e-12);
        assert_eq!(ema.value(), None);

        // Warm after 3 observations
        assert!((ema.update(12.0) - 11.25).abs() < 1e-12);
        assert!(ema.value().is_some());

        assert!((ema.update(13.0) - 12.125).abs() < 1e-12);
    }

    #[test]
    fn test_constant_input_stays_at_input() {
        let mut ema = Ema::new(5);
        for _ in 0..20 {
            ema.update(42.0);
        }
        let value = ema.value().unwrap();
        assert!((value - 42.0).abs() < 1e-9);
    }
}
