use super::RollingWindow;

/// Relative Strength Index over simple rolling means of gains and losses.
///
/// Bar-to-bar close deltas are split into a gain series (`delta` when
/// positive, else 0) and a loss series (`-delta` when negative, else 0);
/// both are averaged over the last `window` deltas and
/// `RSI = 100 - 100/(1 + avg_gain/avg_loss)`.
///
/// Division-by-zero edge rules instead of a crash:
///   avg_loss == 0 and avg_gain == 0  → 50 (flat series, neutral midpoint)
///   avg_loss == 0 and avg_gain  > 0  → 100
///
/// The first `window` bars report `None` (one delta per bar after the first,
/// and a full window of deltas is required).
#[derive(Debug, Clone)]
pub struct Rsi {
    gains: RollingWindow,
    losses: RollingWindow,
    prev_close: Option<f64>,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        Self {
            gains: RollingWindow::new(window),
            losses: RollingWindow::new(window),
            prev_close: None,
        }
    }

    pub fn update(&mut self, close: f64) -> Option<f64> {
        let prev = match self.prev_close.replace(close) {
            Some(prev) => prev,
            None => return None,
        };

        let delta = close - prev;
        self.gains.push(if delta > 0.0 { delta } else { 0.0 });
        self.losses.push(if delta < 0.0 { -delta } else { 0.0 });

        if !self.gains.is_full() {
            return None;
        }

        let avg_gain = self.gains.mean();
        let avg_loss = self.losses.mean();

        if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                return Some(50.0);
            }
            return Some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_series_reads_neutral() {
        let mut rsi = Rsi::new(14);
        let mut last = None;
        for _ in 0..40 {
            last = rsi.update(250.0);
        }
        assert_eq!(last, Some(50.0));
    }

    #[test]
    fn test_all_gains_reads_one_hundred() {
        let mut rsi = Rsi::new(14);
        let mut last = None;
        for i in 0..40 {
            last = rsi.update(100.0 + i as f64);
        }
        assert_eq!(last, Some(100.0));
    }

    #[test]
    fn test_warmup_region_is_undefined() {
        let mut rsi = Rsi::new(14);
        // 14 deltas need 15 closes; the 14 first updates stay undefined
        for i in 0..14 {
            assert_eq!(rsi.update(100.0 + i as f64), None, "bar {}", i);
        }
        assert!(rsi.update(114.0).is_some());
    }

    #[test]
    fn test_mixed_moves_stay_inside_bounds() {
        let mut rsi = Rsi::new(14);
        let closes = [
            100.0, 101.5, 100.8, 102.2, 101.9, 103.0, 102.4, 104.1, 103.5, 105.0, 104.2, 106.0,
            105.1, 107.2, 106.8, 108.0,
        ];
        let mut last = None;
        for close in closes {
            last = rsi.update(close);
        }
        let value = last.unwrap();
        assert!(value > 50.0 && value < 100.0);
    }
}
