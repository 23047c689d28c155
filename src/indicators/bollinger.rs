use super::RollingWindow;

/// Bollinger Bands: rolling SMA ± k standard deviations.
///
/// Uses the population standard deviation (ddof = 0, the pandas rolling
/// default). Undefined until the window fills — the first `window - 1` bars
/// report `None`.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    window: RollingWindow,
    width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBands {
    pub fn new(window: usize, width: f64) -> Self {
        Self {
            window: RollingWindow::new(window),
            width,
        }
    }

    pub fn update(&mut self, close: f64) -> Option<BollingerPoint> {
        self.window.push(close);
        if !self.window.is_full() {
            return None;
        }

        let middle = self.window.mean();
        let std = self.window.std_pop();
        Some(BollingerPoint {
            upper: middle + self.width * std,
            middle,
            lower: middle - self.width * std,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_undefined_until_window_fills() {
        let mut bb = BollingerBands::new(20, 2.0);
        for i in 0..19 {
            assert_eq!(bb.update(100.0 + i as f64), None, "bar {}", i);
        }
        assert!(bb.update(119.0).is_some());
    }

    #[test]
    fn test_flat_window_collapses_bands() {
        let mut bb = BollingerBands::new(20, 2.0);
        let mut band = None;
        for _ in 0..25 {
            band = bb.update(500.0);
        }
        let band = band.unwrap();
        assert_eq!(band.middle, 500.0);
        assert_eq!(band.upper, 500.0);
        assert_eq!(band.lower, 500.0);
    }

    #[test]
    fn test_known_window_statistics() {
        // Window [1..=4]: mean 2.5, population variance 1.25
        let mut bb = BollingerBands::new(4, 2.0);
        let mut band = None;
        for v in [1.0, 2.0, 3.0, 4.0] {
            band = bb.update(v);
        }
        let band = band.unwrap();
        let std = 1.25_f64.sqrt();
        assert!((band.middle - 2.5).abs() < 1e-12);
        assert!((band.upper - (2.5 + 2.0 * std)).abs() < 1e-12);
        assert!((band.lower - (2.5 - 2.0 * std)).abs() < 1e-12);
    }
}
