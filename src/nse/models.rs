use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub symbol: String,
    pub security_type: SecurityType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SecurityType {
    Equity,
    Indices,
}

impl Security {
    pub fn equity(symbol: String) -> Self {
        Self {
            symbol,
            security_type: SecurityType::Equity,
        }
    }

    pub fn index(symbol: String) -> Self {
        Self {
            symbol,
            security_type: SecurityType::Indices,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractInfo {
    #[serde(rename = "expiryDates")]
    pub expiry_dates: Vec<String>,

    #[serde(rename = "strikePrice")]
    pub strike_prices: Vec<String>,
}

/// Main response structure from the NSE option chain API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    pub records: Records,
    pub filtered: FilteredData,
}

/// Records section containing timestamp, underlying value, and all strike data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Records {
    pub timestamp: String,

    #[serde(rename = "underlyingValue")]
    pub underlying_value: f64,

    pub data: Vec<OptionData>,

    #[serde(rename = "expiryDates")]
    pub expiry_dates: Vec<String>,

    #[serde(rename = "strikePrices")]
    pub strike_prices: Vec<String>,
}

/// Filtered section: the selected expiry's strike rows. The exchange also
/// sends its own per-side OI totals here; we recompute them from the rows
/// instead of trusting the pre-aggregated figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredData {
    pub data: Vec<OptionData>,

    #[serde(rename = "CE")]
    pub ce_totals: OptionTotals,

    #[serde(rename = "PE")]
    pub pe_totals: OptionTotals,
}

/// Totals for CE or PE side as reported by the exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionTotals {
    #[serde(rename = "totOI")]
    pub total_oi: f64,
}

/// Option data for one strike. Either side may be absent when no contract
/// trades there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionData {
    #[serde(rename = "expiryDates")]
    pub expiry_date: Option<String>,

    #[serde(rename = "strikePrice")]
    pub strike_price: Option<f64>,

    #[serde(rename = "CE")]
    pub call: Option<OptionDetail>,

    #[serde(rename = "PE")]
    pub put: Option<OptionDetail>,
}

/// Detailed option information (CE or PE)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDetail {
    #[serde(rename = "strikePrice")]
    pub strike_price: Option<f64>,

    #[serde(rename = "underlyingValue")]
    pub underlying_value: Option<f64>,

    #[serde(rename = "openInterest")]
    pub open_interest: Option<u64>,

    #[serde(rename = "changeinOpenInterest")]
    pub change_in_oi: Option<f64>,

    #[serde(rename = "lastPrice")]
    pub last_price: Option<f64>,

    #[serde(rename = "change")]
    pub price_change: Option<f64>,

    #[serde(rename = "pchange")]
    pub per_chg_price: Option<f64>,

    #[serde(rename = "pchangeinOpenInterest")]
    pub per_chg_oi: Option<f64>,
}

/// One day's OHLCV for a security.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Response envelope of the historical candle API
#[derive(Debug, Clone, Deserialize)]
pub struct PriceHistoryResponse {
    pub data: Vec<PriceHistoryRow>,
}

/// One raw row of the historical candle API
#[derive(Debug, Clone, Deserialize)]
pub struct PriceHistoryRow {
    #[serde(rename = "CH_TIMESTAMP")]
    pub timestamp: String,

    #[serde(rename = "CH_OPENING_PRICE")]
    pub open: f64,

    #[serde(rename = "CH_TRADE_HIGH_PRICE")]
    pub high: f64,

    #[serde(rename = "CH_TRADE_LOW_PRICE")]
    pub low: f64,

    #[serde(rename = "CH_CLOSING_PRICE")]
    pub close: f64,

    #[serde(rename = "CH_TOT_TRADED_QTY")]
    pub volume: u64,
}

/// Convert raw history rows into an ordered bar sequence.
///
/// The API returns newest-first; bars are re-sorted ascending by date and a
/// duplicate date is rejected outright, so downstream indicator code can rely
/// on strictly increasing timestamps.
pub fn to_price_bars(rows: Vec<PriceHistoryRow>) -> Result<Vec<PriceBar>> {
    let mut bars = Vec::with_capacity(rows.len());

    for row in rows {
        let date = NaiveDate::parse_from_str(&row.timestamp, "%Y-%m-%d")
            .with_context(|| format!("Failed to parse bar date '{}'", row.timestamp))?;
        bars.push(PriceBar {
            timestamp: date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    bars.sort_by_key(|bar| bar.timestamp);

    for pair in bars.windows(2) {
        if pair[0].timestamp == pair[1].timestamp {
            bail!("Duplicate bar date {} in price history", pair[0].timestamp);
        }
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, close: f64) -> PriceHistoryRow {
        PriceHistoryRow {
            timestamp: date.to_string(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
        }
    }

    #[test]
    fn test_bars_sorted_ascending() {
        let rows = vec![raw("2025-07-16", 3.0), raw("2025-07-14", 1.0), raw("2025-07-15", 2.0)];
        let bars = to_price_bars(rows).unwrap();
        assert_eq!(bars.len(), 3);
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(bars[0].close, 1.0);
        assert_eq!(bars[2].close, 3.0);
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let rows = vec![raw("2025-07-14", 1.0), raw("2025-07-14", 2.0)];
        assert!(to_price_bars(rows).is_err());
    }

    #[test]
    fn test_unparseable_date_rejected() {
        let rows = vec![raw("14-Jul-2025", 1.0)];
        assert!(to_price_bars(rows).is_err());
    }
}
