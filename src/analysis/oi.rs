use crate::error::AnalysisError;
use crate::nse::models::OptionData;
use serde::{Deserialize, Serialize};

/// Open interest summed over all strikes, one total per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OiAggregate {
    pub total_call_oi: u64,
    pub total_put_oi: u64,
}

/// Put-call ratio rounded to 3 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PcrResult {
    pub ratio: f64,
}

/// Sum call-side and put-side open interest across a chain.
///
/// A strike with no contract on one side contributes zero to that side.
/// An empty chain yields `(0, 0)`. Plain commutative summation, so the
/// result does not depend on row order.
pub fn aggregate_open_interest(rows: &[OptionData]) -> OiAggregate {
    let mut aggregate = OiAggregate::default();

    for row in rows {
        if let Some(call) = &row.call {
            aggregate.total_call_oi += call.open_interest.unwrap_or(0);
        }
        if let Some(put) = &row.put {
            aggregate.total_put_oi += put.open_interest.unwrap_or(0);
        }
    }

    aggregate
}

/// `ratio = total_put_oi / total_call_oi`, rounded half away from zero
/// (`f64::round`) to 3 decimals.
///
/// Fails with `NoData` when the call side is zero: the ratio is undefined
/// there, and callers must treat it as "cannot classify", never as 0 or ∞.
pub fn compute_pcr(aggregate: &OiAggregate) -> Result<PcrResult, AnalysisError> {
    if aggregate.total_call_oi == 0 {
        return Err(AnalysisError::NoData(
            "total call open interest is zero, put-call ratio undefined".to_string(),
        ));
    }

    let raw = aggregate.total_put_oi as f64 / aggregate.total_call_oi as f64;
    Ok(PcrResult {
        ratio: (raw * 1000.0).round() / 1000.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nse::models::{OptionData, OptionDetail};

    fn row(strike: f64, call_oi: Option<u64>, put_oi: Option<u64>) -> OptionData {
        OptionData {
            expiry_date: None,
            strike_price: Some(strike),
            call: call_oi.map(|oi| OptionDetail {
                strike_price: Some(strike),
                underlying_value: None,
                open_interest: Some(oi),
                change_in_oi: None,
                last_price: None,
                price_change: None,
                per_chg_price: None,
                per_chg_oi: None,
            }),
            put: put_oi.map(|oi| OptionDetail {
                strike_price: Some(strike),
                underlying_value: None,
                open_interest: Some(oi),
                change_in_oi: None,
                last_price: None,
                price_change: None,
                per_chg_price: None,
                per_chg_oi: None,
            }),
        }
    }

    #[test]
    fn test_aggregate_sums_both_sides() {
        let rows = vec![row(100.0, Some(500), Some(800)), row(110.0, Some(300), Some(200))];
        let aggregate = aggregate_open_interest(&rows);
        assert_eq!(aggregate.total_call_oi, 800);
        assert_eq!(aggregate.total_put_oi, 1000);
    }

    #[test]
    fn test_aggregate_missing_side_counts_as_zero() {
        let rows = vec![row(100.0, Some(400), None), row(110.0, None, Some(250))];
        let aggregate = aggregate_open_interest(&rows);
        assert_eq!(aggregate.total_call_oi, 400);
        assert_eq!(aggregate.total_put_oi, 250);
    }

    #[test]
    fn test_aggregate_empty_chain() {
        assert_eq!(aggregate_open_interest(&[]), OiAggregate::default());
    }

    #[test]
    fn test_pcr_rounds_to_three_decimals() {
        let aggregate = OiAggregate {
            total_call_oi: 3,
            total_put_oi: 1,
        };
        // 1/3 = 0.3333... -> 0.333
        let pcr = compute_pcr(&aggregate).unwrap();
        assert_eq!(pcr.ratio, 0.333);
    }

    #[test]
    fn test_pcr_zero_call_side_is_no_data() {
        let aggregate = OiAggregate {
            total_call_oi: 0,
            total_put_oi: 5000,
        };
        assert!(matches!(
            compute_pcr(&aggregate),
            Err(AnalysisError::NoData(_))
        ));
    }
}
