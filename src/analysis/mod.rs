pub mod oi;
pub mod sentiment;

pub use oi::{aggregate_open_interest, compute_pcr, OiAggregate, PcrResult};
pub use sentiment::{Sentiment, SentimentScale};

use crate::error::AnalysisError;
use crate::nse::models::OptionChain;
use serde::Serialize;

/// One security's put-call-ratio reading, ready for display or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct PcrSummary {
    pub symbol: String,
    pub timestamp: String,
    pub underlying_value: f64,
    pub strikes: usize,
    pub total_call_oi: u64,
    pub total_put_oi: u64,
    pub ratio: f64,
    pub sentiment: Sentiment,
}

/// Full PCR pipeline over one fetched option chain:
/// aggregate open interest, compute the ratio, classify sentiment.
///
/// Fails with `NoData` when the chain carries no call-side open interest —
/// a chain like that cannot be classified and must not be reported as 0.
pub fn analyze_chain(
    symbol: &str,
    chain: &OptionChain,
    scale: SentimentScale,
) -> Result<PcrSummary, AnalysisError> {
    let rows = &chain.filtered.data;
    let aggregate = aggregate_open_interest(rows);
    let pcr = compute_pcr(&aggregate)?;

    Ok(PcrSummary {
        symbol: symbol.to_string(),
        timestamp: chain.records.timestamp.clone(),
        underlying_value: chain.records.underlying_value,
        strikes: rows.len(),
        total_call_oi: aggregate.total_call_oi,
        total_put_oi: aggregate.total_put_oi,
        ratio: pcr.ratio,
        sentiment: scale.classify(pcr.ratio),
    })
}
