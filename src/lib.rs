pub mod analysis;
pub mod api_server;
pub mod app_config;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod nse;
pub mod screener;

// Re-exports (public API)
pub use analysis::{aggregate_open_interest, compute_pcr, OiAggregate, PcrResult};
pub use analysis::{Sentiment, SentimentScale};
pub use error::AnalysisError;
pub use indicators::{compute_indicators, IndicatorSeries, IndicatorSnapshot};
pub use nse::NSEClient;
pub use screener::{Bias, BiasRubric};
