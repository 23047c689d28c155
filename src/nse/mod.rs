pub mod config;
pub mod models;
pub mod nse_client;

// Re-exports (public API)
pub use models::{
    ContractInfo, OptionChain, OptionData, OptionDetail, PriceBar, Security, SecurityType,
};
pub use nse_client::NSEClient;
