use super::config;
use super::models::{
    to_price_bars, ContractInfo, OptionChain, PriceBar, PriceHistoryResponse, Security,
    SecurityType,
};
use anyhow::{anyhow, Context, Result};
use chrono::{Duration as ChronoDuration, Local, NaiveDate, NaiveTime};
use futures::stream::{self, StreamExt};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{header, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;
use tracing::{debug, warn};

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION STATE AND EXPIRY CACHE
// -----------------------------------------------
pub struct NSEClient {
    client: Client,
    warmed_up: Arc<RwLock<bool>>,
    cached_equity_expiry: Arc<RwLock<Option<String>>>,
}

/// Pick the nearest tradable expiry: past dates are skipped, today's expiry
/// is valid until the 15:30 close, anything later wins by date order.
fn select_expiry(expiry_dates: &[String]) -> Result<&String> {
    if expiry_dates.is_empty() {
        return Err(anyhow!("No expiry dates found"));
    }

    let mut parsed: Vec<(NaiveDate, usize)> = Vec::new();
    for (idx, s) in expiry_dates.iter().enumerate() {
        let d = NaiveDate::parse_from_str(s, "%d-%b-%Y")
            .with_context(|| format!("Failed to parse expiry date: {}", s))?;
        parsed.push((d, idx));
    }
    parsed.sort_by_key(|(d, _)| *d);

    let now = Local::now();
    let today = now.date_naive();
    let cutoff = NaiveTime::from_hms_opt(15, 30, 0).unwrap();

    for (date, idx) in parsed {
        if date < today {
            continue;
        }
        if date == today && now.time() >= cutoff {
            continue;
        }
        return Ok(&expiry_dates[idx]);
    }

    Err(anyhow!("No valid expiry found (all past or after cutoff)"))
}

impl NSEClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            warmed_up: Arc::new(RwLock::new(false)),
            cached_equity_expiry: Arc::new(RwLock::new(None)),
        })
    }

    /// Warmup NSE session (only once per client)
    async fn warmup_if_needed(&self) -> Result<()> {
        if *self.warmed_up.read().await {
            return Ok(());
        }

        let mut warmed = self.warmed_up.write().await;
        if !*warmed {
            let _ = self
                .client
                .get(config::NSE_BASE_URL)
                .header("Accept", config::HEADER_ACCEPT_HTML)
                .send()
                .await
                .context("Failed to warm up NSE session")?;

            tokio::time::sleep(Duration::from_millis(config::WARMUP_DELAY_MS)).await;
            *warmed = true;
        }

        Ok(())
    }

    /// Generic retrying GET that only hands back JSON-shaped bodies.
    async fn fetch_json(&self, url: &str) -> Result<String> {
        self.warmup_if_needed().await?;

        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        Retry::spawn(backoff, || async {
            let res = self
                .client
                .get(url)
                .header("Referer", config::HEADER_REFERER)
                .header("X-Requested-With", config::HEADER_X_REQUESTED_WITH)
                .send()
                .await
                .context("Request send failed")?;

            let status = res.status();
            debug!(url, status = status.as_u16(), "NSE response");

            if status.is_success() {
                let text = res.text().await.context("Failed to read body")?;

                // NSE serves an HTML block page when the session is stale;
                // sniff the shape before handing the body to serde.
                let trimmed = text.trim();
                if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                    let preview: String = text.chars().take(200).collect();
                    warn!(url, "non-JSON response from NSE");
                    anyhow::bail!("Non-JSON response: {}", preview);
                }

                Ok(text)
            } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(url, status = status.as_u16(), "retryable NSE error");
                anyhow::bail!("Retryable error: {}", status)
            } else {
                let body = res.text().await.unwrap_or_default();
                let preview: String = body.chars().take(200).collect();
                anyhow::bail!("Client error {}: {}", status, preview)
            }
        })
        .await
    }

    // -----------------------------------------------
    // SECURITIES UNIVERSE
    // -----------------------------------------------
    pub async fn fetch_fno_list(&self) -> Result<Vec<Security>> {
        let text = self.fetch_json(config::NSE_API_MASTER_QUOTE).await?;

        let symbols: Vec<String> =
            serde_json::from_str(&text).context("Failed to parse FNO list")?;

        let mut securities: Vec<Security> = symbols.into_iter().map(Security::equity).collect();

        for index in config::NSE_INDICES {
            securities.push(Security::index(index.to_string()));
        }

        Ok(securities)
    }

    // -----------------------------------------------
    // CONTRACT INFO / EXPIRY SELECTION
    // -----------------------------------------------
    pub async fn fetch_contract_info(&self, symbol: &str) -> Result<ContractInfo> {
        let url = config::nse_contract_info_url(symbol);
        let text = self.fetch_json(&url).await?;
        let info: ContractInfo =
            serde_json::from_str(&text).context("Failed to parse contract info")?;

        Ok(info)
    }

    /// Nearest valid expiry for a security. Index expiry schedules differ
    /// per index so they always fetch fresh; equities share one monthly
    /// schedule, so the first answer is cached for the rest of the batch.
    pub async fn resolve_expiry(&self, security: &Security) -> Result<String> {
        match security.security_type {
            SecurityType::Indices => {
                let contract_info = self.fetch_contract_info(&security.symbol).await?;
                let expiry = select_expiry(&contract_info.expiry_dates)?;
                Ok(expiry.clone())
            }
            SecurityType::Equity => {
                if let Some(expiry) = self.cached_equity_expiry.read().await.as_ref() {
                    return Ok(expiry.clone());
                }

                let contract_info = self.fetch_contract_info(&security.symbol).await?;
                let expiry = select_expiry(&contract_info.expiry_dates)?.clone();

                let mut cache = self.cached_equity_expiry.write().await;
                *cache = Some(expiry.clone());
                debug!(expiry = %expiry, "cached equity expiry");

                Ok(expiry)
            }
        }
    }

    // -----------------------------------------------
    // OPTION CHAIN
    // -----------------------------------------------
    pub async fn fetch_option_chain(
        &self,
        security: &Security,
        expiry: &str,
    ) -> Result<OptionChain> {
        let typ = match security.security_type {
            SecurityType::Equity => "Equity",
            SecurityType::Indices => "Indices",
        };

        let url = config::nse_option_chain_url(typ, &security.symbol, expiry);
        let text = self.fetch_json(&url).await?;
        let chain: OptionChain =
            serde_json::from_str(&text).context("Failed to parse option chain")?;

        Ok(chain)
    }

    // -----------------------------------------------
    // DAILY PRICE HISTORY
    // -----------------------------------------------

    /// Daily bars for the trailing screener window, oldest first.
    pub async fn fetch_price_history(&self, symbol: &str) -> Result<Vec<PriceBar>> {
        let to = Local::now().date_naive();
        let from = to - ChronoDuration::days(config::HISTORY_WINDOW_DAYS);
        self.fetch_price_history_between(symbol, from, to).await
    }

    pub async fn fetch_price_history_between(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let url = config::nse_price_history_url(
            symbol,
            &from.format("%d-%m-%Y").to_string(),
            &to.format("%d-%m-%Y").to_string(),
        );

        let text = self.fetch_json(&url).await?;
        let response: PriceHistoryResponse =
            serde_json::from_str(&text).context("Failed to parse price history")?;

        to_price_bars(response.data)
    }

    // -----------------------------------------------
    // BATCH FETCHES
    // -----------------------------------------------

    /// Fetch every security's option chain with bounded concurrency.
    pub async fn fetch_all_option_chains(
        self: Arc<Self>,
        securities: Vec<Security>,
        max_concurrent: usize,
    ) -> Vec<Result<(Security, OptionChain)>> {
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut handles = vec![];

        for security in securities {
            let client = Arc::clone(&self);
            let sem = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|e| anyhow!("Semaphore error: {}", e))?;

                let expiry = client.resolve_expiry(&security).await?;
                let chain = client.fetch_option_chain(&security, &expiry).await?;

                Ok((security, chain))
            });

            handles.push(handle);
        }

        let mut results = vec![];
        for handle in handles {
            match handle.await {
                Ok(res) => results.push(res),
                Err(e) => results.push(Err(anyhow!("Task error: {}", e))),
            }
        }

        results
    }

    /// Fetch daily history for many symbols, preserving input order.
    pub async fn fetch_price_histories(
        self: Arc<Self>,
        symbols: Vec<String>,
        max_concurrent: usize,
    ) -> Vec<(String, Result<Vec<PriceBar>>)> {
        stream::iter(symbols)
            .map(|symbol| {
                let client = Arc::clone(&self);
                async move {
                    let bars = client.fetch_price_history(&symbol).await;
                    (symbol, bars)
                }
            })
            .buffered(max_concurrent)
            .collect()
            .await
    }
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES.choose(&mut thread_rng()).unwrap();
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Ok(Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_expiry_skips_past_dates() {
        let today = Local::now().date_naive();
        let past = (today - ChronoDuration::days(7)).format("%d-%b-%Y").to_string();
        let future = (today + ChronoDuration::days(7)).format("%d-%b-%Y").to_string();

        let dates = vec![past, future.clone()];
        assert_eq!(select_expiry(&dates).unwrap(), &future);
    }

    #[test]
    fn test_select_expiry_prefers_nearest_future() {
        let today = Local::now().date_naive();
        let near = (today + ChronoDuration::days(3)).format("%d-%b-%Y").to_string();
        let far = (today + ChronoDuration::days(30)).format("%d-%b-%Y").to_string();

        // Deliberately unsorted input
        let dates = vec![far, near.clone()];
        assert_eq!(select_expiry(&dates).unwrap(), &near);
    }

    #[test]
    fn test_select_expiry_empty_list_errors() {
        assert!(select_expiry(&[]).is_err());
    }
}
