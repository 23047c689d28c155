use crate::analysis::{self, PcrSummary, SentimentScale};
use crate::indicators::{compute_indicators, IndicatorSeries};
use crate::nse::{config, models::PriceBar, models::Security, NSEClient};
use crate::screener::{self, BiasRubric, ScreenerRow};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PcrAnalysisQuery {
    pub symbol: String,
    pub expiry: String,
    /// "canonical" (default) or "legacy"
    pub scale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScreenerQuery {
    pub symbol: String,
    /// "two-point", "three-point" (default) or "three-point-two-way"
    pub rubric: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchPcrQuery {
    pub scale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T, start: Instant) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: Some(start.elapsed().as_millis() as u64),
        }
    }

    fn err(message: String, start: Instant) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            processing_time_ms: Some(start.elapsed().as_millis() as u64),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SecurityListResponse {
    pub indices: Vec<String>,
    pub equities: HashMap<String, Vec<String>>, // grouped by first letter
}

#[derive(Debug, Serialize)]
pub struct ScreenerResponse {
    pub symbol: String,
    pub latest: ScreenerRow,
    pub series: IndicatorSeries,
    pub bars: Vec<PriceBar>,
}

#[derive(Debug, Serialize)]
pub struct BatchPcrResponse {
    pub summary: BatchSummary,
    pub readings: Vec<PcrSummary>,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total_securities: usize,
    pub successful: usize,
    pub failed: usize,
    pub processing_time_ms: u64,
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    client: Arc<NSEClient>,
    cache: Arc<RwLock<Cache>>,
}

#[derive(Default)]
struct Cache {
    securities_list: Option<(Vec<Security>, Instant)>,
    price_history: HashMap<String, (Vec<PriceBar>, Instant)>,
}

const CACHE_DURATION: Duration = Duration::from_secs(300); // 5 minutes

impl AppState {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Arc::new(NSEClient::new()?),
            cache: Arc::new(RwLock::new(Cache::default())),
        })
    }
}

fn parse_scale(raw: Option<&str>) -> Result<SentimentScale, String> {
    match raw {
        None | Some("canonical") => Ok(SentimentScale::canonical()),
        Some("legacy") => Ok(SentimentScale::legacy_four_band()),
        Some(other) => Err(format!(
            "Unknown scale '{}', expected 'canonical' or 'legacy'",
            other
        )),
    }
}

fn parse_rubric(raw: Option<&str>) -> Result<BiasRubric, String> {
    match raw {
        Some("two-point") => Ok(BiasRubric::TwoPoint),
        None | Some("three-point") => Ok(BiasRubric::ThreePoint),
        Some("three-point-two-way") => Ok(BiasRubric::ThreePointTwoWay),
        Some(other) => Err(format!(
            "Unknown rubric '{}', expected 'two-point', 'three-point' or 'three-point-two-way'",
            other
        )),
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/securities - full FNO universe, indices and equities grouped
async fn get_securities(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<SecurityListResponse>>, StatusCode> {
    let start_time = Instant::now();

    // Check cache first
    {
        let cache = app_state.cache.read().await;
        if let Some((securities, cached_at)) = &cache.securities_list {
            if cached_at.elapsed() < CACHE_DURATION {
                return Ok(Json(ApiResponse::ok(
                    format_securities_response(securities),
                    start_time,
                )));
            }
        }
    }

    match app_state.client.fetch_fno_list().await {
        Ok(securities) => {
            let response = format_securities_response(&securities);
            let mut cache = app_state.cache.write().await;
            cache.securities_list = Some((securities, Instant::now()));
            Ok(Json(ApiResponse::ok(response, start_time)))
        }
        Err(e) => Ok(Json(ApiResponse::err(e.to_string(), start_time))),
    }
}

/// GET /api/pcr-analysis?symbol=NIFTY&expiry=30-Dec-2025[&scale=canonical]
async fn get_pcr_analysis(
    Query(query): Query<PcrAnalysisQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<PcrSummary>>, StatusCode> {
    let start_time = Instant::now();

    let scale = match parse_scale(query.scale.as_deref()) {
        Ok(scale) => scale,
        Err(msg) => return Ok(Json(ApiResponse::err(msg, start_time))),
    };

    let security = if config::NSE_INDICES.contains(&query.symbol.as_str()) {
        Security::index(query.symbol.clone())
    } else {
        Security::equity(query.symbol.clone())
    };

    match app_state
        .client
        .fetch_option_chain(&security, &query.expiry)
        .await
    {
        Ok(chain) => match analysis::analyze_chain(&query.symbol, &chain, scale) {
            Ok(summary) => Ok(Json(ApiResponse::ok(summary, start_time))),
            // Zero call OI propagates as a failure, never as ratio 0
            Err(e) => Ok(Json(ApiResponse::err(e.to_string(), start_time))),
        },
        Err(e) => Ok(Json(ApiResponse::err(e.to_string(), start_time))),
    }
}

/// GET /api/screener?symbol=RELIANCE[&rubric=three-point]
async fn get_screener(
    Query(query): Query<ScreenerQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<ScreenerResponse>>, StatusCode> {
    let start_time = Instant::now();

    let rubric = match parse_rubric(query.rubric.as_deref()) {
        Ok(rubric) => rubric,
        Err(msg) => return Ok(Json(ApiResponse::err(msg, start_time))),
    };

    let bars = {
        let cache = app_state.cache.read().await;
        cache
            .price_history
            .get(&query.symbol)
            .filter(|(_, cached_at)| cached_at.elapsed() < CACHE_DURATION)
            .map(|(bars, _)| bars.clone())
    };

    let bars = match bars {
        Some(bars) => bars,
        None => match app_state.client.fetch_price_history(&query.symbol).await {
            Ok(bars) => {
                let mut cache = app_state.cache.write().await;
                cache
                    .price_history
                    .insert(query.symbol.clone(), (bars.clone(), Instant::now()));
                bars
            }
            Err(e) => return Ok(Json(ApiResponse::err(e.to_string(), start_time))),
        },
    };

    match screener::screen_symbol(&query.symbol, &bars, rubric) {
        Ok(latest) => {
            let series = compute_indicators(&bars);
            Ok(Json(ApiResponse::ok(
                ScreenerResponse {
                    symbol: query.symbol,
                    latest,
                    series,
                    bars,
                },
                start_time,
            )))
        }
        Err(e) => Ok(Json(ApiResponse::err(e.to_string(), start_time))),
    }
}

/// POST /api/batch-pcr - PCR sweep across the whole FNO universe
async fn run_batch_pcr(
    Query(query): Query<BatchPcrQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<BatchPcrResponse>>, StatusCode> {
    let start_time = Instant::now();

    let scale = match parse_scale(query.scale.as_deref()) {
        Ok(scale) => scale,
        Err(msg) => return Ok(Json(ApiResponse::err(msg, start_time))),
    };

    let securities = match app_state.client.fetch_fno_list().await {
        Ok(securities) => securities,
        Err(e) => {
            return Ok(Json(ApiResponse::err(
                format!("Failed to fetch securities list: {}", e),
                start_time,
            )));
        }
    };

    let total_securities = securities.len();
    let results = app_state
        .client
        .clone()
        .fetch_all_option_chains(securities, config::get_max_concurrent())
        .await;

    let mut readings = Vec::new();
    let mut failed = 0usize;

    for result in results {
        match result {
            Ok((security, chain)) => {
                match analysis::analyze_chain(&security.symbol, &chain, scale) {
                    Ok(summary) => readings.push(summary),
                    Err(_) => failed += 1,
                }
            }
            Err(_) => failed += 1,
        }
    }

    let summary = BatchSummary {
        total_securities,
        successful: readings.len(),
        failed,
        processing_time_ms: start_time.elapsed().as_millis() as u64,
    };

    Ok(Json(ApiResponse::ok(
        BatchPcrResponse { summary, readings },
        start_time,
    )))
}

// -----------------------------------------------
// HELPER FUNCTIONS
// -----------------------------------------------

fn format_securities_response(securities: &[Security]) -> SecurityListResponse {
    let mut indices = Vec::new();
    let mut equities: HashMap<String, Vec<String>> = HashMap::new();

    for security in securities {
        match security.security_type {
            crate::nse::SecurityType::Indices => indices.push(security.symbol.clone()),
            crate::nse::SecurityType::Equity => {
                let first_letter = security
                    .symbol
                    .chars()
                    .next()
                    .unwrap_or('A')
                    .to_uppercase()
                    .to_string();
                equities
                    .entry(first_letter)
                    .or_default()
                    .push(security.symbol.clone());
            }
        }
    }

    for symbols in equities.values_mut() {
        symbols.sort();
    }
    indices.sort();

    SecurityListResponse { indices, equities }
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub async fn start_server(port: u16) -> Result<()> {
    let app_state = AppState::new()?;

    let app = Router::new()
        .route("/api/securities", get(get_securities))
        .route("/api/pcr-analysis", get(get_pcr_analysis))
        .route("/api/screener", get(get_screener))
        .route("/api/batch-pcr", post(run_batch_pcr))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "market analyzer API listening");
    println!("Market Analyzer API running on http://{}", addr);
    println!("Available endpoints:");
    println!("   GET  /api/securities");
    println!("   GET  /api/pcr-analysis?symbol=NIFTY&expiry=30-Dec-2025[&scale=canonical|legacy]");
    println!("   GET  /api/screener?symbol=RELIANCE[&rubric=two-point|three-point|three-point-two-way]");
    println!("   POST /api/batch-pcr");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
