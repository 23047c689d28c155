use anyhow::Result;
use colored::Colorize;
use market_analyzer::analysis::{self, PcrSummary, Sentiment, SentimentScale};
use market_analyzer::api_server;
use market_analyzer::app_config::AppConfig;
use market_analyzer::nse::{config, models::Security, NSEClient};
use market_analyzer::screener::{self, BiasRubric};
use market_analyzer::logging;
use std::sync::Arc;

/// Run the PCR sweep across all FNO securities
async fn run_batch() -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Market Analyzer - Batch PCR Sweep".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    let client = Arc::new(NSEClient::new()?);
    let scale = SentimentScale::canonical();

    // Step 1: Fetch all FNO securities
    println!("{}", "Step 1: Fetching all FNO securities...".cyan());
    let securities = client.fetch_fno_list().await?;
    println!("{} Found {} securities", "✓".green(), securities.len());
    println!();

    // Step 2: Bulk fetch all option chains
    println!("{}", "Step 2: Fetching option chains...".cyan());
    let max_concurrent = config::get_max_concurrent();
    println!("{} Max concurrent requests: {}", "ℹ".blue(), max_concurrent);
    println!();

    let start_time = std::time::Instant::now();

    let results = if config::is_ci_environment() {
        let timeout = std::time::Duration::from_secs(config::CI_BATCH_TIMEOUT_SECS);
        match tokio::time::timeout(
            timeout,
            client.clone().fetch_all_option_chains(securities.clone(), max_concurrent),
        )
        .await
        {
            Ok(results) => results,
            Err(_) => {
                println!(
                    "{} Timeout reached after {} seconds - stopping sweep",
                    "⚠".red(),
                    config::CI_BATCH_TIMEOUT_SECS
                );
                securities.iter().map(|_| Err(anyhow::anyhow!("Timeout"))).collect()
            }
        }
    } else {
        client.clone().fetch_all_option_chains(securities.clone(), max_concurrent).await
    };

    let elapsed = start_time.elapsed();

    // Step 3: Run the PCR pipeline per security
    let mut readings: Vec<PcrSummary> = Vec::new();
    let mut failed: Vec<(String, String)> = Vec::new();

    for (security, result) in securities.iter().zip(results.into_iter()) {
        match result {
            Ok((security, chain)) => match analysis::analyze_chain(&security.symbol, &chain, scale) {
                Ok(summary) => {
                    readings.push(summary);
                    print!("{}", ".".green());
                }
                Err(e) => {
                    failed.push((security.symbol.clone(), e.to_string()));
                    print!("{}", "∅".yellow());
                }
            },
            Err(e) => {
                failed.push((security.symbol.clone(), e.to_string()));
                print!("{}", "✗".red());
            }
        }
    }

    println!("\n");

    // Step 4: Summary
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Summary".cyan().bold());
    println!("{}", "=".repeat(60).blue());
    println!("{} Classified: {}", "✓".green(), readings.len());
    println!("{} Failed: {}", "✗".red(), failed.len());
    println!("{} Time taken: {:.2}s", "⏱".yellow(), elapsed.as_secs_f64());
    println!();

    let tally = |sentiment: Sentiment| readings.iter().filter(|r| r.sentiment == sentiment).count();
    println!("{} Strongly Bullish: {}", "▲".green(), tally(Sentiment::StronglyBullish));
    println!("{} Bullish:          {}", "△".green(), tally(Sentiment::Bullish));
    println!("{} Neutral:          {}", "=".white(), tally(Sentiment::Neutral));
    println!("{} Bearish:          {}", "▽".red(), tally(Sentiment::Bearish));
    println!("{} Strongly Bearish: {}", "▼".red(), tally(Sentiment::StronglyBearish));
    println!();

    if !failed.is_empty() {
        println!("{}", "Failed Securities:".red());
        for (symbol, error) in failed.iter().take(10) {
            println!(
                "  {} {} → {}",
                "✗".red(),
                symbol.yellow(),
                error.chars().take(80).collect::<String>()
            );
        }
        if failed.len() > 10 {
            println!("  ... and {} more", failed.len() - 10);
        }
        println!();
    }

    // Step 5: Persist readings for the dashboard
    std::fs::write("batch_pcr.json", serde_json::to_string_pretty(&readings)?)?;
    println!("{} Saved readings to batch_pcr.json", "✓".green());

    println!();
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Done!".green().bold());
    println!("{}", "=".repeat(60).blue());

    Ok(())
}

/// Run the PCR pipeline for one security
async fn run_single(symbol: &str, expiry: &str) -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Market Analyzer - Single Security PCR".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    let client = NSEClient::new()?;

    let security = if config::NSE_INDICES.contains(&symbol) {
        Security::index(symbol.to_string())
    } else {
        Security::equity(symbol.to_string())
    };

    println!("{} Fetching option chain for {}...", "→".cyan(), symbol.yellow());
    println!("{} Expiry: {}", "→".cyan(), expiry.yellow());
    println!();

    let chain = client.fetch_option_chain(&security, expiry).await?;

    println!("{}", "=".repeat(60).blue());
    println!("{}", "Results".cyan().bold());
    println!("{}", "=".repeat(60).blue());
    println!("{} Symbol: {}", "✓".green(), symbol.yellow());
    println!("{} Timestamp: {}", "✓".green(), chain.records.timestamp);
    println!("{} Underlying: {:.2}", "✓".green(), chain.records.underlying_value);
    println!("{} Strikes: {}", "✓".green(), chain.filtered.data.len());
    println!();

    match analysis::analyze_chain(symbol, &chain, SentimentScale::canonical()) {
        Ok(summary) => {
            println!("{} Call OI: {}", "ℹ".blue(), summary.total_call_oi);
            println!("{} Put OI:  {}", "ℹ".blue(), summary.total_put_oi);
            println!("{} PCR:     {:.3}", "ℹ".blue(), summary.ratio);

            let label = summary.sentiment.to_string();
            let colored_label = match summary.sentiment {
                Sentiment::StronglyBullish | Sentiment::Bullish => label.green().bold(),
                Sentiment::Neutral => label.white().bold(),
                Sentiment::Bearish | Sentiment::StronglyBearish => label.red().bold(),
            };
            println!("{} Sentiment: {}", "★".yellow(), colored_label);
        }
        Err(e) => {
            println!("{} Cannot classify: {}", "⚠".yellow(), e);
        }
    }
    println!("{}", "=".repeat(60).blue());

    Ok(())
}

/// Run the indicator screener for one or more symbols (comma separated)
async fn run_screener(symbols: &str) -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Market Analyzer - Technical Screener".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    let client = Arc::new(NSEClient::new()?);
    let symbols: Vec<String> = symbols
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    println!("{} Fetching {} day history for {} symbol(s)...",
        "→".cyan(),
        config::HISTORY_WINDOW_DAYS,
        symbols.len()
    );
    println!();

    let histories = client
        .fetch_price_histories(symbols, config::get_max_concurrent())
        .await;

    let mut universe = Vec::new();
    for (symbol, result) in histories {
        match result {
            Ok(bars) => universe.push((symbol, bars)),
            Err(e) => println!("{} {} → {}", "✗".red(), symbol.yellow(), e),
        }
    }

    let rows = screener::screen_universe(&universe, BiasRubric::ThreePoint);

    println!("{}", "=".repeat(60).blue());
    println!(
        "{:<12} {:>10} {:>8} {:>10} {:>10}  {}",
        "SYMBOL", "CLOSE", "RSI14", "EMA20", "EMA50", "BIAS"
    );
    println!("{}", "-".repeat(60));
    for row in &rows {
        let fmt = |v: Option<f64>| v.map_or("-".to_string(), |v| format!("{:.2}", v));
        let bias_label = match row.bias {
            screener::Bias::Bullish => row.bias.to_string().green().bold(),
            screener::Bias::Bearish => row.bias.to_string().red().bold(),
            screener::Bias::Neutral => row.bias.to_string().white(),
        };
        println!(
            "{:<12} {:>10.2} {:>8} {:>10} {:>10}  {}",
            row.symbol,
            row.close,
            fmt(row.rsi14),
            fmt(row.ema20),
            fmt(row.ema50),
            bias_label
        );
    }
    println!("{}", "=".repeat(60).blue());

    Ok(())
}

/// Run API server mode
async fn run_server(port: u16) -> Result<()> {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Market Analyzer API Server".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    api_server::start_server(port).await
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let app_config = AppConfig::from_env();
    app_config.validate()?;
    app_config.log_ci_config();

    let symbol = config::get_single_symbol();
    let expiry = config::get_single_expiry();

    match app_config.mode.as_str() {
        "server" => {
            if config::is_ci_environment() {
                // CI only supports batch mode
                println!("{} CI only supports batch mode, running batch instead", "ℹ".blue());
                run_batch().await?;
            } else {
                run_server(app_config.port).await?;
            }
        }
        "batch" => run_batch().await?,
        "single" => {
            if config::is_ci_environment() {
                println!("{} CI only supports batch mode, running batch instead", "ℹ".blue());
                run_batch().await?;
            } else {
                run_single(&symbol, &expiry).await?;
            }
        }
        "screener" => {
            if config::is_ci_environment() {
                println!("{} CI only supports batch mode, running batch instead", "ℹ".blue());
                run_batch().await?;
            } else {
                run_screener(&symbol).await?;
            }
        }
        _ => {
            eprintln!(
                "Invalid mode '{}'. Use 'batch', 'single', 'screener' or 'server'",
                app_config.mode
            );
            eprintln!("Set NSE_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  NSE_MODE=server NSE_PORT=3001 cargo run");
            eprintln!("  NSE_MODE=batch cargo run");
            eprintln!("  NSE_MODE=single NSE_SYMBOL=NIFTY NSE_EXPIRY=30-Dec-2025 cargo run");
            eprintln!("  NSE_MODE=screener NSE_SYMBOL=RELIANCE,TCS,INFY cargo run");
            std::process::exit(1);
        }
    }

    Ok(())
}
