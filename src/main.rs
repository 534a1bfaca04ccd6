use clap::Parser;
use momentum_sniper::config::{load_config, AppConfig};
use momentum_sniper::model::{LookbackPeriod, RecentWindow, TickerSource};
use momentum_sniper::pipeline::{self, AnalysisRequest};
use momentum_sniper::prompt::{
    parse_csv_path, parse_period, parse_result_count, parse_source_choice, parse_window_choice,
    Prompter,
};
use momentum_sniper::provider::YahooProvider;
use momentum_sniper::report::{log_failures, render_table};
use momentum_sniper::universe::{fetch_sp500_tickers, load_tickers_from_csv};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Ranks tickers by how unusual their recent trading volume is.
///
/// Any option left out is asked for interactively.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Ticker source: 1/sp500 or 2/csv
    #[arg(long, value_parser = parse_source_choice)]
    source: Option<TickerSource>,

    /// CSV file with one ticker per row in the first column (implies --source csv)
    #[arg(long, value_parser = parse_csv_path, conflicts_with = "source")]
    csv: Option<PathBuf>,

    /// Historical lookback: 1mo..11mo, 1y..10y or max
    #[arg(long, value_parser = parse_period)]
    period: Option<LookbackPeriod>,

    /// Recent window: 1/yesterday, 2/three-days or 3/five-days
    #[arg(long, value_parser = parse_window_choice)]
    window: Option<RecentWindow>,

    /// Number of tickers in the final table (greater than 1)
    #[arg(long, value_parser = parse_result_count)]
    count: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), Box<dyn Error>> {
    let mut prompter = Prompter::stdio();
    prompter.say("\nThis program calculates statistics on trading volumes for selected tickers.")?;
    prompter.say("It will yield a list of companies based on their current momentum.\n")?;

    // clap rejects --csv together with --source.
    let source = match (&cli.csv, cli.source) {
        (Some(_), _) => TickerSource::Csv,
        (None, Some(source)) => source,
        (None, None) => prompter.ask_source()?,
    };
    let csv_path = match (source, cli.csv) {
        (TickerSource::Csv, Some(path)) => Some(path),
        (TickerSource::Csv, None) => Some(prompter.ask_csv_path()?),
        (TickerSource::Sp500, _) => None,
    };
    let period = match cli.period {
        Some(period) => period,
        None => prompter.ask_period()?,
    };
    let window = match cli.window {
        Some(window) => window,
        None => prompter.ask_window()?,
    };
    let count = match cli.count {
        Some(count) => count,
        None => prompter.ask_count()?,
    };

    let tickers = match csv_path {
        Some(path) => load_tickers_from_csv(&path)?,
        None => {
            let client = reqwest::Client::builder()
                .user_agent(config.user_agent.as_str())
                .timeout(config.request_timeout())
                .build()?;
            fetch_sp500_tickers(&client, &config.sp500_url).await?
        }
    };

    let provider = YahooProvider::new(&config)?;
    let request = AnalysisRequest {
        tickers,
        period,
        window,
        count,
    };

    let started = chrono::Local::now();
    let report = pipeline::run(&provider, &request, config.fetch_settings()).await?;
    log_failures(&report.failures);
    info!(
        "Ranked {} of {} analyzed tickers in {:.1}s",
        report.results.len(),
        report.analyzed,
        (chrono::Local::now() - started).num_milliseconds() as f64 / 1000.0
    );

    println!(
        "\nStock Volume Analysis Results ({} vs. {}, {}):",
        window,
        period,
        started.format("%Y-%m-%d %H:%M")
    );
    println!("{}", render_table(&report.results));
    Ok(())
}
