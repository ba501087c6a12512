mod config;
mod summary;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use stockview_core::{normalize_symbol, DataProvider, DisplayPeriod, Overlays};
use stockview_data::CsvDataProvider;
use stockview_engine::build_display_table;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "stockview")]
#[command(about = "Daily stock charts: moving averages, Bollinger Bands, Ichimoku, RSI and MACD")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Config file (defaults to ./stockview.toml when present)
    #[arg(long, env = "STOCKVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding one <SYMBOL>.csv per symbol
    #[arg(long, env = "STOCKVIEW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the latest prices and indicator values for a symbol
    Show {
        /// Stock code (4-digit codes get the Tokyo ".T" suffix)
        symbol: String,

        /// Display period (1mo, 3mo, 6mo, 1y, 2y, 5y)
        #[arg(short, long)]
        period: Option<DisplayPeriod>,

        /// Number of trailing rows to print
        #[arg(long, default_value = "5")]
        rows: usize,

        /// Indicator groups to leave out of the report
        #[arg(long, value_enum)]
        hide: Vec<OverlayGroup>,

        /// Treat this date as today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Write the display table as JSON or CSV
    Export {
        symbol: String,

        #[arg(short, long)]
        period: Option<DisplayPeriod>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indicator groups to leave out of CSV output
        #[arg(long, value_enum)]
        hide: Vec<OverlayGroup>,

        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Start the JSON API server
    Serve {
        /// Bind address
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// List the available display periods
    Periods,

    /// List symbols found in the data directory
    Symbols,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OverlayGroup {
    Ma5,
    Ma25,
    Ma75,
    VolumeMa20,
    Bollinger,
    Ichimoku,
    Rsi,
    Macd,
}

fn apply_hidden(mut overlays: Overlays, hide: &[OverlayGroup]) -> Overlays {
    for group in hide {
        let flag = match group {
            OverlayGroup::Ma5 => &mut overlays.ma5,
            OverlayGroup::Ma25 => &mut overlays.ma25,
            OverlayGroup::Ma75 => &mut overlays.ma75,
            OverlayGroup::VolumeMa20 => &mut overlays.volume_ma20,
            OverlayGroup::Bollinger => &mut overlays.bollinger,
            OverlayGroup::Ichimoku => &mut overlays.ichimoku,
            OverlayGroup::Rsi => &mut overlays.rsi,
            OverlayGroup::Macd => &mut overlays.macd,
        };
        *flag = false;
    }
    overlays
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Show {
            symbol,
            period,
            rows,
            hide,
            as_of,
        } => {
            let result = load(&config, &symbol, period, as_of).await?;
            let overlays = apply_hidden(config.overlays, &hide);
            print!("{}", summary::render_summary(&result, &overlays.columns(), rows));
        }
        Commands::Export {
            symbol,
            period,
            format,
            output,
            hide,
            as_of,
        } => {
            let result = load(&config, &symbol, period, as_of).await?;
            let overlays = apply_hidden(config.overlays, &hide);

            let mut writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(std::io::BufWriter::new(
                    std::fs::File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                )),
                None => Box::new(std::io::stdout().lock()),
            };
            match format {
                ExportFormat::Json => {
                    serde_json::to_writer_pretty(&mut writer, &result)?;
                    writeln!(writer)?;
                }
                ExportFormat::Csv => {
                    stockview_data::csv_writer::write_table_csv(
                        &result.table,
                        &overlays.columns(),
                        &mut writer,
                    )?;
                }
            }
            writer.flush()?;
            if let Some(path) = output {
                tracing::info!(path = %path.display(), rows = result.table.len(), "Export written");
            }
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let mut state = stockview_api::AppState::new(Arc::new(CsvDataProvider::new(&config.data_dir)));
            state.lookback = config.lookback();
            state.default_period = config.default_period;
            stockview_api::start_server(state, &bind).await?;
        }
        Commands::Periods => {
            println!("Available display periods:");
            for period in DisplayPeriod::ALL {
                let marker = if period == config.default_period { " (default)" } else { "" };
                println!("  {:<4} {:>5} days{}", period.label(), period.days(), marker);
            }
        }
        Commands::Symbols => {
            let provider = CsvDataProvider::new(&config.data_dir);
            let symbols = provider.available_symbols().await?;
            if symbols.is_empty() {
                println!("No symbols found in {}", config.data_dir.display());
            }
            for symbol in symbols {
                println!("  {}", symbol);
            }
        }
    }

    Ok(())
}

async fn load(
    config: &AppConfig,
    symbol: &str,
    period: Option<DisplayPeriod>,
    as_of: Option<NaiveDate>,
) -> Result<stockview_engine::DisplayTable> {
    let symbol = normalize_symbol(symbol)?;
    let period = period.unwrap_or(config.default_period);
    let today = as_of.unwrap_or_else(|| Local::now().date_naive());
    let provider = CsvDataProvider::new(&config.data_dir);

    build_display_table(&provider, &symbol, period, today, config.lookback())
        .await
        .with_context(|| format!("Could not retrieve data for '{}'", symbol))
}
