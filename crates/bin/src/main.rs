//! etfmon CLI binary.
//!
//! Serves the upload API or runs a one-off analysis of a constituent file.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use etfmon::{EtfAnalyzer, ExportFormat, PriceStore, export_report};
use etfmon_server::{Server, ServerConfig, load_dotenv};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "etfmon")]
#[command(about = "Synthetic ETF price monitor", long_about = None)]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, global = true, env = "ETFMON_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Historical price CSV
        #[arg(long)]
        prices: Option<PathBuf>,
    },

    /// Analyze a constituent CSV file
    Analyze {
        /// CSV file with `name` and `weight` columns
        file: PathBuf,

        /// Historical price CSV
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Allowed deviation of the weight sum from 1.0
        #[arg(long)]
        tolerance: Option<f64>,

        /// Number of top holdings to show
        #[arg(long)]
        top: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Directory to export report tables into
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export file format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        export_format: ExportFormat,
    },

    /// List the symbols available in the price data
    Symbols {
        /// Historical price CSV
        #[arg(long)]
        prices: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so `--format json` output stays clean.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    load_dotenv(Path::new("."));

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            prices,
        } => {
            let mut config = resolve_config(config.as_deref())?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(prices) = prices {
                config.prices_path = prices;
            }
            serve(config).await?;
        }
        Commands::Analyze {
            file,
            prices,
            tolerance,
            top,
            format,
            export,
            export_format,
        } => {
            let mut config = resolve_config(None)?;
            if let Some(prices) = prices {
                config.prices_path = prices;
            }
            if let Some(tolerance) = tolerance {
                config.weight_tolerance = tolerance;
            }
            if let Some(top) = top {
                config.top_n = top;
            }
            analyze_file(&config, &file, format, export.as_deref(), export_format)?;
        }
        Commands::Symbols { prices } => {
            let mut config = resolve_config(None)?;
            if let Some(prices) = prices {
                config.prices_path = prices;
            }
            list_symbols(&config)?;
        }
    }

    Ok(())
}

/// File (if given), then environment, on top of defaults.
fn resolve_config(path: Option<&Path>) -> Result<ServerConfig, Box<dyn Error>> {
    let mut config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ServerConfig::from_file(path)?
        }
        None => ServerConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn build_analyzer(config: &ServerConfig) -> Result<EtfAnalyzer, Box<dyn Error>> {
    let store = Arc::new(PriceStore::from_csv(config.prices_path.clone()));
    Ok(EtfAnalyzer::new(store, config.validator()?).with_top_n(config.top_n))
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn Error>> {
    info!("etfmon server v{}", etfmon::VERSION);

    let analyzer = build_analyzer(&config)?;
    if let Err(e) = analyzer.store().load() {
        warn!(
            "Price data not loaded at startup, uploads will retry: {}",
            e
        );
    }

    Server::new(config, analyzer).start().await?;
    Ok(())
}

fn analyze_file(
    config: &ServerConfig,
    file: &Path,
    format: OutputFormat,
    export: Option<&Path>,
    export_format: ExportFormat,
) -> Result<(), Box<dyn Error>> {
    let analyzer = build_analyzer(config)?;
    let content = std::fs::read(file)?;
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let report = analyzer.analyze_csv(&content, &filename)?;

    match format {
        OutputFormat::Text => print!("{}", report.to_ascii_table()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if let Some(dir) = export {
        for path in export_report(&report, dir, export_format)? {
            info!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn list_symbols(config: &ServerConfig) -> Result<(), Box<dyn Error>> {
    let store = PriceStore::from_csv(config.prices_path.clone());
    let table = store.snapshot()?;

    println!("Price data: {}", store.source());
    if let Some((first, last)) = table.date_range() {
        println!("Dates: {} to {} ({} rows)", first, last, table.height());
    }
    let symbols = table.symbols();
    println!("Symbols ({}):", symbols.len());
    for symbol in symbols {
        println!("  {}", symbol);
    }

    Ok(())
}
