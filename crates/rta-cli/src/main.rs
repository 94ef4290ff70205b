use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "rta")]
#[command(about = "Retail seasonal analytics CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a local fact export (CSV or JSON)
    Analyze {
        /// Fact export path
        #[arg(long)]
        input: PathBuf,

        /// csv | json (default: config /ingest/format, then file extension)
        #[arg(long)]
        format: Option<String>,

        #[command(flatten)]
        opts: AnalysisFlags,
    },

    /// Pull facts from the dashboard API and analyze them
    Fetch {
        /// Dashboard base URL (default: config /source/base_url)
        #[arg(long = "base-url")]
        base_url: Option<String>,

        /// Request timeout (default: config /source/timeout_secs, then 30)
        #[arg(long = "timeout-secs")]
        timeout_secs: Option<u64>,

        #[command(flatten)]
        opts: AnalysisFlags,
    },

    /// Roll raw transactions + products up into a fact CSV
    Rollup {
        #[arg(long)]
        transactions: PathBuf,

        #[arg(long)]
        products: PathBuf,

        /// Output fact CSV
        #[arg(long)]
        out: PathBuf,
    },

    /// Print a data-quality report for a fact export
    Quality {
        #[arg(long)]
        input: PathBuf,

        /// csv | json (default: file extension)
        #[arg(long)]
        format: Option<String>,

        /// Exit non-zero when the report is not clean
        #[arg(long = "fail-on-issues", default_value_t = false)]
        fail_on_issues: bool,
    },

    /// Spend by income band, household size and child status (JSON)
    Demographics {
        #[arg(long)]
        households: PathBuf,

        #[arg(long)]
        transactions: PathBuf,
    },

    /// Every purchase line of one household (JSON array)
    Household {
        /// Household number
        #[arg(long)]
        id: u64,

        #[arg(long)]
        households: PathBuf,

        #[arg(long)]
        transactions: PathBuf,

        #[arg(long)]
        products: PathBuf,
    },

    /// Household and transaction totals plus the first household numbers (JSON)
    Summary {
        #[arg(long)]
        households: PathBuf,

        #[arg(long)]
        transactions: PathBuf,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> local...)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

/// Flags shared by `analyze` and `fetch`. Each overrides its config key.
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisFlags {
    /// Layered config paths in merge order
    #[arg(long = "config")]
    pub config_paths: Vec<String>,

    /// first-seen | sorted
    #[arg(long = "department-order")]
    pub department_order: Option<String>,

    /// Reject the input when any fact breaks the contract
    #[arg(long, conflicts_with = "permissive")]
    pub strict: bool,

    /// Aggregate even when facts break the contract
    #[arg(long)]
    pub permissive: bool,

    /// Write artifacts under the config's /exports/root
    #[arg(long, default_value_t = false)]
    pub export: bool,

    /// Write artifacts under this directory (implies --export)
    #[arg(long = "out-dir")]
    pub out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent when absent.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Analyze {
            input,
            format,
            opts,
        } => commands::analyze::analyze_file(&input, format.as_deref(), &opts).await,

        Commands::Fetch {
            base_url,
            timeout_secs,
            opts,
        } => commands::fetch::fetch_and_analyze(base_url, timeout_secs, &opts).await,

        Commands::Rollup {
            transactions,
            products,
            out,
        } => commands::ingest::rollup(&transactions, &products, &out),

        Commands::Quality {
            input,
            format,
            fail_on_issues,
        } => commands::ingest::quality(&input, format.as_deref(), fail_on_issues).await,

        Commands::Demographics {
            households,
            transactions,
        } => commands::households::demographics(&households, &transactions),

        Commands::Household {
            id,
            households,
            transactions,
            products,
        } => commands::households::household(id, &households, &transactions, &products),

        Commands::Summary {
            households,
            transactions,
        } => commands::households::summary(&households, &transactions),

        Commands::ConfigHash { paths } => {
            let loaded = rta_config::load_layered_yaml(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
