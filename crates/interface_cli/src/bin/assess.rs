//! Scoring Engine - Assessment CLI
//!
//! # Usage
//!
//! ```bash
//! # Underwriting risk for one application
//! assess --product-line AUTO --mode risk --input application.json
//!
//! # Fraud screening for a file of claims
//! assess --product-line HOME --mode fraud --batch --input claims.json
//!
//! # Subject on stdin
//! echo '{"age": 22}' | assess --product-line AUTO
//! ```
//!
//! # Environment Variables
//!
//! * `SCORING_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `SCORING_LOG_FORMAT` - `text` or `json` (default: text)
//! * `SCORING_FACTOR_TABLE` - Path of a factor table replacing the built-in one
//! * `SCORING_MAX_CONCURRENCY` - Batch worker threads (default: CPU count)
//! * `SCORING_IMPORTANCE_RATIO` - Recommendation importance ratio (default: 0.5)
//! * `SCORING_MAX_RECOMMENDATIONS` - Recommendations per verdict (default: 5)

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use interface_cli::{
    config::{CliConfig, LogFormat},
    run, Args,
};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = load_config();

    init_tracing(&config.log_level, config.log_format);

    tracing::debug!(
        product_line = %args.product_line,
        mode = %args.mode,
        batch = args.batch,
        "Starting assessment"
    );

    run(&args, &config)
}

/// Loads settings from the environment, falling back to defaults
fn load_config() -> CliConfig {
    CliConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Ignoring invalid SCORING_* settings: {e}");
        CliConfig::default()
    })
}

/// Initializes the tracing subscriber on stderr, keeping stdout for JSON
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
