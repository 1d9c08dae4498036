//! quotify: random quote screen for the terminal.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quotify::config::Config;
use quotify::terminal;

#[derive(Parser, Debug)]
#[command(name = "quotify", about = "Fetch, speak, copy and share random quotes")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Don't fetch a quote at startup
    #[arg(long)]
    no_initial_fetch: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs share the tty with the screen, so only warnings by default
    let filter = if args.verbose {
        EnvFilter::new("debug,reqwest=info,hyper=info,hyper_util=info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("quotify starting");

    let config = Config::load(args.config.as_deref());
    info!("Config loaded: {:?}", config.api);

    terminal::run(&config, !args.no_initial_fetch).await
}
