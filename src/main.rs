use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use repo_digest::cli::{exit_code, run_summarize, Args};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.verbose {
        "warn,repo_digest=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(err) = run_summarize(&args).await {
        eprintln!("{} {:#}", console::style("error:").red().bold(), err);
        std::process::exit(exit_code(&err));
    }
}
