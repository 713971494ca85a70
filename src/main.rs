use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use estate_api::RestApi;
use estate_storage::EstateContext;

/// Gurgaon real-estate query service
#[derive(Parser, Debug)]
#[command(name = "estate")]
#[command(about = "Apartment recommendations, radius search and price estimates", long_about = None)]
struct Args {
    /// Directory holding manifest.json and the artifacts it names
    #[arg(short, long, env = "ESTATE_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Address the HTTP API binds to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, default_value_t = 8501)]
    http_port: u16,

    /// Log level or filter directives (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Load and verify the artifacts, print a summary and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .with_context(|| format!("invalid log level '{}'", args.log_level))?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting estate v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let ctx = EstateContext::load(&args.data_dir)
        .with_context(|| format!("failed to load artifacts from {}", args.data_dir.display()))?;
    let summary = ctx.summary();
    info!(
        "Serving {} properties, {} locations ({})",
        summary.properties, summary.locations, summary.model
    );

    if args.check {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let ctx = Arc::new(ctx);
    let host = args.host.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(ctx, host, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
