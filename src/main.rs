use anyhow::{Context, Result};
use tracing::{info, Level};

use priobench::config::ServerConfig;
use priobench::server::ControlServer;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("starting priobench daemon v{}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::var("PRIOBENCH_CONFIG") {
        Ok(path) => ServerConfig::load_from_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        Err(_) => ServerConfig::default(),
    };
    info!(
        "serving on {}, {} iterations per phase, elevated nice {}",
        config.socket_path.display(),
        config.iterations,
        config.elevated_nice
    );

    ControlServer::new(&config).serve().await?;

    info!("priobench daemon shutdown complete");
    Ok(())
}
