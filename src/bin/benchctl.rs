use std::path::PathBuf;

use anyhow::Result;
use tracing::Level;

use priobench::client;
use priobench::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .init();

    let socket_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| ServerConfig::default().socket_path);

    let results = client::run_benchmark(&socket_path).await?;

    println!("priority read:        {} us", results.read_us);
    println!("priority raise/lower: {} us", results.write_us);
    println!("fenced increment:     {} us", results.fenced_increment_us);
    println!("unfenced increment:   {} us", results.unfenced_increment_us);

    Ok(())
}
