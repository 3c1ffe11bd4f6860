//! Server command implementation

use anyhow::Result;
use spendly_core::AppConfig;

use super::open_db;

pub async fn cmd_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("🚀 Starting Spendly web server...");
    println!("   Database: {}", config.database_path.display());
    println!(
        "   Listening: http://{}:{}",
        config.server.host, config.server.port
    );
    println!(
        "   Request timeout: {}s",
        config.server.request_timeout.as_secs()
    );
    if !config.server.allowed_origins.is_empty() {
        println!(
            "   CORS origins: {}",
            config.server.allowed_origins.join(", ")
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(&config.database_path)?;
    spendly_server::serve(db, config).await?;

    Ok(())
}
