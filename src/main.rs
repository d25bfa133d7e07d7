use signage::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting event signage service");

    // Load configuration
    let config = startup::load_config().await?;

    // Serve until shutdown
    startup::start_server(config).await
}
