use crate::components::cache_service::build_cache;
use crate::components::events_feed::{EventsFeed, EventsFeedComponent, HttpEventSource};
use crate::components::rotation::{RotationHandle, SlideFormatter};
use crate::components::{ComponentManager, Services};
use crate::config::Config;
use crate::error::Error;
use crate::handlers::{build_router, AppState};
use crate::shutdown;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire the pipeline together and serve HTTP until a shutdown signal arrives
pub async fn start_server(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let (feed, rotation, formatter, addr) = {
        let config_read = config.read().await;

        let cache = build_cache(&config_read.cache_backend)?;
        let source = HttpEventSource::new(
            config_read.events_api_url.clone(),
            config_read.fetch_timeout,
        )?;
        info!("Fetching events from {}", source.url());

        let feed = EventsFeed::new(Arc::new(source), cache, config_read.event_limit);
        let rotation = RotationHandle::new(config_read.display_mode, config_read.rotation_period);
        let formatter = Arc::new(SlideFormatter::from_config(&config_read)?);
        let addr = SocketAddr::new(config_read.bind_addr, config_read.port);

        (feed, rotation, formatter, addr)
    };

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));

    // Register the refresh scheduler
    component_manager.register(EventsFeedComponent::new());

    let component_manager = Arc::new(component_manager);

    let services = Services {
        feed: feed.clone(),
        rotation: rotation.clone(),
    };
    component_manager.init_all(services).await?;

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_components = Arc::clone(&component_manager);
    let shutdown_rotation = rotation.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components, shutdown_rotation).await;
    });

    let app = build_router(AppState {
        feed,
        rotation,
        formatter,
    });

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(Error::from)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown_recv.await;
            info!("Received shutdown signal, stopping server...");
        })
        .await
        .map_err(Error::from)?;

    Ok(())
}
