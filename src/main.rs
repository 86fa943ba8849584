use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subject_portal::{
    api,
    config::Config,
    notify::NotificationBus,
    pdf_store::{LocalPdfStore, PdfLibrary},
    registry::SubjectRegistry,
    session::SessionStore,
    AppState,
};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "subject-portal starting");

    let config = Config::load()?;
    info!(site_dir = %config.storage.site_dir.display(), "Loaded configuration");

    let bus = NotificationBus::new(config.event_buffer);

    let pdf_store = LocalPdfStore::new(&config.storage.pdf_dir)?;
    info!("PDF store at: {}", config.storage.pdf_dir.display());
    let pdfs = PdfLibrary::new(Arc::new(pdf_store), bus.clone());

    let registry = SubjectRegistry::new(
        &config.storage.site_dir,
        &config.storage.subjects_file,
        bus.clone(),
    );
    if registry.ensure_initialized().await? {
        info!(
            "Created subjects document at: {}",
            registry.document_path().display()
        );
    }

    let sessions = SessionStore::new(
        &config.auth.admin_password,
        config.auth.session_ttl_seconds,
    )?;

    let state = Arc::new(AppState {
        config: config.clone(),
        bus,
        pdfs,
        registry,
        sessions,
        shutdown: CancellationToken::new(),
    });

    let sweeper = tokio::spawn(sweep_sessions(Arc::clone(&state)));

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    let shutdown = state.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await?;

    info!("Shutting down background tasks");
    sweeper.abort();

    info!("Shutdown complete");
    Ok(())
}

async fn sweep_sessions(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let removed = state.sessions.purge_expired().await;
        if removed > 0 {
            tracing::debug!(removed, "Swept expired sessions");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
