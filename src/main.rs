use anyhow::Context as _;
use tokio::{net::TcpListener, signal};

use letsorder_api::{db, routes, services::seed, settings::Settings, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    telemetry::init(&settings.log).context("failed to initialise logging")?;

    let pool = db::connect(&settings.database)
        .await
        .context("failed to open database")?;
    db::migrate(&pool)
        .await
        .context("failed to run database migrations")?;
    if settings.database.seed_demo_data && seed::seed_demo_data(&pool).await? {
        tracing::info!(email = seed::DEMO_EMAIL, "seeded demo restaurant");
    }

    let app = routes::create_app(AppState::new(pool, &settings), &settings.cors);
    let address = settings.bind_address().context("invalid server address")?;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(%address, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
