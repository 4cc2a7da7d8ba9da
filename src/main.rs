use anyhow::Context;

use pengyou_backend::config::Config;
use pengyou_backend::db::migrate::run_migrations;
use pengyou_backend::db::Database;
use pengyou_backend::logging::{init_tracing, FileLogSettings};
use pengyou_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log_level, FileLogSettings::from_env());

    let db = Database::connect(&config.database_path)
        .await
        .with_context(|| format!("opening database {}", config.database_path.display()))?;

    let applied = run_migrations(&db).await.context("applying migrations")?;
    if applied > 0 {
        tracing::info!(applied, "database migrations applied");
    }

    let state = AppState::new(db.clone(), config.expose_error_details);
    let app = pengyou_backend::build_app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, database = %config.database_path.display(), "pengyou-backend listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("HTTP server stopped, closing database");
    db.close().await;
    tracing::info!("Graceful shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
