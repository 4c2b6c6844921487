use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use coldreach_core::config::Config;
use coldreach_duckdb::DuckDbBackend;
use coldreach_server::{app::build_app, state::AppState};

/// `coldreach health`: container liveness probe.
///
/// Calls `GET http://localhost:$COLDREACH_PORT/health` and exits 0 on HTTP
/// 200, 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("COLDREACH_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{port}/health");
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().nth(1).as_deref() == Some("health") {
        run_health_check();
    }

    // Level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coldreach=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    std::fs::create_dir_all(&cfg.data_dir)?;
    let db_path = format!("{}/coldreach.db", cfg.data_dir);
    let db = DuckDbBackend::open(&db_path, &cfg.duckdb_memory_limit)?;

    // Both model types must exist for model selection and the checker rule.
    if let Err(e) = db.seed_models().await {
        tracing::warn!(error = %e, "Failed to register built-in AI models");
    }

    let addr = format!("0.0.0.0:{}", cfg.port);
    let state = Arc::new(AppState::new(db, cfg.clone()));
    let app = build_app(state);

    info!(port = cfg.port, "Coldreach listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
