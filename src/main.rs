use std::sync::Arc;

use hearth::config::Config;
use hearth::handler::{MetricsHandler, Router, StaticFileHandler};
use hearth::http::stats::ConnectionStats;
use hearth::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let stats = Arc::new(ConnectionStats::new());

    let static_files = Arc::new(StaticFileHandler::new(&cfg.static_files.root));
    let mut router = Router::new().route("/api/", MetricsHandler::new(Arc::clone(&stats)));
    router.add_route("/css/", static_files.clone());
    router.add_route("/js/", static_files.clone());
    router.add_route("/", static_files);

    let server = Server::bind(&cfg.server, Arc::new(router), stats).await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
        })
        .await
}
