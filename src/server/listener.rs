use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::ServerConfig;
use crate::handler::Dispatcher;
use crate::http::connection::{Connection, ConnectionError, Outcome};
use crate::http::stats::ConnectionStats;

pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<dyn Dispatcher>,
    stats: Arc<ConnectionStats>,
    permits: Arc<Semaphore>,
}

impl Server {
    /// Binds the listening socket.
    pub async fn bind(
        cfg: &ServerConfig,
        dispatcher: Arc<dyn Dispatcher>,
        stats: Arc<ConnectionStats>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&cfg.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
        Ok(Self::from_listener(listener, cfg.max_connections, dispatcher, stats))
    }

    pub fn from_listener(
        listener: TcpListener,
        max_connections: usize,
        dispatcher: Arc<dyn Dispatcher>,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        Self {
            listener,
            dispatcher,
            stats,
            permits: Arc::new(Semaphore::new(max_connections.max(1))),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves connections until `shutdown` completes.
    ///
    /// Connections still in flight at that point are aborted.
    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("Listening on {}", self.local_addr()?);

        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = joined {
                    error!(error = %e, "Connection task failed");
                }
            }

            let permit = tokio::select! {
                _ = &mut shutdown => break,
                permit = Arc::clone(&self.permits).acquire_owned() => {
                    permit.context("connection limiter closed")?
                }
            };

            let (socket, peer) = tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "Failed to accept connection");
                        continue;
                    }
                },
            };
            debug!("Accepted connection from {}", peer);

            let conn = Connection::new(
                socket,
                Arc::clone(&self.dispatcher),
                Arc::clone(&self.stats),
            );
            tasks.spawn(
                async move {
                    log_outcome(conn.run().await);
                    drop(permit);
                }
                .instrument(info_span!("connection", %peer)),
            );
        }

        info!(in_flight = tasks.len(), "Stopping accept loop");
        tasks.shutdown().await;
        Ok(())
    }
}

fn log_outcome(result: Result<Outcome, ConnectionError>) {
    match result {
        Ok(Outcome::Responded(status)) => debug!(status = status.as_u16(), "Connection closed"),
        Ok(Outcome::PeerClosed) => debug!("Connection closed by peer"),
        Err(ConnectionError::Io(e)) if e.kind() == io::ErrorKind::ConnectionReset => {
            debug!("Connection reset by peer")
        }
        Err(e) => warn!(error = %e, "Connection error"),
    }
}
