//! HTTP surface of the simulator.
//!
//! Every request, whatever its method and path, goes through the request
//! logger and then into the ordered device handler chain. There are no
//! per-route registrations: the chain owns path matching.

mod handlers;
mod types;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::middleware;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::devices::HandlerChain;
use crate::error::{Result, SimulatorError};
use crate::journal::Journal;
use crate::world::World;

pub use types::ErrorResponse;

/// Application state shared across all requests.
///
/// The world is behind a mutex held for one whole handler call, so each
/// request reads and writes the world without interleaving with another.
pub struct AppState {
    world: Mutex<World>,
    /// Handlers in priority order.
    pub chain: HandlerChain,
    /// Record of served requests.
    pub journal: Journal,
    shutdown: watch::Sender<bool>,
}

impl AppState {
    /// Creates state around `world` with the standard handler chain.
    pub fn new(world: World) -> Self {
        Self::with_chain(world, HandlerChain::standard())
    }

    /// Replaces the request journal, e.g. with a bounded one.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Creates state with a custom handler chain.
    pub fn with_chain(world: World, chain: HandlerChain) -> Self {
        Self {
            world: Mutex::new(world),
            chain,
            journal: Journal::new(),
            shutdown: watch::Sender::new(false),
        }
    }

    /// Exclusive access to the world.
    ///
    /// A poisoned lock is recovered: handlers only ever leave the document
    /// in a complete state.
    pub fn lock_world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Asks the server loop to stop once in-flight replies are delivered.
    pub fn request_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Resolves once [`AppState::request_shutdown`] has been called.
    pub async fn shutdown_signal(&self) {
        let mut rx = self.shutdown.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

/// Builds the axum router: request logger in front of the dispatch fallback.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(handlers::dispatch)
        .with_state(state)
        .layer(middleware::from_fn(handlers::log_request))
}

/// Binds a TCP listener on `addr`.
///
/// # Errors
///
/// Returns `SimulatorError::Bind` if the address cannot be bound.
pub async fn bind(addr: std::net::SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| SimulatorError::Bind { addr, source })
}

/// Serves the API until a shutdown request arrives or `external` resolves.
///
/// The reply to `POST /api/shutdown` is delivered before the listener stops.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `listener` - Bound listener
/// * `external` - Additional stop trigger, e.g. Ctrl-C
///
/// # Errors
///
/// Returns `SimulatorError::Serve` if the server fails.
pub async fn serve(
    state: Arc<AppState>,
    listener: TcpListener,
    external: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "simulator listening");
    }
    let app = router(Arc::clone(&state));
    let stop = async move {
        tokio::select! {
            () = state.shutdown_signal() => info!("stopping after shutdown request"),
            () = external => info!("stopping on signal"),
        }
    };
    axum::serve(listener, app)
        .with_graceful_shutdown(stop)
        .await
        .map_err(SimulatorError::Serve)
}
