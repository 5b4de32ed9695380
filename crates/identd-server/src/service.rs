//! Listener lifecycle and the pending-connection registry.
//!
//! The listening socket exists only while at least one outbound connection
//! attempt is registered as needing ident support. Reference counting is set
//! membership: the first registration binds the listener, the last
//! unregistration closes it. A failed bind is a sticky state surfaced to the
//! caller and the admin surface until the next registration attempt.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex as AsyncMutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use identd_core::owner::{Owner, OwnerDirectory, OwnerId};

use crate::config::IdentConfig;
use crate::handler::serve_connection;
use crate::resolver::Resolver;

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The listener was bound by this call.
    Started,
    /// A listener already existed; the owner joined it.
    AlreadyActive,
    /// Binding failed; the owner proceeds without ident support.
    ListenFailed,
}

/// Listener state as reported by [`IdentService::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerStatus {
    /// No listener and no recorded bind failure.
    Inactive,
    /// Listening on the given address.
    Listening(SocketAddr),
    /// The last bind attempt failed.
    Failed,
}

/// Snapshot of the service for observability.
#[derive(Debug, Clone)]
pub struct IdentStatus {
    /// Listener state.
    pub listener: ListenerStatus,
    /// Labels of currently registered owners.
    pub owners: Vec<String>,
}

struct ActiveListener {
    local_addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

struct ServiceState {
    listener: Option<ActiveListener>,
    registered: HashMap<OwnerId, Arc<dyn Owner>>,
    listen_failed: bool,
}

/// Ref-counted on-demand ident responder.
///
/// Registration and unregistration are serialized behind one lock together
/// with listener start/stop; resolution never takes that lock. A `watch`
/// channel mirrors the registry size so the accept path's gate never
/// contends with the lifecycle lock.
pub struct IdentService {
    config: IdentConfig,
    resolver: Arc<Resolver>,
    state: AsyncMutex<ServiceState>,
    count_tx: watch::Sender<usize>,
    count_rx: watch::Receiver<usize>,
}

impl IdentService {
    /// Create a service over the host's owner directory.
    ///
    /// No socket is bound until the first registration.
    pub fn new(config: IdentConfig, directory: Arc<dyn OwnerDirectory>) -> Self {
        let (count_tx, count_rx) = watch::channel(0usize);
        Self {
            config,
            resolver: Arc::new(Resolver::new(directory)),
            state: AsyncMutex::new(ServiceState {
                listener: None,
                registered: HashMap::new(),
                listen_failed: false,
            }),
            count_tx,
            count_rx,
        }
    }

    /// The resolver backing this service.
    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    /// Register an owner as needing ident service.
    ///
    /// Binds the listener if none exists. On bind failure the registry is
    /// left unchanged and the failure is sticky until the next registration
    /// attempt. Registering an already-registered owner is a no-op.
    pub async fn register(&self, owner: Arc<dyn Owner>) -> RegisterOutcome {
        let mut state = self.state.lock().await;

        let outcome = if state.listener.is_none() {
            let addr = self.config.socket_addr();
            match TcpListener::bind(addr).await {
                Err(e) => {
                    warn!(addr = %addr, error = %e, "Ident listener bind failed");
                    state.listen_failed = true;
                    return RegisterOutcome::ListenFailed;
                }
                Ok(listener) => {
                    let local_addr = match listener.local_addr() {
                        Ok(a) => a,
                        Err(e) => {
                            warn!(addr = %addr, error = %e, "Ident listener bind failed");
                            state.listen_failed = true;
                            return RegisterOutcome::ListenFailed;
                        }
                    };

                    let resolver = Arc::clone(&self.resolver);
                    let count_rx = self.count_rx.clone();
                    let read_timeout = self.config.read_timeout;
                    let max_line = self.config.max_line;
                    let accept_task = tokio::spawn(async move {
                        accept_loop(listener, resolver, count_rx, read_timeout, max_line).await;
                    });

                    info!(addr = %local_addr, "Ident listener bound");
                    state.listen_failed = false;
                    state.listener = Some(ActiveListener {
                        local_addr,
                        accept_task,
                    });
                    RegisterOutcome::Started
                }
            }
        } else {
            RegisterOutcome::AlreadyActive
        };

        let id = owner.id();
        if state.registered.insert(id, owner).is_some() {
            debug!(owner = %id, "Owner already registered");
        }
        let _ = self.count_tx.send(state.registered.len());

        outcome
    }

    /// Unregister an owner; closes the listener once no owner remains.
    ///
    /// Safe to call for an owner that was never registered or when the
    /// listener never started.
    pub async fn unregister(&self, id: OwnerId) {
        let mut state = self.state.lock().await;

        if state.registered.remove(&id).is_none() {
            debug!(owner = %id, "Owner was not registered");
        }
        let _ = self.count_tx.send(state.registered.len());

        if state.registered.is_empty()
            && let Some(active) = state.listener.take()
        {
            // Aborting the accept task drops the TcpListener, closing the
            // socket. In-flight connection tasks finish on their own.
            active.accept_task.abort();
            info!(addr = %active.local_addr, "Ident listener closed");
        }
    }

    /// Current listener state and registered-owner snapshot.
    pub async fn status(&self) -> IdentStatus {
        let state = self.state.lock().await;

        let listener = match &state.listener {
            Some(active) => ListenerStatus::Listening(active.local_addr),
            None if state.listen_failed => ListenerStatus::Failed,
            None => ListenerStatus::Inactive,
        };

        let mut owners: Vec<String> = state.registered.values().map(|o| o.label()).collect();
        owners.sort();

        IdentStatus { listener, owners }
    }

    /// Number of currently registered owners.
    pub fn registered_count(&self) -> usize {
        *self.count_rx.borrow()
    }
}

impl Drop for IdentService {
    fn drop(&mut self) {
        if let Ok(state) = self.state.try_lock()
            && let Some(active) = &state.listener
        {
            active.accept_task.abort();
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    resolver: Arc<Resolver>,
    count_rx: watch::Receiver<usize>,
    read_timeout: std::time::Duration,
    max_line: usize,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                spawn_handler(stream, peer, &resolver, &count_rx, read_timeout, max_line);
            }
            Err(e) => {
                // Transient accept failure; keep listening.
                debug!(error = %e, "Accept error");
            }
        }
    }
}

fn spawn_handler(
    stream: TcpStream,
    peer: SocketAddr,
    resolver: &Arc<Resolver>,
    count_rx: &watch::Receiver<usize>,
    read_timeout: std::time::Duration,
    max_line: usize,
) {
    let resolver = Arc::clone(resolver);
    let count_rx = count_rx.clone();
    tokio::spawn(async move {
        if let Err(e) = serve_connection(stream, resolver, count_rx, read_timeout, max_line).await {
            debug!(peer = %peer, error = %e, "Ident connection failed");
        }
    });
}
