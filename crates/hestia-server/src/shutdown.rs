//! Graceful shutdown coordination.
//!
//! [`ShutdownSignal`] is a cloneable latch: once triggered it stays
//! triggered and every pending or future [`ShutdownSignal::recv`] completes.
//! [`ConnectionTracker`] counts open connections so the server can wait for
//! them to drain before returning.
//!
//! # Example
//!
//! ```rust
//! use hestia_server::ShutdownSignal;
//!
//! let shutdown = ShutdownSignal::new();
//! let observer = shutdown.clone();
//!
//! shutdown.trigger();
//! assert!(observer.is_shutdown());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};

/// A latch that triggers graceful shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Triggers shutdown. Idempotent.
    pub fn trigger(&self) {
        self.sender.send_if_modified(|triggered| {
            if *triggered {
                false
            } else {
                *triggered = true;
                true
            }
        });
    }

    /// Returns `true` once shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Completes when shutdown is triggered, immediately if it already was.
    pub async fn recv(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this cannot observe a
        // closed channel.
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }

    /// Creates a signal that triggers on SIGTERM or SIGINT (Ctrl+C on
    /// non-Unix targets).
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            wait_for_os_signal().await;
            trigger.trigger();
        });

        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "Failed to register signal handlers, falling back to Ctrl+C");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown"),
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(e) => {
            // Without a signal source, never trigger.
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

/// Counts open connections.
///
/// Each connection holds a [`ConnectionToken`]; dropping the last token
/// wakes [`ConnectionTracker::wait_for_drain`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl ConnectionTracker {
    /// Creates a tracker with no connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection for as long as the token lives.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            active: Arc::clone(&self.active),
            drained: Arc::clone(&self.drained),
        }
    }

    /// Returns the number of open connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Completes once no connections remain.
    pub async fn wait_for_drain(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Register interest before checking, so a drop between the
            // check and the await is not missed.
            notified.as_mut().enable();

            if self.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Token held by an open connection.
#[derive(Debug)]
pub struct ConnectionToken {
    active: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }
}
