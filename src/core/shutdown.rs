//! Shutdown coordination for the host loop
//!
//! Signals flip a shared flag and broadcast on a channel. The async host loop
//! selects on the channel; library threads, which are plain OS threads, watch
//! the flag. A second signal exits immediately.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Exit status used when a second signal forces the process down
pub const FORCED_EXIT_CODE: i32 = 130;

pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);
        let coordinator = Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        };
        (coordinator, shutdown_rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Shared flag for threads that cannot await the channel
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_requested)
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Run `future_fn` with signal handlers installed
    ///
    /// Must be called from within a tokio runtime; the handlers are spawned
    /// onto it.
    pub async fn guard_with_coordinator<F, Fut, R, E>(future_fn: F) -> Result<R, E>
    where
        F: FnOnce(Self, broadcast::Receiver<()>) -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
    {
        let (coordinator, shutdown_rx) = Self::new();
        install_signal_handlers(
            coordinator.shutdown_tx.clone(),
            coordinator.flag(),
        );
        future_fn(coordinator, shutdown_rx).await
    }
}

/// Record one signal; the second one terminates the process
fn on_signal(
    tx: &broadcast::Sender<()>,
    requested: &AtomicBool,
    signal_count: &AtomicUsize,
) {
    let prev = signal_count.fetch_add(1, Ordering::AcqRel);
    requested.store(true, Ordering::Release);
    let _ = tx.send(());
    if prev >= 1 {
        log::warn!("Second shutdown signal received; exiting");
        std::process::exit(FORCED_EXIT_CODE);
    }
    log::info!("Shutdown requested; draining event queues");
}

fn install_signal_handlers(shutdown_tx: broadcast::Sender<()>, shutdown_requested: Arc<AtomicBool>) {
    let signal_count = Arc::new(AtomicUsize::new(0));

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        // Restore default SIGPIPE so piping the summary into `head` ends quietly
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        for kind in [
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ] {
            let tx = shutdown_tx.clone();
            let requested = Arc::clone(&shutdown_requested);
            let counter = Arc::clone(&signal_count);
            tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    while sig.recv().await.is_some() {
                        on_signal(&tx, &requested, &counter);
                    }
                }
            });
        }
    }

    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            on_signal(&shutdown_tx, &shutdown_requested, &signal_count);
        }
    });
}
