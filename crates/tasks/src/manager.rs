use std::{
    any::Any,
    fmt::{self, Display, Formatter},
    future::Future,
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use futures_util::FutureExt;
use tokio::{
    runtime::Handle,
    sync::{mpsc, Notify},
};
use tracing::{debug, error, info, warn};

use crate::pending_tasks::PendingTasks;

/// Error with the name of the task that panicked and an error downcasted to string, if possible.
#[derive(Debug, thiserror::Error)]
pub struct PanickedTaskError {
    task_name: String,
    error: Option<String>,
}

impl Display for PanickedTaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let task_name = &self.task_name;
        if let Some(error) = &self.error {
            write!(f, "Critical task `{task_name}` panicked: `{error}`")
        } else {
            write!(f, "Critical task `{task_name}` panicked")
        }
    }
}

impl PanickedTaskError {
    fn new(task_name: &str, error: Box<dyn Any + Send>) -> Self {
        let error = match error.downcast::<String>() {
            Ok(value) => Some(*value),
            Err(error) => error.downcast::<&str>().ok().map(|value| value.to_string()),
        };

        Self {
            task_name: task_name.to_string(),
            error,
        }
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }
}

/// Process wide shutdown trigger. Once sent it stays sent.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    fn new() -> Self {
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Send shutdown signal
    pub fn send(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Resolves once [`Self::send`] has been called.
    pub async fn wait(&self) {
        loop {
            // register before checking so a concurrent send can't be missed
            let notified = self.notify.notified();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}

/// Handed to tasks that want to finish their current unit of work before
/// exiting. The manager waits for all guards to drop on shutdown.
#[derive(Debug)]
pub struct ShutdownGuard {
    signal: ShutdownSignal,
    pending: Arc<PendingTasks>,
}

impl ShutdownGuard {
    fn new(signal: ShutdownSignal, pending: Arc<PendingTasks>) -> Self {
        pending.increment();
        Self { signal, pending }
    }

    /// Waits until shutdown signal is sent
    pub async fn wait_for_shutdown(&self) {
        self.signal.wait().await
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.pending.decrement();
    }
}

#[derive(Debug)]
pub struct TaskManager {
    /// Handle to the tokio runtime.
    tokio_handle: Handle,
    /// Sender half for sending panic signals from tasks
    panicked_tasks_tx: mpsc::UnboundedSender<PanickedTaskError>,
    /// Receiver half for sending panic signals to tasks
    panicked_tasks_rx: mpsc::UnboundedReceiver<PanickedTaskError>,
    /// send shutdown signals to tasks
    shutdown_signal: ShutdownSignal,
    /// tasks still holding a shutdown guard
    pending_tasks: Arc<PendingTasks>,
}

impl TaskManager {
    pub fn new(tokio_handle: Handle) -> Self {
        let (panicked_tasks_tx, panicked_tasks_rx) = mpsc::unbounded_channel();

        Self {
            tokio_handle,
            panicked_tasks_tx,
            panicked_tasks_rx,
            shutdown_signal: ShutdownSignal::new(),
            pending_tasks: Arc::new(PendingTasks::default()),
        }
    }

    pub fn executor(&self) -> TaskExecutor {
        TaskExecutor {
            tokio_handle: self.tokio_handle.clone(),
            panicked_tasks_tx: self.panicked_tasks_tx.clone(),
            shutdown_signal: self.shutdown_signal.clone(),
            pending_tasks: self.pending_tasks.clone(),
        }
    }

    /// Get shutdown signal trigger
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown_signal.clone()
    }

    /// Waits until any task panics, returning `Err(first_panic_error)`.
    /// Returns `Ok(())` if the shutdown signal is sent instead.
    fn wait_for_task_panic(&mut self) -> Result<(), PanickedTaskError> {
        let shutdown = self.shutdown_signal.clone();
        let panicked_tasks_rx = &mut self.panicked_tasks_rx;
        self.tokio_handle.block_on(async move {
            tokio::select! {
                msg = panicked_tasks_rx.recv() => match msg {
                    Some(error) => Err(error),
                    None => Ok(()),
                },
                _ = shutdown.wait() => Ok(()),
            }
        })
    }

    /// Waits for all guarded tasks to complete, returning true.
    /// If timeout is provided, returns false if they are still running by then.
    fn wait_for_graceful_shutdown(&self, timeout: Option<Duration>) -> bool {
        let wait = self.pending_tasks.clone().wait_for_zero();
        let done = self.tokio_handle.block_on(async move {
            match timeout {
                Some(t) => tokio::time::timeout(t, wait).await.is_ok(),
                None => {
                    wait.await;
                    true
                }
            }
        });

        if done {
            debug!("gracefully shut down");
        } else {
            debug!(pending = %self.pending_tasks.current(), "graceful shutdown timed out");
        }
        done
    }

    /// Sends shutdown on ctrl-c.
    pub fn start_signal_listeners(&self) {
        let shutdown_signal = self.shutdown_signal();

        self.tokio_handle.spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(%err, "unable to listen for INT");
                return;
            }

            warn!("Got INT. Initiating shutdown");
            shutdown_signal.send()
        });
    }

    /// Blocks until a critical task panics or shutdown is signalled, then
    /// gives guarded tasks up to `shutdown_timeout` to finish.
    pub fn monitor(mut self, shutdown_timeout: Option<Duration>) -> Result<(), PanickedTaskError> {
        let res = self.wait_for_task_panic();

        self.shutdown_signal.send();
        if !self.wait_for_graceful_shutdown(shutdown_timeout) {
            info!("Shutdown timeout expired; Forced shutdown");
        }

        res
    }
}

/// A type that can spawn new tasks
#[derive(Debug, Clone)]
pub struct TaskExecutor {
    /// Handle to the tokio runtime.
    tokio_handle: Handle,
    /// Sender half for sending panic signals from tasks
    panicked_tasks_tx: mpsc::UnboundedSender<PanickedTaskError>,
    /// send shutdown signals to tasks
    shutdown_signal: ShutdownSignal,
    /// tasks still holding a shutdown guard
    pending_tasks: Arc<PendingTasks>,
}

impl TaskExecutor {
    /// Lets a task that finished on its own bring the process down.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown_signal.clone()
    }

    /// Spawns a task that is dropped at its next await point once shutdown is
    /// signalled. A panic is reported to the manager.
    pub fn spawn_critical_async(
        &self,
        name: &'static str,
        fut: impl Future<Output = ()> + Send + 'static,
    ) -> tokio::task::JoinHandle<()> {
        let task = self.catch_panics(name, fut);
        let shutdown = self.shutdown_signal.clone();

        self.tokio_handle.spawn(async move {
            tokio::select! {
                _ = task => {}
                _ = shutdown.wait() => {
                    debug!(%name, "task cancelled by shutdown");
                }
            }
        })
    }

    /// Spawns a task that observes shutdown itself through the guard. The
    /// manager waits for the guard to be dropped before exiting.
    pub fn spawn_critical_async_with_shutdown<F>(
        &self,
        name: &'static str,
        async_func: impl FnOnce(ShutdownGuard) -> F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = ShutdownGuard::new(self.shutdown_signal.clone(), self.pending_tasks.clone());
        let fut = async_func(guard);
        self.tokio_handle.spawn(self.catch_panics(name, fut))
    }

    fn catch_panics(
        &self,
        name: &'static str,
        fut: impl Future<Output = ()> + Send + 'static,
    ) -> impl Future<Output = ()> + Send + 'static {
        let panicked_tasks_tx = self.panicked_tasks_tx.clone();
        async move {
            if let Err(error) = panic::AssertUnwindSafe(fut).catch_unwind().await {
                let task_error = PanickedTaskError::new(name, error);
                error!("{task_error}");
                let _ = panicked_tasks_tx.send(task_error);
            }
        }
    }
}
