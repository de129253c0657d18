//! Supervision for the long running tasks of a service: panic capture,
//! shutdown signalling and graceful shutdown with a deadline.

mod manager;
mod pending_tasks;
mod print_panic;

pub use manager::{PanickedTaskError, ShutdownGuard, ShutdownSignal, TaskExecutor, TaskManager};
pub use print_panic::set_panic_hook;
