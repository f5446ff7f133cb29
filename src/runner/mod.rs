//! Sequential task execution with pause/resume/cancel at task boundaries

mod control;
mod executor;
mod observer;
mod retry;

pub use control::ExecutionControl;
pub use executor::{ExecutionSink, NullSink, TaskExecutor};
pub use observer::{ExecutionObserver, TracingObserver};
pub use retry::retry_with_backoff;
