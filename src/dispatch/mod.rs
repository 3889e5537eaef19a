//! Asynchronous delivery.
//!
//! Every matched subscriber gets its own task on a FIFO run-later queue, so a
//! store call returns before any subscriber sees the value and deliveries run
//! in the order they were scheduled.
//!
//! Two schedulers are provided:
//! - `ThreadScheduler`: a dedicated worker thread (the default)
//! - `DeferredScheduler`: a queue drained explicitly by its owner

mod dispatcher;
mod scheduler;

pub use dispatcher::Dispatcher;
pub use scheduler::{DeferredScheduler, Scheduler, Task, ThreadScheduler};
