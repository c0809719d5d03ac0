//! Background task queue.
//!
//! Handlers submit work to a bounded channel drained by a fixed pool of
//! workers. Every task gets an id whose status can be polled while it runs
//! and for a bounded time after it finishes.

mod queue;
mod registry;
mod types;

pub use queue::{TaskQueue, TaskWorkers};
pub use registry::{Retention, TaskRegistry};
pub use types::{DataOperation, TaskKind, TaskRecord, TaskStatus};
