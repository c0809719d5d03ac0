use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::TasksConfig;
use crate::error::{AppError, AppResult};
use crate::tasks::registry::{Retention, TaskRegistry};
use crate::tasks::types::{TaskKind, TaskRecord};

struct QueuedTask {
    id: Uuid,
    kind: TaskKind,
}

/// Simulated durations of the slow task kinds
#[derive(Debug, Clone, Copy)]
struct TaskDelays {
    email: Duration,
    processing: Duration,
}

impl From<&TasksConfig> for TaskDelays {
    fn from(config: &TasksConfig) -> Self {
        Self {
            email: Duration::from_millis(config.email_delay_ms),
            processing: Duration::from_millis(config.processing_delay_ms),
        }
    }
}

/// Producer side of the background task queue.
///
/// Cloning is cheap; clones share the channel and the registry.
#[derive(Clone)]
pub struct TaskQueue {
    sender: mpsc::Sender<QueuedTask>,
    registry: Arc<TaskRegistry>,
    capacity: usize,
}

/// Handle to the worker pool spawned by [`TaskQueue::start`].
///
/// Holds the receiving end of the queue, so the channel stays open for as
/// long as the handle lives even when the pool is empty.
pub struct TaskWorkers {
    workers: JoinSet<()>,
    _receiver: Arc<Mutex<mpsc::Receiver<QueuedTask>>>,
}

impl TaskWorkers {
    /// Wait for every worker to exit; they do once the shutdown token fires
    /// or all queue handles are dropped.
    pub async fn join(mut self) {
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Task worker panicked");
            }
        }
    }
}

impl TaskQueue {
    /// Create the bounded queue and spawn `config.workers` workers draining it.
    pub fn start(config: &TasksConfig, shutdown: CancellationToken) -> (Self, TaskWorkers) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let registry = Arc::new(TaskRegistry::with_retention(Retention::from(config)));
        let delays = TaskDelays::from(config);

        let mut workers = JoinSet::new();
        for worker_id in 0..config.workers {
            workers.spawn(run_worker(
                worker_id,
                Arc::clone(&receiver),
                Arc::clone(&registry),
                delays,
                shutdown.clone(),
            ));
        }

        tracing::info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "Task queue started"
        );

        let queue = Self {
            sender,
            registry,
            capacity: config.queue_capacity.max(1),
        };
        let workers = TaskWorkers {
            workers,
            _receiver: receiver,
        };
        (queue, workers)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots left in the queue right now
    pub fn available(&self) -> usize {
        self.sender.capacity()
    }

    /// Enqueue a task without waiting.
    ///
    /// # Errors
    /// `AppError::QueueFull` when the queue is at capacity.
    pub fn submit(&self, kind: TaskKind) -> AppResult<Uuid> {
        let permit = self.sender.try_reserve().map_err(|e| self.reject(e))?;
        let id = self.register(&kind);
        permit.send(QueuedTask { id, kind });
        Ok(id)
    }

    /// Enqueue several tasks, all or none.
    pub fn submit_all(&self, kinds: Vec<TaskKind>) -> AppResult<Vec<Uuid>> {
        if kinds.is_empty() {
            return Ok(Vec::new());
        }

        let permits = self
            .sender
            .try_reserve_many(kinds.len())
            .map_err(|e| self.reject(e))?;

        let mut ids = Vec::with_capacity(kinds.len());
        for (permit, kind) in permits.zip(kinds) {
            let id = self.register(&kind);
            permit.send(QueuedTask { id, kind });
            ids.push(id);
        }
        Ok(ids)
    }

    fn register(&self, kind: &TaskKind) -> Uuid {
        let id = Uuid::new_v4();
        self.registry.insert(TaskRecord::queued(id, kind.name()));
        tracing::debug!(task_id = %id, kind = kind.name(), "Task queued");
        id
    }

    fn reject(&self, error: mpsc::error::TrySendError<()>) -> AppError {
        match error {
            mpsc::error::TrySendError::Full(()) => AppError::QueueFull {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(()) => AppError::Internal {
                source: anyhow::anyhow!("task queue is closed"),
            },
        }
    }

    pub fn status(&self, id: &Uuid) -> Option<TaskRecord> {
        self.registry.get(id)
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedTask>>>,
    registry: Arc<TaskRegistry>,
    delays: TaskDelays,
    shutdown: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => None,
            task = async { receiver.lock().await.recv().await } => task,
        };
        let Some(task) = next else {
            break;
        };

        registry.mark_running(&task.id);
        let span = tracing::info_span!("task", task_id = %task.id, kind = task.kind.name(), worker_id);

        let outcome = tokio::select! {
            _ = shutdown.cancelled() => Err("cancelled by shutdown".to_string()),
            outcome = execute(&task.kind, delays).instrument(span) => outcome,
        };

        match outcome {
            Ok(result) => {
                tracing::info!(task_id = %task.id, kind = task.kind.name(), "Task succeeded");
                registry.mark_succeeded(&task.id, result);
            }
            Err(error) => {
                tracing::warn!(task_id = %task.id, kind = task.kind.name(), error = %error, "Task failed");
                registry.mark_failed(&task.id, error);
            }
        }

        let evicted = registry.prune();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted finished task records");
        }
    }

    tracing::debug!(worker_id, "Task worker stopped");
}

async fn execute(kind: &TaskKind, delays: TaskDelays) -> Result<Option<Value>, String> {
    match kind {
        TaskKind::SendEmail { to, subject, .. } => {
            tracing::info!(to = %to, subject = %subject, "Sending email");
            tokio::time::sleep(delays.email).await;
            tracing::info!(to = %to, subject = %subject, "Email sent");
            Ok(None)
        }
        TaskKind::ProcessData { data, operation } => {
            tracing::info!(operation = %operation, data_size = data.len(), "Processing data");
            tokio::time::sleep(delays.processing).await;
            let result = operation.apply(data)?;
            tracing::info!(operation = %operation, result = %result, "Data processing completed");
            Ok(Some(result))
        }
        TaskKind::WriteLog { message } => {
            tracing::info!(at = %jiff::Timestamp::now(), message = %message, "Log entry written");
            Ok(None)
        }
    }
}
