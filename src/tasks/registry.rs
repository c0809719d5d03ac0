use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};
use serde_json::Value;
use uuid::Uuid;

use crate::config::TasksConfig;
use crate::tasks::types::{TaskRecord, TaskStatus};

/// How long finished records stay queryable, and how many are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retention {
    pub ttl: SignedDuration,
    pub max_finished: usize,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            ttl: SignedDuration::from_hours(1),
            max_finished: 1000,
        }
    }
}

impl From<&TasksConfig> for Retention {
    fn from(config: &TasksConfig) -> Self {
        Self {
            ttl: SignedDuration::from_secs(i64::try_from(config.retention_secs).unwrap_or(i64::MAX)),
            max_finished: config.max_retained,
        }
    }
}

/// Task status keyed by task id.
///
/// Queued and running tasks are always present; finished ones are evicted
/// by [`TaskRegistry::prune`] once they outlive the [`Retention`] policy.
#[derive(Default)]
pub struct TaskRegistry {
    records: DashMap<Uuid, TaskRecord>,
    retention: Retention,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Retention) -> Self {
        Self {
            records: DashMap::new(),
            retention,
        }
    }

    pub fn insert(&self, record: TaskRecord) {
        self.records.insert(record.id, record);
    }

    pub fn remove(&self, id: &Uuid) {
        self.records.remove(id);
    }

    pub fn get(&self, id: &Uuid) -> Option<TaskRecord> {
        self.records.get(id).map(|record| record.clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop finished records older than the TTL, then the oldest finished
    /// ones beyond `max_finished`. Returns how many were removed.
    pub fn prune(&self) -> usize {
        self.prune_at(Timestamp::now())
    }

    fn prune_at(&self, now: Timestamp) -> usize {
        let mut finished: Vec<(Timestamp, Uuid)> = self
            .records
            .iter()
            .filter(|record| record.status.is_finished())
            .filter_map(|record| record.finished_at.map(|at| (at, record.id)))
            .collect();
        finished.sort_unstable();

        let excess = finished.len().saturating_sub(self.retention.max_finished);
        let mut removed = 0;
        for (index, (finished_at, id)) in finished.into_iter().enumerate() {
            let expired = now.duration_since(finished_at) > self.retention.ttl;
            if (index < excess || expired) && self.records.remove(&id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub fn mark_running(&self, id: &Uuid) {
        if let Some(mut record) = self.records.get_mut(id) {
            record.status = TaskStatus::Running;
            record.started_at = Some(Timestamp::now());
        }
    }

    pub fn mark_succeeded(&self, id: &Uuid, result: Option<Value>) {
        if let Some(mut record) = self.records.get_mut(id) {
            record.status = TaskStatus::Succeeded;
            record.finished_at = Some(Timestamp::now());
            record.result = result;
        }
    }

    pub fn mark_failed(&self, id: &Uuid, error: impl Into<String>) {
        if let Some(mut record) = self.records.get_mut(id) {
            record.status = TaskStatus::Failed;
            record.finished_at = Some(Timestamp::now());
            record.error = Some(error.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lifecycle() {
        let registry = TaskRegistry::new();
        let id = Uuid::new_v4();
        registry.insert(TaskRecord::queued(id, "write_log"));
        assert_eq!(registry.get(&id).unwrap().status, TaskStatus::Queued);

        registry.mark_running(&id);
        let running = registry.get(&id).unwrap();
        assert_eq!(running.status, TaskStatus::Running);
        assert!(running.started_at.is_some());

        registry.mark_succeeded(&id, Some(json!(15)));
        let done = registry.get(&id).unwrap();
        assert_eq!(done.status, TaskStatus::Succeeded);
        assert_eq!(done.result, Some(json!(15)));
        assert!(done.finished_at.is_some());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let registry = TaskRegistry::new();
        let id = Uuid::new_v4();
        registry.mark_failed(&id, "boom");
        assert!(registry.get(&id).is_none());
        assert!(registry.is_empty());
    }

    fn finished(registry: &TaskRegistry, at: Timestamp) -> Uuid {
        let id = Uuid::new_v4();
        registry.insert(TaskRecord::queued(id, "write_log"));
        registry.mark_succeeded(&id, None);
        if let Some(mut record) = registry.records.get_mut(&id) {
            record.finished_at = Some(at);
        }
        id
    }

    #[test]
    fn test_prune_drops_expired_records() {
        let registry = TaskRegistry::with_retention(Retention {
            ttl: SignedDuration::from_secs(60),
            max_finished: 100,
        });
        let now = Timestamp::now();
        let old = finished(&registry, now - SignedDuration::from_secs(120));
        let fresh = finished(&registry, now - SignedDuration::from_secs(5));
        let pending = Uuid::new_v4();
        registry.insert(TaskRecord::queued(pending, "send_email"));

        assert_eq!(registry.prune_at(now), 1);
        assert!(registry.get(&old).is_none());
        assert!(registry.get(&fresh).is_some());
        assert!(registry.get(&pending).is_some());
    }

    #[test]
    fn test_prune_caps_finished_records_oldest_first() {
        let registry = TaskRegistry::with_retention(Retention {
            ttl: SignedDuration::from_hours(1),
            max_finished: 2,
        });
        let now = Timestamp::now();
        let ids: Vec<Uuid> = (1..=4)
            .map(|age| finished(&registry, now - SignedDuration::from_secs(10 - age)))
            .collect();
        let pending = Uuid::new_v4();
        registry.insert(TaskRecord::queued(pending, "send_email"));

        assert_eq!(registry.prune_at(now), 2);
        assert_eq!(registry.len(), 3);
        assert!(registry.get(&ids[0]).is_none());
        assert!(registry.get(&ids[1]).is_none());
        assert!(registry.get(&ids[2]).is_some());
        assert!(registry.get(&ids[3]).is_some());
    }

    #[test]
    fn test_retention_from_config() {
        let config = TasksConfig {
            retention_secs: 30,
            max_retained: 7,
            ..Default::default()
        };
        let retention = Retention::from(&config);
        assert_eq!(retention.ttl, SignedDuration::from_secs(30));
        assert_eq!(retention.max_finished, 7);
    }
}
