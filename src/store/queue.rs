/*!
 * Export task queue.
 *
 * Tasks wait in submission order. At most one task runs locally at a time;
 * a failed task goes back to the end of the queue until it has been retried
 * `max_retries` times, after which it is marked failed for good.
 */

use std::collections::{HashMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app_config::QueueConfig;
use crate::errors::DraftError;
use crate::materials::new_id;

/// Lifecycle of an export task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    /// Gave up after exhausting retries; holds the last error message
    Failed(String),
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Running => f.write_str("running"),
            Self::Completed => f.write_str("completed"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// A queued export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTask {
    pub task_id: String,
    /// Cache key of the document to export
    pub draft_key: String,
    /// Free-form parameters for the exporter
    pub params: Value,
    pub status: TaskStatus,
    /// Number of failed attempts so far
    pub retries: u32,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ExportQueue {
    max_retries: u32,
    pending: VecDeque<String>,
    running: Option<String>,
    tasks: HashMap<String, ExportTask>,
}

impl ExportQueue {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn from_config(config: &QueueConfig) -> Self {
        Self::new(config.max_retries)
    }

    /// Queue an export of the document cached under `draft_key`, returning
    /// the task id
    pub fn submit(&mut self, draft_key: impl Into<String>, params: Value) -> String {
        let task = ExportTask {
            task_id: new_id(),
            draft_key: draft_key.into(),
            params,
            status: TaskStatus::Pending,
            retries: 0,
            submitted_at: Utc::now(),
        };
        let task_id = task.task_id.clone();
        debug!("Queued export {} for draft '{}'", task_id, task.draft_key);
        self.pending.push_back(task_id.clone());
        self.tasks.insert(task_id.clone(), task);
        task_id
    }

    /// Start the next pending task. Returns nothing while another task is
    /// running or when the queue is empty.
    pub fn next_task(&mut self) -> Option<&ExportTask> {
        if self.running.is_some() {
            return None;
        }
        let task_id = self.pending.pop_front()?;
        let task = self.tasks.get_mut(&task_id)?;
        task.status = TaskStatus::Running;
        self.running = Some(task_id);
        Some(task)
    }

    fn take_running(&mut self, task_id: &str) -> Result<&mut ExportTask, DraftError> {
        if self.running.as_deref() != Some(task_id) {
            return Err(DraftError::InvalidParameter(format!("task {} is not running", task_id)));
        }
        self.running = None;
        self.tasks
            .get_mut(task_id)
            .ok_or_else(|| DraftError::InvalidParameter(format!("unknown task {}", task_id)))
    }

    /// Mark the running task done
    pub fn complete(&mut self, task_id: &str) -> Result<(), DraftError> {
        let task = self.take_running(task_id)?;
        task.status = TaskStatus::Completed;
        info!("Export {} completed", task_id);
        Ok(())
    }

    /// Record a failure of the running task; it is requeued unless its
    /// retries are exhausted. Returns the resulting status.
    pub fn fail(&mut self, task_id: &str, reason: &str) -> Result<TaskStatus, DraftError> {
        let max_retries = self.max_retries;
        let task = self.take_running(task_id)?;
        task.retries += 1;
        if task.retries > max_retries {
            warn!("Export {} failed after {} retries: {}", task_id, max_retries, reason);
            task.status = TaskStatus::Failed(reason.to_string());
            return Ok(task.status.clone());
        }
        debug!("Export {} failed (attempt {}), requeueing: {}", task_id, task.retries, reason);
        task.status = TaskStatus::Pending;
        self.pending.push_back(task_id.to_string());
        Ok(TaskStatus::Pending)
    }

    /// Forget completed and permanently failed tasks, returning how many
    /// were removed
    pub fn purge_finished(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks
            .retain(|_, task| !matches!(task.status, TaskStatus::Completed | TaskStatus::Failed(_)));
        let removed = before - self.tasks.len();
        if removed > 0 {
            debug!("Purged {} finished export task(s)", removed);
        }
        removed
    }

    pub fn status(&self, task_id: &str) -> Option<&TaskStatus> {
        self.tasks.get(task_id).map(|task| &task.status)
    }

    pub fn task(&self, task_id: &str) -> Option<&ExportTask> {
        self.tasks.get(task_id)
    }

    /// Number of tasks waiting to run
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
