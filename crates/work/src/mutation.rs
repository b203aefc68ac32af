//! Tasks whose effect is to mutate a task container.

use std::rc::Rc;

use worklist_core::{ObjectCore, Registry};

use crate::binding::Binding;
use crate::task::{
    task_object, Result, StatusCell, Task, TaskQueue, TaskRef, TaskState, TaskWithResult,
};

/// Appends a target task to a queue when executed.
///
/// Running it twice enqueues the target twice.
pub struct AddTask {
    core: ObjectCore,
    status: StatusCell,
    target: TaskRef,
    queue: Binding<TaskRef>,
}

impl AddTask {
    /// Create a task that will push `target` to the back of `queue`.
    pub fn new(registry: &Registry, target: TaskRef, queue: &TaskQueue) -> Self {
        let status = StatusCell::pending(format!(
            "Waiting for execution. Will add task with context: {}",
            target
        ));
        Self {
            core: ObjectCore::new(registry),
            status,
            target,
            queue: Binding::new(queue),
        }
    }

    /// The task that gets enqueued.
    pub fn target(&self) -> &TaskRef {
        &self.target
    }
}

task_object!(AddTask);

impl std::fmt::Debug for AddTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddTask")
            .field("core", &self.core)
            .field("status", &self.status)
            .field("target", &self.target.id())
            .field("queue", &self.queue)
            .finish()
    }
}

impl Task for AddTask {
    fn execute(&self) -> Result<()> {
        let target = Rc::clone(&self.target);
        match self.queue.with_mut(|queue| {
            queue.push_back(target);
            queue.len()
        }) {
            Ok(len) => {
                self.status
                    .complete(format!("Added task with context: {}", self.target));
                tracing::debug!(task = %self.core.id(), queue_len = len, "task enqueued");
                Ok(())
            }
            Err(e) => {
                self.status.fail(format!("Failed to add task: {}", e), &e);
                tracing::warn!(task = %self.core.id(), "add task failed: {}", e);
                Err(e)
            }
        }
    }

    fn state(&self) -> TaskState {
        self.status.snapshot()
    }

    fn as_task_with_result(&self) -> Option<&dyn TaskWithResult> {
        None
    }
}

/// Clears a task container when executed.
#[derive(Debug)]
pub struct CleanupTask {
    core: ObjectCore,
    status: StatusCell,
    queue: Binding<TaskRef>,
}

impl CleanupTask {
    /// Create a task that will clear `queue`.
    pub fn new(registry: &Registry, queue: &TaskQueue) -> Self {
        Self {
            core: ObjectCore::new(registry),
            status: StatusCell::pending("Waiting for execution. Will clear the container"),
            queue: Binding::new(queue),
        }
    }
}

task_object!(CleanupTask);

impl Task for CleanupTask {
    fn execute(&self) -> Result<()> {
        // Take the tasks out first so their drops run after the borrow ends.
        match self.queue.with_mut(std::mem::take) {
            Ok(removed) => {
                let count = removed.len();
                drop(removed);
                self.status.complete("Container is cleaned");
                tracing::debug!(task = %self.core.id(), removed = count, "container cleaned");
                Ok(())
            }
            Err(e) => {
                self.status.fail(format!("Failed to clean container: {}", e), &e);
                tracing::warn!(task = %self.core.id(), "cleanup failed: {}", e);
                Err(e)
            }
        }
    }

    fn state(&self) -> TaskState {
        self.status.snapshot()
    }

    fn as_task_with_result(&self) -> Option<&dyn TaskWithResult> {
        None
    }
}
