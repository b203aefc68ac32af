//! Task execution.
//!
//! The executor drains a task queue front to back. The queue is only
//! borrowed while a task is popped, so running tasks may push to or clear
//! the very queue being drained.

use serde::Serialize;
use worklist_core::{AsAny, ObjectId};

use crate::task::{Result, Task, TaskError, TaskQueue, TaskState};

/// Executor configuration.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    /// Stop draining at the first failed task
    pub stop_on_error: bool,
    /// Upper bound on tasks executed by one drain
    pub max_tasks: Option<usize>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            stop_on_error: true,
            max_tasks: None,
        }
    }
}

impl ExecutorConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether a failure stops the drain.
    pub fn with_stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    /// Set the maximum number of tasks per drain.
    pub fn with_max_tasks(mut self, max: usize) -> Self {
        self.max_tasks = Some(max);
        self
    }
}

/// Result of executing a single task.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    /// Executed task
    pub task_id: ObjectId,
    /// Concrete task type
    pub kind: String,
    /// Status text after execution
    pub status: String,
    /// State after execution
    pub state: TaskState,
    /// Error message when execution failed
    pub error: Option<String>,
}

impl ExecutionReport {
    /// Whether the task executed successfully.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of draining a queue.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DrainSummary {
    /// Reports in execution order
    pub reports: Vec<ExecutionReport>,
    /// Number of failed tasks
    pub failed: usize,
    /// Whether draining stopped before the queue was empty
    pub halted: bool,
    /// Tasks left in the queue afterwards
    pub remaining: usize,
}

impl DrainSummary {
    /// Number of executed tasks.
    pub fn executed(&self) -> usize {
        self.reports.len()
    }

    /// Status texts in execution order.
    pub fn statuses(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.status.as_str()).collect()
    }
}

/// Runs tasks and drains task queues.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    /// Create an executor with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration.
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute one task and capture its status.
    pub fn run(&self, task: &dyn Task) -> ExecutionReport {
        let kind = short_type_name(AsAny::type_name(task)).to_string();
        tracing::debug!(task = %task.id(), %kind, "executing task");

        let error = task.execute().err().map(|e| e.to_string());
        ExecutionReport {
            task_id: task.id(),
            kind,
            status: task.to_string(),
            state: task.state(),
            error,
        }
    }

    /// Pop and execute tasks from the front of `queue` until it is empty.
    ///
    /// Fails only when the queue itself cannot be borrowed; task failures
    /// are recorded in the summary.
    pub fn drain(&self, queue: &TaskQueue) -> Result<DrainSummary> {
        let mut summary = DrainSummary::default();

        loop {
            if let Some(max) = self.config.max_tasks {
                if summary.executed() >= max {
                    let empty = queue
                        .try_borrow()
                        .map_err(|_| TaskError::ContainerBusy)?
                        .is_empty();
                    if !empty {
                        tracing::warn!(max, "task limit reached, stopping drain");
                        summary.halted = true;
                    }
                    break;
                }
            }

            let next = queue
                .try_borrow_mut()
                .map_err(|_| TaskError::ContainerBusy)?
                .pop_front();
            let Ok(task) = next else {
                break;
            };

            let report = self.run(&*task);
            let failed = !report.succeeded();
            summary.reports.push(report);

            if failed {
                summary.failed += 1;
                if self.config.stop_on_error {
                    summary.halted = true;
                    break;
                }
            }
        }

        summary.remaining = queue
            .try_borrow()
            .map_err(|_| TaskError::ContainerBusy)?
            .len();
        tracing::info!(
            executed = summary.executed(),
            failed = summary.failed,
            remaining = summary.remaining,
            "queue drained"
        );
        Ok(summary)
    }
}

/// `ArithmeticTask<i32>` from `worklist_work::arithmetic::ArithmeticTask<i32>`.
fn short_type_name(full: &str) -> &str {
    let base_end = full.find('<').unwrap_or(full.len());
    let start = full[..base_end].rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::{ArithmeticTask, Operation};
    use crate::count::TasksWithResultCountTask;
    use crate::mutation::{AddTask, CleanupTask};
    use crate::task::TaskRef;
    use std::rc::Rc;
    use worklist_core::{shared, Container, Registry};

    fn queue_of(tasks: Vec<TaskRef>) -> TaskQueue {
        shared(tasks.into_iter().collect::<Container<_>>())
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(
            short_type_name("worklist_work::arithmetic::ArithmeticTask<i32>"),
            "ArithmeticTask<i32>"
        );
        assert_eq!(short_type_name("a::b::CleanupTask"), "CleanupTask");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn test_run_reports_status() {
        let registry = Registry::new();
        let task = ArithmeticTask::new(&registry, 4, 2, Operation::Multiply);
        let report = Executor::new().run(&task);

        assert!(report.succeeded());
        assert_eq!(report.kind, "ArithmeticTask<i32>");
        assert_eq!(report.status, "Arithmetic task: 4 * 2 = 8");
        assert!(report.state.is_completed());
    }

    #[test]
    fn test_drain_fifo() {
        let registry = Registry::new();
        let queue = queue_of(vec![
            Rc::new(ArithmeticTask::new(&registry, 1, 1, Operation::Add)),
            Rc::new(ArithmeticTask::new(&registry, 2, 2, Operation::Add)),
            Rc::new(ArithmeticTask::new(&registry, 3, 3, Operation::Add)),
        ]);

        let summary = Executor::new().drain(&queue).unwrap();
        assert_eq!(
            summary.statuses(),
            vec![
                "Arithmetic task: 1 + 1 = 2",
                "Arithmetic task: 2 + 2 = 4",
                "Arithmetic task: 3 + 3 = 6",
            ]
        );
        assert!(!summary.halted);
        assert_eq!(summary.remaining, 0);
        assert!(queue.borrow().is_empty());
        assert!(registry.is_drained());
    }

    #[test]
    fn test_drain_runs_tasks_added_during_drain() {
        let registry = Registry::new();
        let queue: TaskQueue = shared(Container::new());
        let counter: TaskRef = Rc::new(TasksWithResultCountTask::new(&registry, &queue));
        queue
            .borrow_mut()
            .push_back(Rc::new(AddTask::new(&registry, counter, &queue)));

        let summary = Executor::new().drain(&queue).unwrap();
        assert_eq!(summary.executed(), 2);
        assert_eq!(summary.reports[1].kind, "TasksWithResultCountTask");
        assert_eq!(
            summary.reports[1].status,
            "Count of tasks with result in container: 0"
        );
    }

    #[test]
    fn test_drain_cleanup_discards_rest() {
        let registry = Registry::new();
        let queue: TaskQueue = shared(Container::new());
        queue
            .borrow_mut()
            .push_back(Rc::new(CleanupTask::new(&registry, &queue)));
        queue
            .borrow_mut()
            .push_back(Rc::new(ArithmeticTask::new(&registry, 1, 1, Operation::Add)));

        let summary = Executor::new().drain(&queue).unwrap();
        assert_eq!(summary.statuses(), vec!["Container is cleaned"]);
        assert!(registry.is_drained());
    }

    #[test]
    fn test_drain_stops_on_error() {
        let registry = Registry::new();
        let queue = queue_of(vec![
            Rc::new(ArithmeticTask::new(&registry, 1, 0, Operation::Divide)),
            Rc::new(ArithmeticTask::new(&registry, 1, 1, Operation::Add)),
        ]);

        let summary = Executor::new().drain(&queue).unwrap();
        assert!(summary.halted);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.remaining, 1);
        assert_eq!(
            summary.reports[0].error.as_deref(),
            Some("arithmetic fault: division by zero")
        );
    }

    #[test]
    fn test_drain_continues_when_configured() {
        let registry = Registry::new();
        let queue = queue_of(vec![
            Rc::new(ArithmeticTask::new(&registry, 1, 0, Operation::Divide)),
            Rc::new(ArithmeticTask::new(&registry, 1, 1, Operation::Add)),
        ]);

        let executor =
            Executor::new().with_config(ExecutorConfig::new().with_stop_on_error(false));
        let summary = executor.drain(&queue).unwrap();
        assert!(!summary.halted);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.executed(), 2);
        assert!(summary.reports[1].succeeded());
    }

    #[test]
    fn test_drain_respects_task_limit() {
        let registry = Registry::new();
        let queue = queue_of(
            (0..5)
                .map(|i| Rc::new(ArithmeticTask::new(&registry, i, 1, Operation::Add)) as TaskRef)
                .collect(),
        );

        let executor = Executor::new().with_config(ExecutorConfig::new().with_max_tasks(2));
        let summary = executor.drain(&queue).unwrap();
        assert!(summary.halted);
        assert_eq!(summary.executed(), 2);
        assert_eq!(summary.remaining, 3);
    }

    #[test]
    fn test_drain_limit_matching_queue_len_is_not_halted() {
        let registry = Registry::new();
        let queue = queue_of(vec![
            Rc::new(ArithmeticTask::new(&registry, 1, 1, Operation::Add)),
            Rc::new(ArithmeticTask::new(&registry, 2, 2, Operation::Add)),
        ]);

        let executor = Executor::new().with_config(ExecutorConfig::new().with_max_tasks(2));
        let summary = executor.drain(&queue).unwrap();
        assert_eq!(summary.executed(), 2);
        assert_eq!(summary.remaining, 0);
        assert!(!summary.halted);
    }

    #[test]
    fn test_drain_zero_limit() {
        let executor = Executor::new().with_config(ExecutorConfig::new().with_max_tasks(0));

        let empty: TaskQueue = shared(Container::new());
        let summary = executor.drain(&empty).unwrap();
        assert!(!summary.halted);

        let registry = Registry::new();
        let queue = queue_of(vec![Rc::new(ArithmeticTask::new(
            &registry,
            1,
            1,
            Operation::Add,
        ))]);
        let summary = executor.drain(&queue).unwrap();
        assert!(summary.halted);
        assert_eq!(summary.executed(), 0);
        assert_eq!(summary.remaining, 1);
    }

    #[test]
    fn test_drain_busy_queue() {
        let queue: TaskQueue = shared(Container::new());
        let _guard = queue.borrow();
        assert_eq!(
            Executor::new().drain(&queue).unwrap_err(),
            TaskError::ContainerBusy
        );
    }

    #[test]
    fn test_summary_serializes() {
        let registry = Registry::new();
        let queue = queue_of(vec![Rc::new(ArithmeticTask::new(
            &registry,
            2,
            3,
            Operation::Subtract,
        ))]);

        let summary = Executor::new().drain(&queue).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["reports"][0]["status"], "Arithmetic task: 2 - 3 = -1");
        assert_eq!(json["reports"][0]["state"]["state"], "completed");
        assert_eq!(json["failed"], 0);
    }
}
