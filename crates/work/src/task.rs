//! Task model - the deferred unit of work.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use worklist_core::{AsAny, Object, SharedContainer};

use crate::arithmetic::ArithmeticError;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

/// Shared handle to a task.
pub type TaskRef = Rc<dyn Task>;

/// A container of tasks shared between the driver and the tasks bound to it.
pub type TaskQueue = SharedContainer<TaskRef>;

/// Error type for task operations.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Errors that can occur while executing a task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The computation itself failed
    #[error("arithmetic fault: {0}")]
    Arithmetic(#[from] ArithmeticError),

    /// The container the task was bound to has been dropped
    #[error("bound container no longer exists")]
    ContainerDropped,

    /// The container the task was bound to is borrowed elsewhere
    #[error("bound container is in use")]
    ContainerBusy,
}

/// A deferred unit of work with a human-readable status.
///
/// `Display` renders the current status text. `execute` takes `&self` so
/// that a task can run while other handles to it sit in containers; the
/// status lives behind interior mutability.
pub trait Task: Object {
    /// Perform the work and update the status.
    ///
    /// Calling it again repeats the work and overwrites the status.
    fn execute(&self) -> Result<()>;

    /// Snapshot of the current state.
    fn state(&self) -> TaskState;

    /// Result capability, when this task produces a value.
    ///
    /// Every variant answers explicitly; implementors of [`TaskWithResult`]
    /// return `Some(self)`.
    fn as_task_with_result(&self) -> Option<&dyn TaskWithResult>;
}

/// A task whose completion conveys a computed value.
pub trait TaskWithResult: Task {
    /// Rendered value of the last successful execution.
    fn result(&self) -> Option<String>;
}

impl dyn Task {
    /// Downcast to the concrete variant `U`, `None` on mismatch.
    pub fn cast<U: Task>(&self) -> Option<&U> {
        AsAny::as_any(self).downcast_ref::<U>()
    }

    /// Whether this task produces a result.
    pub fn has_result(&self) -> bool {
        self.as_task_with_result().is_some()
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskState {
    /// Created, not yet executed
    Pending {
        /// Status text
        description: String,
        /// Creation time
        created_at: Time,
    },

    /// Executed successfully at least once
    Completed {
        /// Status text
        description: String,
        /// Successful runs so far
        runs: u32,
        /// Time of the last run
        completed_at: Time,
    },

    /// The last execution failed
    Failed {
        /// Status text
        description: String,
        /// Error message
        error: String,
        /// Time of the failure
        failed_at: Time,
    },
}

impl TaskState {
    /// Status text shown to users.
    pub fn description(&self) -> &str {
        match self {
            Self::Pending { description, .. }
            | Self::Completed { description, .. }
            | Self::Failed { description, .. } => description,
        }
    }

    /// Check if the task has not run yet.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Check if the last run succeeded.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Check if the last run failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Successful runs so far.
    pub fn runs(&self) -> u32 {
        match self {
            Self::Completed { runs, .. } => *runs,
            _ => 0,
        }
    }
}

/// Interior-mutable status holder embedded in every task.
#[derive(Debug)]
pub struct StatusCell {
    state: RefCell<TaskState>,
}

impl StatusCell {
    /// Start in the pending state.
    pub fn pending(description: impl Into<String>) -> Self {
        Self {
            state: RefCell::new(TaskState::Pending {
                description: description.into(),
                created_at: chrono::Utc::now(),
            }),
        }
    }

    /// Enter `Completed`, counting the run.
    pub fn complete(&self, description: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        let runs = state.runs() + 1;
        *state = TaskState::Completed {
            description: description.into(),
            runs,
            completed_at: chrono::Utc::now(),
        };
    }

    /// Enter `Failed`.
    pub fn fail(&self, description: impl Into<String>, error: &TaskError) {
        *self.state.borrow_mut() = TaskState::Failed {
            description: description.into(),
            error: error.to_string(),
            failed_at: chrono::Utc::now(),
        };
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> TaskState {
        self.state.borrow().clone()
    }
}

impl fmt::Display for StatusCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state.borrow().description())
    }
}

/// Implements `Display` (status text) and `Object` for a task struct with
/// `core: ObjectCore` and `status: StatusCell` fields.
macro_rules! task_object {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.status, f)
            }
        }

        impl worklist_core::Object for $ty {
            fn id(&self) -> worklist_core::ObjectId {
                self.core.id()
            }
        }
    };
}

pub(crate) use task_object;
