//! Work Management
//!
//! Tasks built on the worklist object model, the concrete task variants,
//! and the executor that drains task queues.

#![warn(missing_docs)]

pub mod task;
pub mod binding;
pub mod arithmetic;
pub mod mutation;
pub mod count;
pub mod executor;

pub use task::{StatusCell, Task, TaskError, TaskQueue, TaskRef, TaskState, TaskWithResult, Time, Result};
pub use binding::Binding;
pub use arithmetic::{ArithmeticError, ArithmeticTask, Operand, Operation};
pub use mutation::{AddTask, CleanupTask};
pub use count::{ObjectsCountTask, ObjectsInProgramCountTask, TasksWithResultCountTask};
pub use executor::{DrainSummary, ExecutionReport, Executor, ExecutorConfig};
