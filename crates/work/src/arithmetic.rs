//! Arithmetic evaluation tasks.
//!
//! Integer operands use checked arithmetic: dividing by zero or
//! overflowing fails the task instead of aborting. Floating-point operands
//! follow IEEE-754 and never fail (`1.0 / 0.0` is `inf`).
//!
//! Operands and results render through `Display`, so floats use the
//! shortest representation that round-trips: `1.0 + 2.0` reads
//! `Arithmetic task: 1 + 2 = 3`, not `1.000000 + 2.000000 = 3.000000`.

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};
use worklist_core::{Object, ObjectCore, ObjectId, Registry};

use crate::task::{Result, StatusCell, Task, TaskError, TaskState, TaskWithResult};

/// Binary operation applied by an [`ArithmeticTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `left + right`
    Add,
    /// `left - right`
    Subtract,
    /// `left * right`
    Multiply,
    /// `left / right`
    Divide,
}

impl Operation {
    /// Infix symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Failure of an integer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    /// Right operand of a division was zero
    #[error("division by zero")]
    DivideByZero,

    /// Result does not fit the operand type
    #[error("overflow")]
    Overflow,
}

/// A numeric type an [`ArithmeticTask`] can operate on.
pub trait Operand: Copy + fmt::Display + 'static {
    /// Apply `operation` to `left` and `right`.
    fn apply(operation: Operation, left: Self, right: Self) -> std::result::Result<Self, ArithmeticError>;
}

macro_rules! checked_operand {
    ($($t:ty),*) => {
        $(
            impl Operand for $t {
                fn apply(
                    operation: Operation,
                    left: Self,
                    right: Self,
                ) -> std::result::Result<Self, ArithmeticError> {
                    let value = match operation {
                        Operation::Add => left.checked_add(right),
                        Operation::Subtract => left.checked_sub(right),
                        Operation::Multiply => left.checked_mul(right),
                        Operation::Divide => {
                            if right == 0 {
                                return Err(ArithmeticError::DivideByZero);
                            }
                            left.checked_div(right)
                        }
                    };
                    value.ok_or(ArithmeticError::Overflow)
                }
            }
        )*
    };
}

macro_rules! ieee_operand {
    ($($t:ty),*) => {
        $(
            impl Operand for $t {
                fn apply(
                    operation: Operation,
                    left: Self,
                    right: Self,
                ) -> std::result::Result<Self, ArithmeticError> {
                    Ok(match operation {
                        Operation::Add => left + right,
                        Operation::Subtract => left - right,
                        Operation::Multiply => left * right,
                        Operation::Divide => left / right,
                    })
                }
            }
        )*
    };
}

checked_operand!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
ieee_operand!(f32, f64);

/// Evaluates `left <op> right`.
#[derive(Debug)]
pub struct ArithmeticTask<T: Operand> {
    core: ObjectCore,
    status: StatusCell,
    left: T,
    right: T,
    operation: Operation,
    value: Cell<Option<T>>,
}

impl<T: Operand> ArithmeticTask<T> {
    /// Create a new arithmetic task.
    pub fn new(registry: &Registry, left: T, right: T, operation: Operation) -> Self {
        let expression = format!("{} {} {}", left, operation, right);
        Self {
            core: ObjectCore::new(registry),
            status: StatusCell::pending(format!(
                "Waiting for execution. Arithmetic task: {}",
                expression
            )),
            left,
            right,
            operation,
            value: Cell::new(None),
        }
    }

    /// `left <op> right` without the result.
    pub fn expression(&self) -> String {
        format!("{} {} {}", self.left, self.operation, self.right)
    }

    /// Left operand.
    pub fn left(&self) -> T {
        self.left
    }

    /// Right operand.
    pub fn right(&self) -> T {
        self.right
    }

    /// The operation.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Value computed by the last successful execution.
    pub fn value(&self) -> Option<T> {
        self.value.get()
    }
}

impl<T: Operand> fmt::Display for ArithmeticTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.status, f)
    }
}

impl<T: Operand> Object for ArithmeticTask<T> {
    fn id(&self) -> ObjectId {
        self.core.id()
    }
}

impl<T: Operand> Task for ArithmeticTask<T> {
    fn execute(&self) -> Result<()> {
        let expression = self.expression();
        match T::apply(self.operation, self.left, self.right) {
            Ok(value) => {
                self.value.set(Some(value));
                self.status
                    .complete(format!("Arithmetic task: {} = {}", expression, value));
                tracing::debug!(task = %self.core.id(), %expression, %value, "arithmetic task executed");
                Ok(())
            }
            Err(e) => {
                let error = TaskError::from(e);
                self.value.set(None);
                self.status
                    .fail(format!("Arithmetic task: {} failed: {}", expression, e), &error);
                tracing::warn!(task = %self.core.id(), %expression, "arithmetic task failed: {}", e);
                Err(error)
            }
        }
    }

    fn state(&self) -> TaskState {
        self.status.snapshot()
    }

    fn as_task_with_result(&self) -> Option<&dyn TaskWithResult> {
        Some(self)
    }
}

impl<T: Operand> TaskWithResult for ArithmeticTask<T> {
    fn result(&self) -> Option<String> {
        self.value().map(|v| v.to_string())
    }
}
