//! Non-owning bindings from tasks to shared containers.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use worklist_core::{Container, SharedContainer};

use crate::task::{Result, TaskError};

/// Weak handle to a shared container.
///
/// The task does not keep the container alive; once every strong handle
/// is gone, access reports [`TaskError::ContainerDropped`].
pub struct Binding<T> {
    container: Weak<RefCell<Container<T>>>,
}

impl<T> Binding<T> {
    /// Bind to `container` without taking ownership.
    pub fn new(container: &SharedContainer<T>) -> Self {
        Self {
            container: Rc::downgrade(container),
        }
    }

    /// Whether the container still exists.
    pub fn is_alive(&self) -> bool {
        self.container.strong_count() > 0
    }

    /// Read the container.
    pub fn with<R>(&self, f: impl FnOnce(&Container<T>) -> R) -> Result<R> {
        let container = self.container.upgrade().ok_or(TaskError::ContainerDropped)?;
        let guard = container.try_borrow().map_err(|_| TaskError::ContainerBusy)?;
        Ok(f(&*guard))
    }

    /// Mutate the container.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Container<T>) -> R) -> Result<R> {
        let container = self.container.upgrade().ok_or(TaskError::ContainerDropped)?;
        let mut guard = container
            .try_borrow_mut()
            .map_err(|_| TaskError::ContainerBusy)?;
        Ok(f(&mut *guard))
    }
}

impl<T> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            container: Weak::clone(&self.container),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worklist_core::shared;

    #[test]
    fn test_reads_and_writes() {
        let container = shared(Container::new());
        let binding = Binding::new(&container);

        binding.with_mut(|c| c.push_back(1)).unwrap();
        assert_eq!(binding.with(|c| c.len()), Ok(1));
        assert_eq!(container.borrow().front(), Some(&1));
    }

    #[test]
    fn test_does_not_keep_container_alive() {
        let container = shared(Container::<i32>::new());
        let binding = Binding::new(&container);
        assert!(binding.is_alive());

        drop(container);
        assert!(!binding.is_alive());
        assert_eq!(binding.with(|c| c.len()), Err(TaskError::ContainerDropped));
    }

    #[test]
    fn test_busy_container() {
        let container = shared(Container::<i32>::new());
        let binding = Binding::new(&container);

        let _reader = container.borrow();
        assert_eq!(binding.with(|c| c.len()), Ok(0));
        assert_eq!(binding.with_mut(|c| c.clear()), Err(TaskError::ContainerBusy));
    }
}
