//! Worklist core data structures.
//!
//! This crate defines the generic doubly-linked [`Container`] and the
//! polymorphic [`Object`] model (identity, downcasting and live-instance
//! bookkeeping) that tasks are built on.

#![warn(missing_docs)]

// Sequence container
mod container;
mod error;

// Object model
mod id;
mod object;
mod registry;

// Re-exports
pub use container::{Container, Cursor, IntoIter, Iter, IterMut};
pub use error::{ContainerError, Result};
pub use id::ObjectId;
pub use object::{cast_rc, AsAny, NamedObject, Object, ObjectCore, ObjectRef};
pub use registry::{Registration, Registry};

/// A container shared between several owners on one thread.
pub type SharedContainer<T> = std::rc::Rc<std::cell::RefCell<Container<T>>>;

/// Wrap a container for sharing.
pub fn shared<T>(container: Container<T>) -> SharedContainer<T> {
    std::rc::Rc::new(std::cell::RefCell::new(container))
}
