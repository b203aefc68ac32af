//! Object model - the polymorphic base of everything stored in containers.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::id::ObjectId;
use crate::registry::{Registration, Registry};

/// Shared handle to any object.
pub type ObjectRef = Rc<dyn Object>;

/// Type-erasure helpers, implemented for every sized `'static` type.
pub trait AsAny: Any {
    /// View as `&dyn Any` of the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Convert a shared handle into `Rc<dyn Any>` of the concrete type.
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;

    /// Name of the concrete type.
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A polymorphic, instance-tracked entity.
///
/// `Display` is the textual representation; it must be deterministic for
/// a given state.
pub trait Object: fmt::Display + AsAny {
    /// Unique identity of this instance.
    fn id(&self) -> ObjectId;
}

impl dyn Object {
    /// Downcast to the concrete variant `U`.
    ///
    /// Returns `None` when the runtime variant is something else. A
    /// mismatch is an ordinary answer, not a failure.
    pub fn cast<U: Object>(&self) -> Option<&U> {
        AsAny::as_any(self).downcast_ref::<U>()
    }

    /// Whether the runtime variant is `U`.
    pub fn is<U: Object>(&self) -> bool {
        AsAny::as_any(self).is::<U>()
    }
}

/// Downcast a shared handle to the concrete variant `U`.
///
/// Works for `Rc<dyn Object>` and for handles to any trait that extends
/// [`Object`].
pub fn cast_rc<U: Any, O: AsAny + ?Sized>(object: Rc<O>) -> Option<Rc<U>> {
    object.into_any_rc().downcast::<U>().ok()
}

/// State shared by every object: identity and live-instance registration.
#[derive(Debug)]
pub struct ObjectCore {
    id: ObjectId,
    registration: Registration,
}

impl ObjectCore {
    /// Create and register a new object core.
    pub fn new(registry: &Registry) -> Self {
        Self {
            id: ObjectId::new(),
            registration: registry.register(),
        }
    }

    /// Identity of the owning object.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Registry the owning object is counted in.
    pub fn registry(&self) -> &Registry {
        self.registration.registry()
    }
}

/// A plain object that renders its name.
#[derive(Debug)]
pub struct NamedObject {
    core: ObjectCore,
    name: String,
}

impl NamedObject {
    /// Create a named object.
    pub fn new(registry: &Registry, name: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(registry),
            name: name.into(),
        }
    }

    /// The name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for NamedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Object for NamedObject {
    fn id(&self) -> ObjectId {
        self.core.id()
    }
}
