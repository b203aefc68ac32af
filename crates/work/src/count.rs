//! Introspective counting tasks.

use std::cell::Cell;

use worklist_core::{ObjectCore, ObjectRef, Registry, SharedContainer};

use crate::binding::Binding;
use crate::task::{
    task_object, Result, StatusCell, Task, TaskQueue, TaskRef, TaskState, TaskWithResult,
};

/// Records a count in the task's status, or the failure to obtain one.
fn record(
    core: &ObjectCore,
    status: &StatusCell,
    slot: &Cell<Option<usize>>,
    outcome: Result<usize>,
    describe: impl FnOnce(usize) -> String,
) -> Result<()> {
    match outcome {
        Ok(count) => {
            slot.set(Some(count));
            status.complete(describe(count));
            tracing::debug!(task = %core.id(), count, "count task executed");
            Ok(())
        }
        Err(e) => {
            slot.set(None);
            status.fail(format!("Count failed: {}", e), &e);
            tracing::warn!(task = %core.id(), "count task failed: {}", e);
            Err(e)
        }
    }
}

/// Reports the number of objects in a container.
#[derive(Debug)]
pub struct ObjectsCountTask {
    core: ObjectCore,
    status: StatusCell,
    objects: Binding<ObjectRef>,
    count: Cell<Option<usize>>,
}

impl ObjectsCountTask {
    /// Create a task counting the objects in `objects`.
    pub fn new(registry: &Registry, objects: &SharedContainer<ObjectRef>) -> Self {
        Self {
            core: ObjectCore::new(registry),
            status: StatusCell::pending("Waiting for execution. Will count objects in container"),
            objects: Binding::new(objects),
            count: Cell::new(None),
        }
    }

    /// Count observed by the last successful execution.
    pub fn count(&self) -> Option<usize> {
        self.count.get()
    }
}

task_object!(ObjectsCountTask);

impl Task for ObjectsCountTask {
    fn execute(&self) -> Result<()> {
        let outcome = self.objects.with(|objects| objects.len());
        record(&self.core, &self.status, &self.count, outcome, |n| {
            format!("Count of objects in container: {}", n)
        })
    }

    fn state(&self) -> TaskState {
        self.status.snapshot()
    }

    fn as_task_with_result(&self) -> Option<&dyn TaskWithResult> {
        Some(self)
    }
}

impl TaskWithResult for ObjectsCountTask {
    fn result(&self) -> Option<String> {
        self.count().map(|n| n.to_string())
    }
}

/// Reports how many tasks in a container produce a result.
#[derive(Debug)]
pub struct TasksWithResultCountTask {
    core: ObjectCore,
    status: StatusCell,
    tasks: Binding<TaskRef>,
    count: Cell<Option<usize>>,
}

impl TasksWithResultCountTask {
    /// Create a task classifying the members of `tasks`.
    pub fn new(registry: &Registry, tasks: &TaskQueue) -> Self {
        Self {
            core: ObjectCore::new(registry),
            status: StatusCell::pending("Waiting for execution. Will count tasks with result"),
            tasks: Binding::new(tasks),
            count: Cell::new(None),
        }
    }

    /// Count observed by the last successful execution.
    pub fn count(&self) -> Option<usize> {
        self.count.get()
    }
}

task_object!(TasksWithResultCountTask);

impl Task for TasksWithResultCountTask {
    fn execute(&self) -> Result<()> {
        let outcome = self
            .tasks
            .with(|tasks| tasks.iter().filter(|task| task.has_result()).count());
        record(&self.core, &self.status, &self.count, outcome, |n| {
            format!("Count of tasks with result in container: {}", n)
        })
    }

    fn state(&self) -> TaskState {
        self.status.snapshot()
    }

    fn as_task_with_result(&self) -> Option<&dyn TaskWithResult> {
        Some(self)
    }
}

impl TaskWithResult for TasksWithResultCountTask {
    fn result(&self) -> Option<String> {
        self.count().map(|n| n.to_string())
    }
}

/// Reports the number of live objects in its registry.
#[derive(Debug)]
pub struct ObjectsInProgramCountTask {
    core: ObjectCore,
    status: StatusCell,
    count: Cell<Option<usize>>,
}

impl ObjectsInProgramCountTask {
    /// Create a task reading the live count of `registry`.
    pub fn new(registry: &Registry) -> Self {
        Self {
            core: ObjectCore::new(registry),
            status: StatusCell::pending(
                "Waiting for execution. Will print count of Objects in program",
            ),
            count: Cell::new(None),
        }
    }

    /// Count observed by the last execution.
    pub fn count(&self) -> Option<usize> {
        self.count.get()
    }
}

task_object!(ObjectsInProgramCountTask);

impl Task for ObjectsInProgramCountTask {
    fn execute(&self) -> Result<()> {
        let live = self.core.registry().live();
        record(&self.core, &self.status, &self.count, Ok(live), |n| {
            format!("Count of objects in program equals {}", n)
        })
    }

    fn state(&self) -> TaskState {
        self.status.snapshot()
    }

    fn as_task_with_result(&self) -> Option<&dyn TaskWithResult> {
        Some(self)
    }
}

impl TaskWithResult for ObjectsInProgramCountTask {
    fn result(&self) -> Option<String> {
        self.count().map(|n| n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::{ArithmeticTask, Operation};
    use crate::mutation::{AddTask, CleanupTask};
    use crate::task::TaskError;
    use std::rc::Rc;
    use worklist_core::{shared, Container, NamedObject};

    #[test]
    fn test_objects_count() {
        let registry = Registry::new();
        let objects = shared(Container::<ObjectRef>::new());
        for name in ["a", "b", "c"] {
            objects
                .borrow_mut()
                .push_back(Rc::new(NamedObject::new(&registry, name)));
        }

        let task = ObjectsCountTask::new(&registry, &objects);
        assert_eq!(task.count(), None);
        task.execute().unwrap();
        assert_eq!(task.to_string(), "Count of objects in container: 3");
        assert_eq!(task.result().as_deref(), Some("3"));
    }

    #[test]
    fn test_objects_count_sees_later_changes() {
        let registry = Registry::new();
        let objects = shared(Container::<ObjectRef>::new());
        let task = ObjectsCountTask::new(&registry, &objects);

        task.execute().unwrap();
        assert_eq!(task.count(), Some(0));

        objects
            .borrow_mut()
            .push_front(Rc::new(NamedObject::new(&registry, "late")));
        task.execute().unwrap();
        assert_eq!(task.count(), Some(1));
    }

    #[test]
    fn test_tasks_with_result_count() {
        let registry = Registry::new();
        let queue: TaskQueue = shared(Container::new());
        let target: TaskRef = Rc::new(ArithmeticTask::new(&registry, 1, 2, Operation::Add));

        {
            let mut q = queue.borrow_mut();
            q.push_back(Rc::clone(&target));
            q.push_back(Rc::new(ArithmeticTask::new(&registry, 1.5, 2.0, Operation::Multiply)));
            q.push_front(Rc::new(ObjectsInProgramCountTask::new(&registry)));
            q.push_back(Rc::new(CleanupTask::new(&registry, &queue)));
            q.push_back(Rc::new(AddTask::new(&registry, target, &queue)));
        }

        let counter = TasksWithResultCountTask::new(&registry, &queue);
        counter.execute().unwrap();
        assert_eq!(counter.count(), Some(3));
        assert_eq!(
            counter.to_string(),
            "Count of tasks with result in container: 3"
        );
    }

    #[test]
    fn test_tasks_with_result_count_empty() {
        let registry = Registry::new();
        let queue: TaskQueue = shared(Container::new());
        let counter = TasksWithResultCountTask::new(&registry, &queue);
        counter.execute().unwrap();
        assert_eq!(counter.count(), Some(0));
    }

    #[test]
    fn test_count_tasks_are_result_tasks() {
        let registry = Registry::new();
        let queue: TaskQueue = shared(Container::new());
        let objects = shared(Container::<ObjectRef>::new());

        let tasks: Vec<TaskRef> = vec![
            Rc::new(ObjectsCountTask::new(&registry, &objects)),
            Rc::new(TasksWithResultCountTask::new(&registry, &queue)),
            Rc::new(ObjectsInProgramCountTask::new(&registry)),
        ];
        assert!(tasks.iter().all(|t| t.has_result()));
        assert!(tasks[0].cast::<ObjectsInProgramCountTask>().is_none());
        assert!(tasks[2].cast::<ObjectsInProgramCountTask>().is_some());
    }

    #[test]
    fn test_result_capability_per_variant() {
        let registry = Registry::new();
        let queue: TaskQueue = shared(Container::new());
        let objects = shared(Container::<ObjectRef>::new());
        let target: TaskRef = Rc::new(ArithmeticTask::new(&registry, 2, 5, Operation::Multiply));

        let classified: Vec<(TaskRef, bool)> = vec![
            (Rc::clone(&target), true),
            (Rc::new(ArithmeticTask::new(&registry, 0.5, 0.25, Operation::Add)), true),
            (Rc::new(ObjectsCountTask::new(&registry, &objects)), true),
            (Rc::new(TasksWithResultCountTask::new(&registry, &queue)), true),
            (Rc::new(ObjectsInProgramCountTask::new(&registry)), true),
            (Rc::new(AddTask::new(&registry, target, &queue)), false),
            (Rc::new(CleanupTask::new(&registry, &queue)), false),
        ];

        for (task, expected) in &classified {
            assert_eq!(task.has_result(), *expected, "{}", task);
            task.execute().unwrap();
            let result = task.as_task_with_result().and_then(|t| t.result());
            assert_eq!(result.is_some(), *expected, "{}", task);
        }
        assert_eq!(
            classified[0].0.as_task_with_result().and_then(|t| t.result()).as_deref(),
            Some("10")
        );
    }

    #[test]
    fn test_objects_in_program_count() {
        let registry = Registry::new();
        let _other = NamedObject::new(&registry, "other");
        let task = ObjectsInProgramCountTask::new(&registry);

        task.execute().unwrap();
        assert_eq!(task.to_string(), "Count of objects in program equals 2");

        {
            let _extra = NamedObject::new(&registry, "extra");
            task.execute().unwrap();
            assert_eq!(task.count(), Some(3));
        }
        task.execute().unwrap();
        assert_eq!(task.count(), Some(2));
    }

    #[test]
    fn test_count_with_dropped_container() {
        let registry = Registry::new();
        let queue: TaskQueue = shared(Container::new());
        let counter = TasksWithResultCountTask::new(&registry, &queue);
        drop(queue);

        assert_eq!(counter.execute(), Err(TaskError::ContainerDropped));
        assert_eq!(counter.count(), None);
        assert!(counter.state().is_failed());
    }
}
