//! Doubly-linked sequence container.
//!
//! Nodes live in an arena owned by the container and refer to their
//! neighbours by slot index. No node owns another, so dropping the
//! container releases every node without any cycle to break.

use std::fmt;
use std::iter::FusedIterator;

use crate::error::{ContainerError, Result};

/// A single cell of the list.
#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A generic, size-tracked, doubly-linked sequence.
///
/// Supports O(1) insertion and removal at both ends, forward and backward
/// traversal, in-place reversal and O(1) swapping of whole contents.
pub struct Container<T> {
    /// Node arena; `None` marks a released slot
    slots: Vec<Option<Node<T>>>,

    /// Released slots available for reuse
    free: Vec<usize>,

    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Container<T> {
    /// Create an empty container.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the container holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a value before the current head.
    pub fn push_front(&mut self, value: T) {
        let idx = self.alloc(Node {
            value,
            prev: None,
            next: self.head,
        });

        match self.head.and_then(|old| self.node_mut(old)) {
            Some(old_head) => old_head.prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
    }

    /// Insert a value after the current tail.
    pub fn push_back(&mut self, value: T) {
        let idx = self.alloc(Node {
            value,
            prev: self.tail,
            next: None,
        });

        match self.tail.and_then(|old| self.node_mut(old)) {
            Some(old_tail) => old_tail.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
    }

    /// Remove and return the head value.
    ///
    /// Fails with [`ContainerError::Empty`] and leaves the container
    /// untouched when there is nothing to remove.
    pub fn pop_front(&mut self) -> Result<T> {
        let idx = self.head.ok_or(ContainerError::Empty)?;
        let node = self.release(idx).ok_or(ContainerError::Empty)?;

        self.head = node.next;
        match self.head.and_then(|next| self.node_mut(next)) {
            Some(new_head) => new_head.prev = None,
            None => self.tail = None,
        }
        self.len -= 1;
        self.compact_if_empty();

        Ok(node.value)
    }

    /// Remove and return the tail value.
    ///
    /// Fails with [`ContainerError::Empty`] and leaves the container
    /// untouched when there is nothing to remove.
    pub fn pop_back(&mut self) -> Result<T> {
        let idx = self.tail.ok_or(ContainerError::Empty)?;
        let node = self.release(idx).ok_or(ContainerError::Empty)?;

        self.tail = node.prev;
        match self.tail.and_then(|prev| self.node_mut(prev)) {
            Some(new_tail) => new_tail.next = None,
            None => self.head = None,
        }
        self.len -= 1;
        self.compact_if_empty();

        Ok(node.value)
    }

    /// Head value, or `None` when empty.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|idx| self.node(idx)).map(|n| &n.value)
    }

    /// Tail value, or `None` when empty.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|idx| self.node(idx)).map(|n| &n.value)
    }

    /// Mutable head value, or `None` when empty.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        let idx = self.head?;
        self.node_mut(idx).map(|n| &mut n.value)
    }

    /// Mutable tail value, or `None` when empty.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let idx = self.tail?;
        self.node_mut(idx).map(|n| &mut n.value)
    }

    /// Release every node and reset to the empty state.
    pub fn clear(&mut self) {
        let released = self.len;
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        tracing::debug!(released, "container cleared");
    }

    /// Reverse the traversal order in place.
    pub fn reverse(&mut self) {
        let mut current = self.head;
        while let Some(idx) = current {
            let Some(node) = self.node_mut(idx) else {
                break;
            };
            std::mem::swap(&mut node.prev, &mut node.next);
            // `prev` now holds the old successor
            current = node.prev;
        }
        std::mem::swap(&mut self.head, &mut self.tail);
        tracing::debug!(len = self.len, "container reversed");
    }

    /// Exchange the entire contents with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Read-only iterator from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            container: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Mutable iterator from head to tail.
    ///
    /// Nodes sit in an arena in slot order rather than list order, so the
    /// `&mut` references are gathered into list order up front. Creating the
    /// iterator costs one O(n) allocation; stepping it is O(1).
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let order: Vec<usize> = self.indices().collect();
        let mut values: Vec<Option<&mut T>> = self
            .slots
            .iter_mut()
            .map(|slot| slot.as_mut().map(|n| &mut n.value))
            .collect();
        let ordered: Vec<&mut T> = order
            .into_iter()
            .filter_map(|idx| values.get_mut(idx).and_then(Option::take))
            .collect();

        IterMut {
            inner: ordered.into_iter(),
        }
    }

    /// Cursor positioned on the head (or the end position when empty).
    pub fn cursor_front(&self) -> Cursor<'_, T> {
        Cursor {
            container: self,
            current: self.head,
        }
    }

    /// Cursor positioned on the tail (or the end position when empty).
    pub fn cursor_back(&self) -> Cursor<'_, T> {
        Cursor {
            container: self,
            current: self.tail,
        }
    }

    /// Slot indices in head-to-tail order.
    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, move |&idx| self.node(idx).and_then(|n| n.next))
    }

    fn node(&self, idx: usize) -> Option<&Node<T>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Option<Node<T>> {
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        Some(node)
    }

    /// Drop the arena once the last node is gone so it never grows unbounded.
    fn compact_if_empty(&mut self) {
        if self.len == 0 {
            self.slots.clear();
            self.free.clear();
        }
    }
}

impl<T> Default for Container<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Container<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for Container<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Renders every element followed by a single space.
impl<T: fmt::Display> fmt::Display for Container<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in self {
            write!(f, "{} ", value)?;
        }
        Ok(())
    }
}

impl<T: PartialEq> PartialEq for Container<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Container<T> {}

impl<T> FromIterator<T> for Container<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut container = Self::new();
        container.extend(iter);
        container
    }
}

impl<T> Extend<T> for Container<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> IntoIterator for Container<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { container: self }
    }
}

impl<'a, T> IntoIterator for &'a Container<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Container<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Read-only, restartable iterator over a [`Container`].
pub struct Iter<'a, T> {
    container: &'a Container<T>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.container.node(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.container.node(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable iterator over a [`Container`].
pub struct IterMut<'a, T> {
    inner: std::vec::IntoIter<&'a mut T>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator that drains a [`Container`].
pub struct IntoIter<T> {
    container: Container<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.container.pop_front().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.container.len(), Some(self.container.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.container.pop_back().ok()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

/// Read-only cursor that steps between adjacent nodes.
///
/// Besides the element positions there is one "end" position past the
/// tail (and before the head). It yields `None` from [`Cursor::current`];
/// stepping forward from it wraps to the head, stepping backward wraps to
/// the tail.
pub struct Cursor<'a, T> {
    container: &'a Container<T>,
    current: Option<usize>,
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container,
            current: self.current,
        }
    }
}

impl<'a, T> Cursor<'a, T> {
    /// Element under the cursor; `None` at the end position.
    pub fn current(&self) -> Option<&'a T> {
        self.current
            .and_then(|idx| self.container.node(idx))
            .map(|n| &n.value)
    }

    /// Whether the cursor sits on the end position.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Step towards the tail.
    pub fn move_next(&mut self) {
        self.current = match self.current {
            Some(idx) => self.container.node(idx).and_then(|n| n.next),
            None => self.container.head,
        };
    }

    /// Step towards the head.
    pub fn move_prev(&mut self) {
        self.current = match self.current {
            Some(idx) => self.container.node(idx).and_then(|n| n.prev),
            None => self.container.tail,
        };
    }

    /// Element after the cursor without moving.
    pub fn peek_next(&self) -> Option<&'a T> {
        let mut next = self.clone();
        next.move_next();
        next.current()
    }

    /// Element before the cursor without moving.
    pub fn peek_prev(&self) -> Option<&'a T> {
        let mut prev = self.clone();
        prev.move_prev();
        prev.current()
    }
}
