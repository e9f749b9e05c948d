use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::numeric::StateValue;

/// Shared value slot an argument can be bound to.
///
/// Cloning yields another handle to the same value, so the host keeps one
/// handle and the registered argument writes through another.
pub struct Slot<T> {
    cell: Rc<Cell<T>>,
}

impl<T: StateValue> Slot<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(Cell::new(value)),
        }
    }

    pub fn get(&self) -> T {
        self.cell.get()
    }

    pub fn set(&self, value: T) {
        self.cell.set(value);
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: StateValue> Default for Slot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: StateValue + fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&self.cell.get()).finish()
    }
}
