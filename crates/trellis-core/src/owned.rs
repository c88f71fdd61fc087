use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle to a value kept alive in a composition slot.
///
/// `remember` hands these out instead of plain references so the value can
/// outlive the borrow of the group that stores it. Every clone points at the
/// same cell; the cell is dropped together with its slot when the group goes
/// stale. Mutating through [`Owned::update`] does not mark the composition
/// dirty; use [`MutableState`](crate::MutableState) for values the tree
/// reacts to.
pub struct Owned<T> {
    cell: Rc<RefCell<T>>,
}

impl<T> Owned<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    /// Read the remembered value through `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    /// Mutate the remembered value through `f`.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.cell.borrow_mut())
    }
}

impl<T: Clone> Owned<T> {
    /// Copy the remembered value out of the cell.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }
}

impl<T> Clone for Owned<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| f.debug_tuple("Owned").field(value).finish())
    }
}
