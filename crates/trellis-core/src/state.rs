use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::composer_context;
use crate::runtime::RuntimeHandle;

struct StateInner<T> {
    value: RefCell<T>,
    runtime: RuntimeHandle,
}

/// Mutable state cell whose writes schedule another render pass.
///
/// Cells are single-threaded and shared by handle; every write goes through
/// the owning runtime so `Composition::should_render` reports pending work.
pub struct MutableState<T: Clone + 'static> {
    inner: Rc<StateInner<T>>,
}

impl<T: Clone + 'static> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> PartialEq for MutableState<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + 'static> Eq for MutableState<T> {}

impl<T: Clone + 'static> MutableState<T> {
    pub fn with_runtime(value: T, runtime: RuntimeHandle) -> Self {
        Self {
            inner: Rc::new(StateInner {
                value: RefCell::new(value),
                runtime,
            }),
        }
    }

    /// Read-only view onto the same cell.
    pub fn as_state(&self) -> State<T> {
        State {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Mutate in place and schedule recomposition.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.inner.value.borrow_mut());
        self.inner.runtime.schedule();
        result
    }

    /// Replace the stored value and schedule recomposition.
    pub fn replace(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.inner.runtime.schedule();
    }

    pub fn set_value(&self, value: T) {
        self.replace(value);
    }

    pub fn set(&self, value: T) {
        self.replace(value);
    }

    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn get(&self) -> T {
        self.value()
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableState")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

/// Read-only handle onto a [`MutableState`] cell.
pub struct State<T: Clone + 'static> {
    inner: Rc<StateInner<T>>,
}

impl<T: Clone + 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> State<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn get(&self) -> T {
        self.value()
    }
}

/// Create a state cell bound to the runtime of the active composition.
///
/// # Panics
/// Panics when called outside a composition; use
/// [`MutableState::with_runtime`] to build cells by hand.
#[allow(non_snake_case)]
pub fn mutableStateOf<T: Clone + 'static>(initial: T) -> MutableState<T> {
    composer_context::with_composer(|composer| {
        MutableState::with_runtime(initial, composer.runtime_handle())
    })
}
