use std::cell::Cell;
use std::rc::Rc;

struct RuntimeInner {
    needs_frame: Cell<bool>,
}

/// Drives recomposition scheduling for a single composition.
///
/// The runtime is a dirty flag with handles: state writes schedule a frame,
/// `Composition::render` clears it once the tree is up to date. Everything is
/// single-threaded; handles are cheap clones of the same flag.
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                needs_frame: Cell::new(false),
            }),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn set_needs_frame(&self, value: bool) {
        self.inner.needs_frame.set(value);
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle onto a [`Runtime`], held by state cells and composers.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Rc<RuntimeInner>,
}

impl RuntimeHandle {
    /// Request another render pass.
    pub fn schedule(&self) {
        self.inner.needs_frame.set(true);
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn set_needs_frame(&self, value: bool) {
        self.inner.needs_frame.set(value);
    }

    /// Whether two handles drive the same runtime.
    pub fn same_runtime(&self, other: &RuntimeHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
