use std::cell::RefCell;
use std::rc::Rc;

use crate::{Composer, ComposerCore};

// Renders never nest in this runtime, so the active composer is a single
// thread-local slot rather than a stack. `activate` refuses re-entry.
thread_local! {
    static ACTIVE: RefCell<Option<Rc<ComposerCore>>> = const { RefCell::new(None) };
}

/// Clears the active-composer slot when the render scope ends.
#[must_use = "dropping the guard deactivates the composer"]
pub struct ScopeGuard(());

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ACTIVE.with(|slot| slot.borrow_mut().take());
    }
}

pub(crate) fn activate(composer: &Composer) -> ScopeGuard {
    ACTIVE.with(|slot| {
        let mut slot = slot.borrow_mut();
        assert!(
            slot.is_none(),
            "activate: a composition is already rendering on this thread"
        );
        *slot = Some(composer.clone_core());
    });
    ScopeGuard(())
}

fn current() -> Option<Composer> {
    ACTIVE
        .with(|slot| slot.borrow().clone())
        .map(Composer::from_core)
}

/// Run `f` against the composer of the render in progress.
///
/// # Panics
/// Panics when no composition is rendering on this thread.
pub fn with_composer<R>(f: impl FnOnce(&Composer) -> R) -> R {
    let composer = current().expect("with_composer: no active composition");
    f(&composer)
}

/// Non-panicking variant of [`with_composer`]: `None` outside of a render.
pub fn try_with_composer<R>(f: impl FnOnce(&Composer) -> R) -> Option<R> {
    let composer = current()?;
    Some(f(&composer))
}
