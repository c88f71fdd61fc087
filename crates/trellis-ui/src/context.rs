//! Ambient configuration shared by every component in a subtree.
//!
//! The [`ConfigContext`] record travels through a composition local and is
//! resolved by nearest-ancestor lookup: a [`crate::ConfigProvider`] merges its
//! overrides with the inherited context and republishes the result for its
//! subtree. Without any provider the hard-coded root default applies.

use std::cell::RefCell;
use std::rc::Rc;

use trellis_core::{compositionLocalOf, CompositionLocal, NodeId};

use crate::locale::Locale;

/// Root naming prefix used when no provider overrides it.
pub const DEFAULT_PREFIX: &str = "trellis";

/// Text direction published to descendants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Size class scoped to a subtree via [`local_component_size`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentSize {
    Small,
    Middle,
    Large,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpaceSize {
    Small,
    Middle,
    Large,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpaceConfig {
    pub size: SpaceSize,
}

/// Content-security-policy passthrough for style injection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Csp {
    pub nonce: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageHeaderConfig {
    pub ghost: bool,
}

/// Composes class-name prefixes: `(suffix, custom)` where an explicit
/// `custom` wins verbatim.
pub type PrefixClsFn = Rc<dyn Fn(Option<&str>, Option<&str>) -> String>;

/// Resolves the node popups should mount under. Opaque to this crate.
pub type PopupContainerResolver = Rc<dyn Fn() -> Option<NodeId>>;

/// Emits an empty-state subtree for the named component kind.
pub type EmptyRenderer = Rc<dyn Fn(&str)>;

/// The ambient configuration record. Cheap to clone; closure fields are
/// shared by handle.
#[derive(Clone)]
pub struct ConfigContext {
    pub get_prefix_cls: PrefixClsFn,
    pub get_popup_container: Option<PopupContainerResolver>,
    pub render_empty: Option<EmptyRenderer>,
    pub csp: Option<Csp>,
    pub auto_insert_space_in_button: Option<bool>,
    pub locale: Option<Locale>,
    pub direction: Option<Direction>,
    pub space: Option<SpaceConfig>,
    pub page_header: Option<PageHeaderConfig>,
}

impl ConfigContext {
    /// `get_prefix_cls` as a method call.
    pub fn prefix_cls(&self, suffix: Option<&str>, custom: Option<&str>) -> String {
        (self.get_prefix_cls)(suffix, custom)
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self.direction, Some(Direction::Rtl))
    }
}

impl Default for ConfigContext {
    fn default() -> Self {
        Self {
            get_prefix_cls: Rc::new(default_prefix_cls),
            get_popup_container: None,
            render_empty: None,
            csp: None,
            auto_insert_space_in_button: None,
            locale: None,
            direction: None,
            space: None,
            page_header: None,
        }
    }
}

fn default_prefix_cls(suffix: Option<&str>, custom: Option<&str>) -> String {
    if let Some(custom) = custom {
        return custom.to_string();
    }
    match suffix {
        Some(suffix) if !suffix.is_empty() => format!("{DEFAULT_PREFIX}-{suffix}"),
        _ => DEFAULT_PREFIX.to_string(),
    }
}

/// The configuration local. Reading outside any provider yields the root
/// default.
pub fn local_config() -> CompositionLocal<ConfigContext> {
    thread_local! {
        static LOCAL_CONFIG: RefCell<Option<CompositionLocal<ConfigContext>>> =
            const { RefCell::new(None) };
    }
    LOCAL_CONFIG.with(|cell| {
        let mut opt = cell.borrow_mut();
        if opt.is_none() {
            *opt = Some(compositionLocalOf(ConfigContext::default));
        }
        opt.as_ref().unwrap().clone()
    })
}

/// Component size scoped separately from the main record so providers can
/// leave it untouched.
pub fn local_component_size() -> CompositionLocal<Option<ComponentSize>> {
    thread_local! {
        static LOCAL_SIZE: RefCell<Option<CompositionLocal<Option<ComponentSize>>>> =
            const { RefCell::new(None) };
    }
    LOCAL_SIZE.with(|cell| {
        let mut opt = cell.borrow_mut();
        if opt.is_none() {
            *opt = Some(compositionLocalOf(|| None));
        }
        opt.as_ref().unwrap().clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_default_prefix_composition() {
        let ctx = ConfigContext::default();
        assert_eq!(ctx.prefix_cls(Some("list"), None), "trellis-list");
        assert_eq!(ctx.prefix_cls(None, None), "trellis");
        assert_eq!(ctx.prefix_cls(Some(""), None), "trellis");
        assert_eq!(ctx.prefix_cls(Some("list"), Some("my-list")), "my-list");
    }

    #[test]
    fn default_context_is_unconfigured() {
        let ctx = ConfigContext::default();
        assert!(ctx.render_empty.is_none());
        assert!(ctx.direction.is_none());
        assert!(!ctx.is_rtl());
    }

    #[test]
    fn locals_resolve_defaults_outside_composition() {
        assert_eq!(
            local_config().current().prefix_cls(None, None),
            "trellis"
        );
        assert_eq!(local_component_size().current(), None);
    }
}
