//! Configuration provider: merges explicit overrides with the inherited
//! ambient configuration and republishes the result for a subtree.

#![allow(non_snake_case)]

use std::rc::Rc;

use trellis_core::CompositionLocalProvider;

use crate::composable;
use crate::context::{
    local_component_size, local_config, ComponentSize, Csp, Direction, EmptyRenderer,
    PageHeaderConfig, PopupContainerResolver, SpaceConfig,
};
use crate::locale::{local_locale, receive_legacy_locale, Locale, LocaleContextValue, LocaleOrigin};
use crate::validate::{local_validate_messages, FormConfig, ValidateMessages};

/// Explicit overrides accepted by [`ConfigProvider`]. Every field is optional
/// and defaulted independently.
#[derive(Clone, Default)]
pub struct ConfigProviderProps {
    pub prefix_cls: Option<String>,
    pub get_popup_container: Option<PopupContainerResolver>,
    pub render_empty: Option<EmptyRenderer>,
    pub csp: Option<Csp>,
    pub auto_insert_space_in_button: Option<bool>,
    pub locale: Option<Locale>,
    pub direction: Option<Direction>,
    pub space: Option<SpaceConfig>,
    pub component_size: Option<ComponentSize>,
    pub page_header: Option<PageHeaderConfig>,
    pub form: Option<FormConfig>,
}

impl ConfigProviderProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix_cls(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_cls = Some(prefix.into());
        self
    }

    pub fn get_popup_container(mut self, resolver: PopupContainerResolver) -> Self {
        self.get_popup_container = Some(resolver);
        self
    }

    pub fn render_empty(mut self, renderer: impl Fn(&str) + 'static) -> Self {
        self.render_empty = Some(Rc::new(renderer));
        self
    }

    pub fn csp(mut self, csp: Csp) -> Self {
        self.csp = Some(csp);
        self
    }

    pub fn auto_insert_space_in_button(mut self, value: bool) -> Self {
        self.auto_insert_space_in_button = Some(value);
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn space(mut self, space: SpaceConfig) -> Self {
        self.space = Some(space);
        self
    }

    pub fn component_size(mut self, size: ComponentSize) -> Self {
        self.component_size = Some(size);
        self
    }

    pub fn page_header(mut self, config: PageHeaderConfig) -> Self {
        self.page_header = Some(config);
        self
    }

    pub fn form(mut self, form: FormConfig) -> Self {
        self.form = Some(form);
        self
    }
}

/// Publish a merged configuration for `content`.
///
/// The merge starts from the nearest inherited context. `get_popup_container`,
/// `render_empty`, and `page_header` inherit when absent; `csp`,
/// `auto_insert_space_in_button`, and `space` are set from the local props
/// unconditionally, so absence replaces an ancestor's value with unset.
/// `direction` inherits when absent so nested providers shadow only what they
/// override. The resolved locale is republished with an origin marker, and a
/// validate-message scope is added only when the merged map is non-empty.
#[composable]
pub fn ConfigProvider(props: ConfigProviderProps, content: impl FnOnce() + 'static) {
    let parent = local_config().current();
    let mut merged = parent.clone();

    let parent_prefix = parent.get_prefix_cls.clone();
    let local_prefix = props.prefix_cls.clone();
    merged.get_prefix_cls = Rc::new(move |suffix, custom| {
        if let Some(custom) = custom {
            return custom.to_string();
        }
        let root = local_prefix
            .clone()
            .unwrap_or_else(|| parent_prefix(None, None));
        match suffix {
            Some(suffix) if !suffix.is_empty() => format!("{root}-{suffix}"),
            _ => root,
        }
    });

    if props.get_popup_container.is_some() {
        merged.get_popup_container = props.get_popup_container.clone();
    }
    if props.render_empty.is_some() {
        merged.render_empty = props.render_empty.clone();
    }
    if props.page_header.is_some() {
        merged.page_header = props.page_header;
    }

    merged.csp = props.csp.clone();
    merged.auto_insert_space_in_button = props.auto_insert_space_in_button;
    merged.space = props.space;
    if props.direction.is_some() {
        merged.direction = props.direction;
    }

    let (locale, origin) = match props.locale.clone() {
        Some(locale) => (locale, LocaleOrigin::Explicit),
        None => (receive_legacy_locale(), LocaleOrigin::Legacy),
    };
    merged.locale = Some(locale.clone());

    let mut validate = ValidateMessages::new();
    if let Some(form) = locale.form.as_ref() {
        validate.merge(&form.default_validate_messages);
    }
    if let Some(local) = props.form.as_ref().and_then(|f| f.validate_messages.as_ref()) {
        validate.merge(local);
    }

    // Locals shadow per key, so one provider group stands in for the stack
    // of size / config / locale / validate layers.
    let mut values = Vec::with_capacity(4);
    if let Some(size) = props.component_size {
        values.push(local_component_size().provides(Some(size)));
    }
    values.push(local_config().provides(merged));
    values.push(local_locale().provides(Some(LocaleContextValue { locale, origin })));
    if !validate.is_empty() {
        values.push(local_validate_messages().provides(Some(validate)));
    }
    CompositionLocalProvider(values, content);
}
