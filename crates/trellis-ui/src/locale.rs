//! Locale resolution for the configuration provider.
//!
//! The provider resolves an effective locale from its explicit prop or, when
//! absent, from the nearest published locale ("legacy" resolution). The
//! published [`LocaleContextValue`] carries an origin marker so descendants
//! can tell the two apart.

use std::cell::RefCell;

use trellis_core::{compositionLocalOf, CompositionLocal};

use crate::validate::ValidateMessages;

#[derive(Clone, Debug, PartialEq)]
pub struct ListLocale {
    pub empty_text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormLocale {
    pub default_validate_messages: ValidateMessages,
}

/// A locale bundle. Component sections are optional so partial bundles merge
/// field-by-field at use sites.
#[derive(Clone, Debug, PartialEq)]
pub struct Locale {
    pub locale: String,
    pub list: Option<ListLocale>,
    pub form: Option<FormLocale>,
}

impl Locale {
    /// The built-in English locale, used when nothing above provides one.
    pub fn fallback() -> Self {
        Self {
            locale: "en".to_string(),
            list: Some(ListLocale {
                empty_text: "No data".to_string(),
            }),
            form: None,
        }
    }
}

/// How the published locale was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocaleOrigin {
    /// Supplied directly to the provider.
    Explicit,
    /// Inherited from an enclosing locale scope or the built-in fallback.
    Legacy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocaleContextValue {
    pub locale: Locale,
    pub origin: LocaleOrigin,
}

pub fn local_locale() -> CompositionLocal<Option<LocaleContextValue>> {
    thread_local! {
        static LOCAL_LOCALE: RefCell<Option<CompositionLocal<Option<LocaleContextValue>>>> =
            const { RefCell::new(None) };
    }
    LOCAL_LOCALE.with(|cell| {
        let mut opt = cell.borrow_mut();
        if opt.is_none() {
            *opt = Some(compositionLocalOf(|| None));
        }
        opt.as_ref().unwrap().clone()
    })
}

/// The nearest published locale, or the built-in fallback. Consumed by the
/// configuration provider when no explicit locale prop is set.
pub fn receive_legacy_locale() -> Locale {
    local_locale()
        .current()
        .map(|value| value.locale)
        .unwrap_or_else(Locale::fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_english_with_list_text() {
        let locale = Locale::fallback();
        assert_eq!(locale.locale, "en");
        assert_eq!(locale.list.unwrap().empty_text, "No data");
        assert!(locale.form.is_none());
    }

    #[test]
    fn receiver_falls_back_outside_any_scope() {
        assert_eq!(receive_legacy_locale(), Locale::fallback());
    }
}
