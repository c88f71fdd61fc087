//! Form validation messages merged and published by the configuration
//! provider.

use std::cell::RefCell;

use indexmap::IndexMap;
use trellis_core::{compositionLocalOf, CompositionLocal};

/// Ordered key-to-message map. Iteration order is insertion order so merged
/// results stay deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidateMessages {
    messages: IndexMap<String, String>,
}

impl ValidateMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    /// Overlay `other` on top of this map; `other` wins key-by-key.
    pub fn merge(&mut self, other: &ValidateMessages) {
        for (key, message) in &other.messages {
            self.messages.insert(key.clone(), message.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.messages
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ValidateMessages {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

/// Form-related props accepted by the configuration provider.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormConfig {
    pub validate_messages: Option<ValidateMessages>,
}

/// `None` when no enclosing provider chose to publish messages: subtrees
/// without messages are passed through unwrapped.
pub fn local_validate_messages() -> CompositionLocal<Option<ValidateMessages>> {
    thread_local! {
        static LOCAL_VALIDATE: RefCell<Option<CompositionLocal<Option<ValidateMessages>>>> =
            const { RefCell::new(None) };
    }
    LOCAL_VALIDATE.with(|cell| {
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

    fn messages(pairs: &[(&str, &str)]) -> ValidateMessages {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn merge_overlays_key_by_key() {
        let mut merged = ValidateMessages::new();
        merged.merge(&messages(&[("required", "R")]));
        merged.merge(&messages(&[("required", "L2"), ("email", "E")]));
        assert_eq!(merged.get("required"), Some("L2"));
        assert_eq!(merged.get("email"), Some("E"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_keeps_insertion_order() {
        let mut merged = messages(&[("a", "1"), ("b", "2")]);
        merged.merge(&messages(&[("a", "3"), ("c", "4")]));
        let keys: Vec<&str> = merged.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_map_reports_empty() {
        assert!(ValidateMessages::new().is_empty());
        assert!(!messages(&[("x", "y")]).is_empty());
    }
}
