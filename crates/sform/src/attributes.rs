// File: src/attributes.rs
// Purpose: Read validation configuration from data attributes

use std::collections::BTreeMap;

use crate::dom::Dom;
use crate::rules::RuleKind;

/// Form attribute overriding the trigger event (`data-event`)
pub const EVENT_KEY: &str = "event";

/// Hint attribute naming the template to clone (`data-copy`)
pub const COPY_KEY: &str = "copy";

/// Rule kind → raw parameter, as declared in markup.
///
/// Keyed by [`RuleKind`], so iteration always follows evaluation order no
/// matter how the attributes were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationConfig {
    entries: BTreeMap<RuleKind, String>,
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: RuleKind, param: impl Into<String>) {
        self.entries.insert(kind, param.into());
    }

    pub fn get(&self, kind: RuleKind) -> Option<&str> {
        self.entries.get(&kind).map(String::as_str)
    }

    pub fn contains(&self, kind: RuleKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleKind, &str)> {
        self.entries.iter().map(|(kind, param)| (*kind, param.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(RuleKind, S)> for ValidationConfig {
    fn from_iter<I: IntoIterator<Item = (RuleKind, S)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (kind, param) in iter {
            config.insert(kind, param);
        }
        config
    }
}

/// Reads every recognized `data-*` key from `field`.
///
/// Any other data attribute is ignored. `data-required` is a presence flag,
/// so its (usually empty) value is kept as is.
pub fn read_config<D: Dom>(dom: &D, field: &D::Node) -> ValidationConfig {
    RuleKind::ALL
        .into_iter()
        .filter_map(|kind| dom.data(field, kind.as_str()).map(|param| (kind, param)))
        .collect()
}

/// The event that re-validates fields of `form`
pub fn trigger_event<D: Dom>(dom: &D, form: &D::Node, default: &str) -> String {
    dom.data(form, EVENT_KEY)
        .map(|event| event.trim().to_string())
        .filter(|event| !event.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Id of the template a hint should be cloned from
pub fn copy_source<D: Dom>(dom: &D, element: &D::Node) -> Option<String> {
    dom.data(element, COPY_KEY)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}
