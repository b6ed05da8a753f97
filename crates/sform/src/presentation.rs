// File: src/presentation.rs
// Purpose: Reflect a validation outcome in state classes and hint elements

use std::iter;
use tracing::debug;

use crate::binder::BoundField;
use crate::config::ClassConfig;
use crate::dom::Dom;
use crate::rules::{HintKind, RuleKind};
use crate::validator::ValidationOutcome;

/// Applies outcomes to the page.
///
/// Hints are looked up on every call as the first element with the hint
/// class inside the field's parent, so hints cloned or replaced after binding
/// are still found.
pub struct Presenter<'a> {
    classes: &'a ClassConfig,
}

impl<'a> Presenter<'a> {
    pub fn new(classes: &'a ClassConfig) -> Self {
        Self { classes }
    }

    /// The hint element for `kind` next to `field`
    pub fn hint<D: Dom>(&self, dom: &D, field: &D::Node, kind: HintKind) -> Option<D::Node> {
        let parent = dom.parent(field)?;
        dom.elements_by_class(Some(&parent), &self.classes.hint_class(kind))
            .into_iter()
            .next()
    }

    pub fn present<D: Dom>(&self, dom: &mut D, field: &BoundField<D::Node>, outcome: &ValidationOutcome) {
        let node = field.node();

        let configured: Vec<HintKind> = field
            .rules()
            .kinds()
            .map(HintKind::Rule)
            .chain(iter::once(HintKind::Success))
            .collect();
        for kind in configured {
            if let Some(hint) = self.hint(dom, node, kind) {
                dom.set_visible(&hint, false);
            }
        }

        let valid = self.classes.valid_class();
        let invalid = self.classes.invalid_class();
        match outcome.failed {
            None => {
                dom.add_class(node, &valid);
                dom.remove_class(node, &invalid);
            }
            // An empty required field is neutral, not an error
            Some(RuleKind::Required) => {
                dom.remove_class(node, &valid);
                dom.remove_class(node, &invalid);
            }
            Some(_) => {
                dom.add_class(node, &invalid);
                dom.remove_class(node, &valid);
            }
        }

        let shown = outcome.hint();
        match self.hint(dom, node, shown) {
            Some(hint) => dom.set_visible(&hint, true),
            None => debug!(field = %dom.describe(node), hint = %shown, "no hint element to show"),
        }
    }
}
