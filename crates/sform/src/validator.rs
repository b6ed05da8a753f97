// File: src/validator.rs
// Purpose: Run a field's rules and record the result

use tracing::debug;

use crate::binder::BoundField;
use crate::dom::Dom;
use crate::rules::{FieldRules, HintKind, RuleKind};

/// Transient validity flag of a bound field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    /// Never validated yet
    #[default]
    Unknown,
    Valid,
    Invalid,
}

impl Validity {
    pub fn is_valid(self) -> bool {
        self == Validity::Valid
    }
}

impl From<bool> for Validity {
    fn from(valid: bool) -> Self {
        if valid {
            Validity::Valid
        } else {
            Validity::Invalid
        }
    }
}

/// Result of one validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    /// First rule that failed; `None` when every rule passed
    pub failed: Option<RuleKind>,
}

impl ValidationOutcome {
    pub fn success() -> Self {
        Self {
            valid: true,
            failed: None,
        }
    }

    pub fn failure(kind: RuleKind) -> Self {
        Self {
            valid: false,
            failed: Some(kind),
        }
    }

    /// The hint this outcome should reveal
    pub fn hint(&self) -> HintKind {
        match self.failed {
            Some(kind) => HintKind::Rule(kind),
            None => HintKind::Success,
        }
    }

    pub fn validity(&self) -> Validity {
        Validity::from(self.valid)
    }
}

/// Checks `value` against `rules`, stopping at the first failure
pub fn evaluate<D: Dom>(dom: &D, rules: &FieldRules<D::Node>, value: &str) -> ValidationOutcome {
    rules
        .iter()
        .find(|rule| !rule.check(dom, value))
        .map(|rule| ValidationOutcome::failure(rule.kind()))
        .unwrap_or_else(ValidationOutcome::success)
}

/// Validates the field's current value and stores the resulting flag
pub fn validate<D: Dom>(dom: &D, field: &mut BoundField<D::Node>) -> ValidationOutcome {
    let value = dom.value(field.node());
    let outcome = evaluate(dom, field.rules(), &value);
    field.set_validity(outcome.validity());

    debug!(
        field = %dom.describe(field.node()),
        valid = outcome.valid,
        hint = %outcome.hint(),
        "validated field"
    );

    outcome
}
