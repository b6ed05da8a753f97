// File: src/error.rs
// Purpose: Configuration faults detected while binding a form

use thiserror::Error;

use crate::rules::{HintKind, RuleKind};

/// Why a form could not be bound.
///
/// Every variant is a markup defect; nothing here is raised while the user
/// is typing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("field {field}: unknown data-type `{name}` (expected int, float or email)")]
    UnknownType { field: String, name: String },

    #[error("field {field}: data-{kind} must be a non-negative integer, got `{value}`")]
    InvalidLength {
        field: String,
        kind: RuleKind,
        value: String,
    },

    #[error("field {field}: data-refers points at `#{target}`, which does not exist")]
    MissingReferTarget { field: String, target: String },

    #[error("field {field}: no predicate registered as `{name}`")]
    UnresolvedPredicate { field: String, name: String },

    #[error("{kind} hint: data-copy template `#{template}` has no matching hint to clone")]
    MissingCopyTemplate { kind: HintKind, template: String },

    #[error("form {form} is already bound")]
    AlreadyBound { form: String },
}
