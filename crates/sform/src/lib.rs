//! SForm
//!
//! Declarative form validation driven by markup. Forms carrying the root
//! marker class are discovered, their fields' `data-*` attributes are
//! compiled into rules, and every input event re-validates the field,
//! toggles its state classes and reveals the matching hint element.
//!
//! The engine reaches the page only through the [`Dom`] trait. [`Document`]
//! implements it in memory; the `sform-wasm` crate implements it for
//! browsers.

pub mod attributes;
pub mod binder;
pub mod config;
pub mod document;
pub mod dom;
pub mod error;
pub mod predicates;
pub mod presentation;
pub mod registry;
pub mod rules;
pub mod validator;

pub use attributes::{read_config, ValidationConfig};
pub use binder::{BoundField, BoundForm, FormBinder, Listener};
pub use config::Config;
pub use document::{Document, Element, NodeId};
pub use dom::Dom;
pub use error::BindError;
pub use predicates::{Predicate, PredicateRegistry};
pub use presentation::Presenter;
pub use registry::{Dispatch, FormRegistry};
pub use rules::{FieldRules, HintKind, Rule, RuleKind, TypePattern};
pub use validator::{validate, ValidationOutcome, Validity};
