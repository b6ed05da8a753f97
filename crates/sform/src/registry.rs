// File: src/registry.rs
// Purpose: Bootstrap every form on a page and route events to bound fields

use std::fmt::Debug;
use tracing::{debug, error, info};

use crate::binder::{BoundForm, FormBinder};
use crate::config::Config;
use crate::dom::Dom;
use crate::error::BindError;
use crate::predicates::PredicateRegistry;
use crate::validator::{ValidationOutcome, Validity};

pub const SUBMIT_EVENT: &str = "submit";

/// What the host should do after an event was dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing is bound to this target and event
    Ignored,
    /// One or more fields were re-validated
    Handled,
    /// Submit of a form whose fields are all valid
    Proceed,
    /// Submit of a form with a field that is invalid or never validated,
    /// or of a form whose markup failed to bind
    Cancel,
}

impl Dispatch {
    pub fn should_cancel(self) -> bool {
        self == Dispatch::Cancel
    }
}

/// Owns every bound form of a page.
///
/// Binding, event routing and teardown all go through here; dropping the
/// registry (or calling [`clear`](Self::clear)) forgets all bound state.
/// Forms that fail to bind stay blocked: their submit is always cancelled.
///
/// # Example
///
/// ```
/// use sform::{Config, Dispatch, Document, Element, FormRegistry, PredicateRegistry};
///
/// let mut doc = Document::new();
/// let form = doc.append(doc.root(), Element::new("form").class("SForm"));
/// let age = doc.append(form, Element::new("input").class("SForm-field").data("type", "int"));
///
/// let mut registry = FormRegistry::bootstrap(&mut doc, Config::default(), PredicateRegistry::new());
/// assert_eq!(registry.dispatch(&mut doc, &form, "submit"), Dispatch::Cancel);
///
/// doc.set_value(age, "42");
/// registry.dispatch(&mut doc, &age, "keyup");
/// assert_eq!(registry.dispatch(&mut doc, &form, "submit"), Dispatch::Proceed);
/// ```
#[derive(Debug)]
pub struct FormRegistry<N> {
    config: Config,
    predicates: PredicateRegistry,
    forms: Vec<BoundForm<N>>,
    blocked: Vec<N>,
    errors: Vec<BindError>,
}

impl<N: Clone + PartialEq + Debug> FormRegistry<N> {
    pub fn new(config: Config, predicates: PredicateRegistry) -> Self {
        Self {
            config,
            predicates,
            forms: Vec::new(),
            blocked: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Creates a registry and binds every root-marked form of `dom`
    pub fn bootstrap<D: Dom<Node = N>>(dom: &mut D, config: Config, predicates: PredicateRegistry) -> Self {
        let mut registry = Self::new(config, predicates);
        registry.bind_all(dom);
        registry
    }

    /// Binds every root-marked form not bound yet.
    ///
    /// A form that fails to bind is logged, kept in [`errors`](Self::errors)
    /// and marked blocked. Returns the number of newly bound forms.
    pub fn bind_all<D: Dom<Node = N>>(&mut self, dom: &mut D) -> usize {
        let candidates = dom.elements_by_class(None, self.config.classes.root());
        let mut bound = 0;

        for form in candidates {
            if self.form(&form).is_some() {
                continue;
            }
            match self.bind(dom, &form) {
                Ok(_) => bound += 1,
                Err(err) => {
                    error!(form = %dom.describe(&form), error = %err, "form not bound");
                    if !self.blocked.contains(&form) {
                        self.blocked.push(form);
                    }
                    self.errors.push(err);
                }
            }
        }

        info!(bound, blocked = self.blocked.len(), total = self.forms.len(), "sform ready");
        bound
    }

    /// Binds one form. Returns its index among bound forms.
    pub fn bind<D: Dom<Node = N>>(&mut self, dom: &mut D, form: &N) -> Result<usize, BindError> {
        if self.form(form).is_some() {
            return Err(BindError::AlreadyBound {
                form: dom.describe(form),
            });
        }
        let bound = FormBinder::new(&self.config, &self.predicates).bind(dom, form)?;
        self.blocked.retain(|node| node != form);
        self.forms.push(bound);
        Ok(self.forms.len() - 1)
    }

    /// Forgets a form, bound or blocked; its fields stop reacting to events
    pub fn unbind(&mut self, form: &N) -> bool {
        let before = self.forms.len() + self.blocked.len();
        self.forms.retain(|bound| bound.node() != form);
        self.blocked.retain(|node| node != form);
        before != self.forms.len() + self.blocked.len()
    }

    /// Forgets every form and recorded error
    pub fn clear(&mut self) {
        self.forms.clear();
        self.blocked.clear();
        self.errors.clear();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn forms(&self) -> &[BoundForm<N>] {
        &self.forms
    }

    pub fn form(&self, node: &N) -> Option<&BoundForm<N>> {
        self.forms.iter().find(|bound| bound.node() == node)
    }

    /// Bind failures collected by [`bind_all`](Self::bind_all)
    pub fn errors(&self) -> &[BindError] {
        &self.errors
    }

    /// Root-marked forms that failed to bind
    pub fn blocked(&self) -> &[N] {
        &self.blocked
    }

    pub fn is_blocked(&self, form: &N) -> bool {
        self.blocked.contains(form)
    }

    /// Every distinct `(target, event)` pair the host must listen to,
    /// including `submit` on each bound or blocked form, in registration order
    pub fn listen_points(&self) -> Vec<(N, String)> {
        let mut points: Vec<(N, String)> = Vec::new();
        for form in &self.forms {
            let pairs = form
                .listeners()
                .iter()
                .map(|l| (l.target.clone(), l.event.clone()))
                .chain(std::iter::once((form.node().clone(), SUBMIT_EVENT.to_string())));
            for pair in pairs {
                if !points.contains(&pair) {
                    points.push(pair);
                }
            }
        }
        for form in &self.blocked {
            let pair = (form.clone(), SUBMIT_EVENT.to_string());
            if !points.contains(&pair) {
                points.push(pair);
            }
        }
        points
    }

    /// Routes `event` on `target` to the bound forms.
    ///
    /// Listeners run in registration order. A submit on a bound form runs
    /// the submission gate instead.
    pub fn dispatch<D: Dom<Node = N>>(&mut self, dom: &mut D, target: &N, event: &str) -> Dispatch {
        if event == SUBMIT_EVENT {
            if let Some(form) = self.form(target) {
                return submission_gate(form);
            }
            if self.is_blocked(target) {
                debug!(form = ?target, "submit blocked: form failed to bind");
                return Dispatch::Cancel;
            }
        }

        let mut handled = false;
        let classes = &self.config.classes;
        for form in &mut self.forms {
            for index in form.listening(target, event) {
                form.validate_field(dom, index, classes);
                handled = true;
            }
        }

        if handled {
            Dispatch::Handled
        } else {
            Dispatch::Ignored
        }
    }

    /// Re-validates every bound field backed by `field`
    pub fn validate_field<D: Dom<Node = N>>(&mut self, dom: &mut D, field: &N) -> Option<ValidationOutcome> {
        let classes = &self.config.classes;
        let mut last = None;
        for form in &mut self.forms {
            if let Some(index) = form.field_index(field) {
                last = form.validate_field(dom, index, classes);
            }
        }
        last
    }

    pub fn validity(&self, field: &N) -> Option<Validity> {
        self.forms.iter().find_map(|form| {
            form.field_index(field)
                .map(|index| form.fields()[index].validity())
        })
    }

    /// `Some(false)` for a blocked form
    pub fn is_form_valid(&self, form: &N) -> Option<bool> {
        match self.form(form) {
            Some(bound) => Some(bound.is_valid()),
            None if self.is_blocked(form) => Some(false),
            None => None,
        }
    }
}

fn submission_gate<N: Clone + PartialEq + Debug>(form: &BoundForm<N>) -> Dispatch {
    match form.fields().iter().find(|field| !field.validity().is_valid()) {
        Some(field) => {
            debug!(field = ?field.node(), validity = ?field.validity(), "submit blocked");
            Dispatch::Cancel
        }
        None => Dispatch::Proceed,
    }
}
