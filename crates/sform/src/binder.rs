// File: src/binder.rs
// Purpose: Prepare one form: compile field rules, set up hints, record listeners

use tracing::{debug, warn};

use crate::attributes::{copy_source, read_config, trigger_event};
use crate::config::{ClassConfig, Config};
use crate::dom::Dom;
use crate::error::BindError;
use crate::predicates::PredicateRegistry;
use crate::presentation::Presenter;
use crate::rules::{FieldRules, HintKind, RuleKind};
use crate::validator::{self, ValidationOutcome, Validity};

/// Always listened to alongside the form's trigger event
pub const CHANGE_EVENT: &str = "change";

/// A tracked field and its transient validity
#[derive(Debug, Clone)]
pub struct BoundField<N> {
    node: N,
    rules: FieldRules<N>,
    validity: Validity,
}

impl<N> BoundField<N> {
    pub fn new(node: N, rules: FieldRules<N>) -> Self {
        Self {
            node,
            rules,
            validity: Validity::Unknown,
        }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn rules(&self) -> &FieldRules<N> {
        &self.rules
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub(crate) fn set_validity(&mut self, validity: Validity) {
        self.validity = validity;
    }
}

/// "When `event` fires on `target`, re-validate field number `field`"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener<N> {
    pub target: N,
    pub event: String,
    pub field: usize,
}

/// A form after binding
#[derive(Debug, Clone)]
pub struct BoundForm<N> {
    node: N,
    trigger: String,
    fields: Vec<BoundField<N>>,
    listeners: Vec<Listener<N>>,
}

impl<N: Clone + PartialEq> BoundForm<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Event that re-validates fields as the user types
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn fields(&self) -> &[BoundField<N>] {
        &self.fields
    }

    /// Listeners in registration order
    pub fn listeners(&self) -> &[Listener<N>] {
        &self.listeners
    }

    pub fn field_index(&self, node: &N) -> Option<usize> {
        self.fields.iter().position(|field| field.node() == node)
    }

    /// Fields to re-validate when `event` fires on `target`, in order
    pub fn listening(&self, target: &N, event: &str) -> Vec<usize> {
        self.listeners
            .iter()
            .filter(|l| l.target == *target && l.event == event)
            .map(|l| l.field)
            .collect()
    }

    /// True only when every field has been validated and passed
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|field| field.validity().is_valid())
    }

    /// Validates field `index` and updates its presentation
    pub fn validate_field<D: Dom<Node = N>>(
        &mut self,
        dom: &mut D,
        index: usize,
        classes: &ClassConfig,
    ) -> Option<ValidationOutcome> {
        let field = self.fields.get_mut(index)?;
        let outcome = validator::validate(&*dom, field);
        Presenter::new(classes).present(dom, field, &outcome);
        Some(outcome)
    }
}

/// Binds forms using one configuration and predicate set
pub struct FormBinder<'a> {
    config: &'a Config,
    predicates: &'a PredicateRegistry,
}

impl<'a> FormBinder<'a> {
    pub fn new(config: &'a Config, predicates: &'a PredicateRegistry) -> Self {
        Self { config, predicates }
    }

    /// Binds `form`.
    ///
    /// Every field's rules and every copy template are resolved before the
    /// page is touched, so a markup error leaves the form exactly as it was.
    pub fn bind<D: Dom>(&self, dom: &mut D, form: &D::Node) -> Result<BoundForm<D::Node>, BindError> {
        let field_class = self.config.classes.field_class();

        let mut fields = Vec::new();
        for node in dom.elements_by_class(Some(form), &field_class) {
            let config = read_config(dom, &node);
            let rules = FieldRules::compile(dom, &node, &config, self.predicates)?;
            fields.push(BoundField::new(node, rules));
        }

        let hints = self.resolve_hints(dom, form)?;
        self.prepare_hints(dom, hints);

        let trigger = trigger_event(dom, form, &self.config.events.default_trigger);
        let listeners = register_listeners(&fields, &trigger);

        debug!(
            form = %dom.describe(form),
            fields = fields.len(),
            listeners = listeners.len(),
            trigger = %trigger,
            "bound form"
        );

        Ok(BoundForm {
            node: form.clone(),
            trigger,
            fields,
            listeners,
        })
    }

    /// Every hint element of `form` in setup order, paired with the
    /// template to clone over it when it carries `data-copy`
    fn resolve_hints<D: Dom>(&self, dom: &D, form: &D::Node) -> Result<Vec<PendingHint<D::Node>>, BindError> {
        let classes = &self.config.classes;
        let mut hints = Vec::new();

        for kind in HintKind::ALL {
            let class = classes.hint_class(kind);
            for element in dom.elements_by_class(Some(form), &class) {
                let template = match copy_source(dom, &element) {
                    Some(id) => Some(find_template(dom, &id, kind, &class)?),
                    None => None,
                };
                hints.push(PendingHint { kind, element, template });
            }
        }

        Ok(hints)
    }

    /// Clones templated hints and sets every hint's initial visibility.
    ///
    /// Only hints carrying the required marker start out shown.
    fn prepare_hints<D: Dom>(&self, dom: &mut D, hints: Vec<PendingHint<D::Node>>) {
        let required = self.config.classes.hint_class(HintKind::Rule(RuleKind::Required));

        for PendingHint { kind, element, template } in hints {
            let element = match template {
                Some(template) => dom.replace_with_clone(&element, &template).unwrap_or_else(|| {
                    warn!(hint = %kind, "hint to replace is detached, keeping it");
                    element
                }),
                None => element,
            };
            let visible = dom.has_class(&element, &required);
            dom.set_visible(&element, visible);
        }
    }
}

struct PendingHint<N> {
    kind: HintKind,
    element: N,
    template: Option<N>,
}

/// The hint of class `class` next to element `#template`
fn find_template<D: Dom>(dom: &D, template: &str, kind: HintKind, class: &str) -> Result<D::Node, BindError> {
    dom.element_by_id(template)
        .and_then(|anchor| dom.parent(&anchor))
        .and_then(|parent| dom.elements_by_class(Some(&parent), class).into_iter().next())
        .ok_or_else(|| BindError::MissingCopyTemplate {
            kind,
            template: template.to_string(),
        })
}

/// Own listeners first, then every cross-field listener, so a field always
/// re-validates before the fields that refer to it.
fn register_listeners<N: Clone>(fields: &[BoundField<N>], trigger: &str) -> Vec<Listener<N>> {
    let mut events = vec![trigger.to_string()];
    if trigger != CHANGE_EVENT {
        events.push(CHANGE_EVENT.to_string());
    }

    let mut listeners = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        for event in &events {
            listeners.push(Listener {
                target: field.node().clone(),
                event: event.clone(),
                field: index,
            });
        }
    }
    for (index, field) in fields.iter().enumerate() {
        if let Some(target) = field.rules().refers_target() {
            for event in &events {
                listeners.push(Listener {
                    target: target.clone(),
                    event: event.clone(),
                    field: index,
                });
            }
        }
    }
    listeners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Element, NodeId};
    use pretty_assertions::assert_eq;

    struct Page {
        doc: Document,
        form: NodeId,
        password: NodeId,
        confirm: NodeId,
        required_hint: NodeId,
        refers_hint: NodeId,
        success_hint: NodeId,
    }

    // confirm is placed before the field it refers to
    fn page(event: Option<&str>) -> Page {
        let mut doc = Document::new();
        let mut form = Element::new("form").id("signup").class("SForm");
        if let Some(event) = event {
            form = form.data("event", event);
        }
        let form = doc.append(doc.root(), form);

        let group = doc.append(form, Element::new("div"));
        let confirm = doc.append(
            group,
            Element::new("input").id("confirm").class("SForm-field").data("refers", "password"),
        );
        let refers_hint = doc.append(group, Element::new("span").class("SForm-refers"));
        let success_hint = doc.append(group, Element::new("span").class("SForm-success"));

        let group = doc.append(form, Element::new("div"));
        let password = doc.append(
            group,
            Element::new("input").id("password").class("SForm-field").flag("required"),
        );
        let required_hint = doc.append(group, Element::new("span").class("SForm-required"));

        Page {
            doc,
            form,
            password,
            confirm,
            required_hint,
            refers_hint,
            success_hint,
        }
    }

    fn bind(page: &mut Page) -> Result<BoundForm<NodeId>, BindError> {
        let config = Config::default();
        let predicates = PredicateRegistry::new();
        FormBinder::new(&config, &predicates).bind(&mut page.doc, &page.form)
    }

    #[test]
    fn test_listener_order() {
        let mut page = page(None);
        let form = bind(&mut page).unwrap();

        let got: Vec<(NodeId, &str, usize)> = form
            .listeners()
            .iter()
            .map(|l| (l.target, l.event.as_str(), l.field))
            .collect();
        assert_eq!(
            got,
            vec![
                (page.confirm, "keyup", 0),
                (page.confirm, "change", 0),
                (page.password, "keyup", 1),
                (page.password, "change", 1),
                (page.password, "keyup", 0),
                (page.password, "change", 0),
            ]
        );
        assert_eq!(form.listening(&page.password, "keyup"), vec![1, 0]);
        assert_eq!(form.trigger(), "keyup");
    }

    #[test]
    fn test_form_event_override() {
        let mut page = page(Some("input"));
        let form = bind(&mut page).unwrap();
        assert_eq!(form.trigger(), "input");
        assert_eq!(form.listening(&page.confirm, "input"), vec![0]);
        assert!(form.listening(&page.confirm, "keyup").is_empty());
    }

    #[test]
    fn test_change_trigger_is_not_doubled() {
        let mut page = page(Some("change"));
        let form = bind(&mut page).unwrap();
        assert_eq!(form.listening(&page.confirm, "change"), vec![0]);
        assert_eq!(form.listeners().len(), 3);
    }

    #[test]
    fn test_initial_hint_visibility() {
        let mut page = page(None);
        bind(&mut page).unwrap();
        assert!(page.doc.is_visible(page.required_hint));
        assert!(!page.doc.is_visible(page.refers_hint));
        assert!(!page.doc.is_visible(page.success_hint));
    }

    #[test]
    fn test_fields_start_unknown() {
        let mut page = page(None);
        let form = bind(&mut page).unwrap();
        assert!(form.fields().iter().all(|f| f.validity() == Validity::Unknown));
        assert!(!form.is_valid());
        assert_eq!(form.field_index(&page.password), Some(1));
    }

    #[test]
    fn test_rule_error_leaves_page_untouched() {
        let mut page = page(None);
        page.doc.append(page.form, Element::new("input").class("SForm-field").data("min", "x"));

        assert!(matches!(bind(&mut page), Err(BindError::InvalidLength { .. })));
        // hints were not prepared
        assert!(page.doc.is_visible(page.refers_hint));
    }

    #[test]
    fn test_copy_hint_from_template() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new("form").class("SForm"));

        let first = doc.append(form, Element::new("div"));
        doc.append(first, Element::new("input").id("email").class("SForm-field").data("type", "email"));
        let first_hint = doc.append(first, Element::new("span").class("SForm-type"));
        doc.append(first_hint, Element::new("em"));

        let second = doc.append(form, Element::new("div"));
        doc.append(second, Element::new("input").id("email2").class("SForm-field").data("type", "email"));
        let stub = doc.append(second, Element::new("span").class("SForm-type").data("copy", "email"));

        let config = Config::default();
        let predicates = PredicateRegistry::new();
        FormBinder::new(&config, &predicates).bind(&mut doc, &form).unwrap();

        assert!(!doc.is_attached(stub));
        let copies = doc.elements_by_class(Some(&second), "SForm-type");
        assert_eq!(copies.len(), 1);
        assert_ne!(copies[0], stub);
        assert_eq!(doc.children(copies[0]).len(), 1);
        assert!(!doc.is_visible(copies[0]));
    }

    #[test]
    fn test_copy_error_leaves_page_untouched() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new("form").class("SForm"));

        let first = doc.append(form, Element::new("div"));
        doc.append(first, Element::new("input").id("a").class("SForm-field").data("min", "2"));
        doc.append(first, Element::new("span").class("SForm-min"));
        let required = doc.append(first, Element::new("span").class("SForm-required"));

        let second = doc.append(form, Element::new("div"));
        doc.append(second, Element::new("input").id("b").class("SForm-field").data("min", "2"));
        // min is set up before success, so this stub would be cloned first
        let min_stub = doc.append(second, Element::new("span").class("SForm-min").data("copy", "a"));
        let success_stub = doc.append(second, Element::new("span").class("SForm-success").data("copy", "ghost"));

        let config = Config::default();
        let predicates = PredicateRegistry::new();
        let err = FormBinder::new(&config, &predicates).bind(&mut doc, &form).unwrap_err();

        assert!(matches!(err, BindError::MissingCopyTemplate { kind: HintKind::Success, .. }));
        assert!(doc.is_attached(min_stub));
        assert!(doc.is_attached(success_stub));
        assert_eq!(&doc.children(second)[1..], &[min_stub, success_stub]);
        for hint in [required, min_stub, success_stub] {
            assert_eq!(doc.element(hint).visible, None);
        }
    }

    #[test]
    fn test_copy_without_template_fails() {
        let mut doc = Document::new();
        let form = doc.append(doc.root(), Element::new("form").class("SForm"));
        doc.append(form, Element::new("span").class("SForm-success").data("copy", "ghost"));

        let config = Config::default();
        let predicates = PredicateRegistry::new();
        let err = FormBinder::new(&config, &predicates).bind(&mut doc, &form).unwrap_err();
        assert_eq!(
            err,
            BindError::MissingCopyTemplate {
                kind: HintKind::Success,
                template: "ghost".to_string()
            }
        );
    }
}
