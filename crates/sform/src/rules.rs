// File: src/rules.rs
// Purpose: Rule kinds, their predicates, and compilation of markup parameters

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::attributes::ValidationConfig;
use crate::dom::Dom;
use crate::error::BindError;
use crate::predicates::{Predicate, PredicateRegistry};

// `\w` and `\d` are spelled out so non-ASCII letters and digits never match
static INT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([1-9][0-9]*|0)$").unwrap()
});

static FLOAT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)(\.[0-9]+)?$").unwrap()
});

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+@[A-Za-z0-9_]+\.[A-Za-z0-9_]+$").unwrap()
});

/// The closed set of validation kinds.
///
/// Declaration order is evaluation order: `Ord` follows it, so any ordered
/// collection keyed by kind iterates required first and custom last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    Required,
    Type,
    Min,
    Max,
    Refers,
    Custom,
}

impl RuleKind {
    /// Every kind, in evaluation order
    pub const ALL: [RuleKind; 6] = [
        RuleKind::Required,
        RuleKind::Type,
        RuleKind::Min,
        RuleKind::Max,
        RuleKind::Refers,
        RuleKind::Custom,
    ];

    /// Attribute key and hint suffix
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Type => "type",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::Refers => "refers",
            RuleKind::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a hint element reports: a failed rule, or success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintKind {
    Rule(RuleKind),
    Success,
}

impl HintKind {
    /// Order in which hints are prepared when a form is bound
    pub const ALL: [HintKind; 7] = [
        HintKind::Rule(RuleKind::Min),
        HintKind::Rule(RuleKind::Max),
        HintKind::Rule(RuleKind::Required),
        HintKind::Success,
        HintKind::Rule(RuleKind::Type),
        HintKind::Rule(RuleKind::Refers),
        HintKind::Rule(RuleKind::Custom),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HintKind::Rule(kind) => kind.as_str(),
            HintKind::Success => "success",
        }
    }
}

impl fmt::Display for HintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RuleKind> for HintKind {
    fn from(kind: RuleKind) -> Self {
        HintKind::Rule(kind)
    }
}

/// Value shapes accepted by `data-type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePattern {
    /// Digits without a leading zero, or `0`
    Int,
    /// An int, optionally followed by `.` and one or more digits
    Float,
    /// `word@word.word`
    Email,
}

impl TypePattern {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(TypePattern::Int),
            "float" => Some(TypePattern::Float),
            "email" => Some(TypePattern::Email),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypePattern::Int => "int",
            TypePattern::Float => "float",
            TypePattern::Email => "email",
        }
    }

    pub fn matches(self, value: &str) -> bool {
        match self {
            TypePattern::Int => INT_REGEX.is_match(value),
            TypePattern::Float => FLOAT_REGEX.is_match(value),
            TypePattern::Email => EMAIL_REGEX.is_match(value),
        }
    }
}

/// Length as the user sees it: characters, not bytes
pub fn value_length(value: &str) -> usize {
    value.chars().count()
}

/// A configured rule with its parameter resolved against the document
#[derive(Debug, Clone)]
pub enum Rule<N> {
    Required,
    Type(TypePattern),
    Min(usize),
    Max(usize),
    Refers { target: N },
    Custom { name: String, predicate: Predicate },
}

impl<N> Rule<N> {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Required => RuleKind::Required,
            Rule::Type(_) => RuleKind::Type,
            Rule::Min(_) => RuleKind::Min,
            Rule::Max(_) => RuleKind::Max,
            Rule::Refers { .. } => RuleKind::Refers,
            Rule::Custom { .. } => RuleKind::Custom,
        }
    }

    /// Runs the rule's predicate against `value`
    pub fn check<D: Dom<Node = N>>(&self, dom: &D, value: &str) -> bool {
        match self {
            Rule::Required => !value.is_empty(),
            Rule::Type(pattern) => pattern.matches(value),
            Rule::Min(min) => value_length(value) >= *min,
            Rule::Max(max) => value_length(value) <= *max,
            Rule::Refers { target } => dom.value(target) == value,
            Rule::Custom { predicate, .. } => predicate.call(value),
        }
    }
}

/// The compiled rules of one field, kept in evaluation order
#[derive(Debug, Clone)]
pub struct FieldRules<N> {
    rules: Vec<Rule<N>>,
}

impl<N> Default for FieldRules<N> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<N: Clone> FieldRules<N> {
    /// Resolves every configured parameter.
    ///
    /// `field` is only used to name the field in errors.
    pub fn compile<D: Dom<Node = N>>(
        dom: &D,
        field: &N,
        config: &ValidationConfig,
        predicates: &PredicateRegistry,
    ) -> Result<Self, BindError> {
        let label = || dom.describe(field);
        let mut rules = Vec::with_capacity(config.len());

        for (kind, param) in config.iter() {
            let param = param.trim();
            let rule = match kind {
                RuleKind::Required => Rule::Required,
                RuleKind::Type => TypePattern::from_name(param)
                    .map(Rule::Type)
                    .ok_or_else(|| BindError::UnknownType {
                        field: label(),
                        name: param.to_string(),
                    })?,
                RuleKind::Min => Rule::Min(parse_length(param, kind, &label)?),
                RuleKind::Max => Rule::Max(parse_length(param, kind, &label)?),
                RuleKind::Refers => {
                    let target = dom.element_by_id(param).ok_or_else(|| {
                        BindError::MissingReferTarget {
                            field: label(),
                            target: param.to_string(),
                        }
                    })?;
                    Rule::Refers { target }
                }
                RuleKind::Custom => {
                    let predicate = predicates.get(param).cloned().ok_or_else(|| {
                        BindError::UnresolvedPredicate {
                            field: label(),
                            name: param.to_string(),
                        }
                    })?;
                    Rule::Custom {
                        name: param.to_string(),
                        predicate,
                    }
                }
            };
            rules.push(rule);
        }

        Ok(Self { rules })
    }
}

impl<N> FieldRules<N> {
    pub fn iter(&self) -> impl Iterator<Item = &Rule<N>> {
        self.rules.iter()
    }

    pub fn kinds(&self) -> impl Iterator<Item = RuleKind> + '_ {
        self.rules.iter().map(Rule::kind)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The field this one must equal, if it declares `data-refers`
    pub fn refers_target(&self) -> Option<&N> {
        self.rules.iter().find_map(|rule| match rule {
            Rule::Refers { target } => Some(target),
            _ => None,
        })
    }
}

fn parse_length(param: &str, kind: RuleKind, label: &impl Fn() -> String) -> Result<usize, BindError> {
    param.parse().map_err(|_| BindError::InvalidLength {
        field: label(),
        kind,
        value: param.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Element, NodeId};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("0", true)]
    #[case("5", true)]
    #[case("123", true)]
    #[case("100", true)]
    #[case("007", false)]
    #[case("-1", false)]
    #[case("1.5", false)]
    #[case("", false)]
    #[case(" 1", false)]
    #[case("١٢", false)]
    fn test_int_pattern(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(TypePattern::Int.matches(value), expected);
    }

    #[rstest]
    #[case("0", true)]
    #[case("0.5", true)]
    #[case("12.34", true)]
    #[case("7", true)]
    #[case("007", false)]
    #[case(".5", false)]
    #[case("1.", false)]
    #[case("abc", false)]
    #[case("", false)]
    fn test_float_pattern(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(TypePattern::Float.matches(value), expected);
    }

    #[rstest]
    #[case("a@b.c", true)]
    #[case("first_last@example.com", true)]
    #[case("a@b", false)]
    #[case("@b.c", false)]
    #[case("a.b.c", false)]
    #[case("a.b@c.d", false)]
    #[case("a@b.c.d", false)]
    #[case("é@b.c", false)]
    fn test_email_pattern(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(TypePattern::Email.matches(value), expected);
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in RuleKind::ALL {
            assert_eq!(RuleKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(RuleKind::from_name("success"), None);
        assert_eq!(TypePattern::from_name("decimal"), None);
    }

    #[test]
    fn test_kind_order_is_table_order() {
        let mut kinds = vec![RuleKind::Custom, RuleKind::Type, RuleKind::Required, RuleKind::Max];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![RuleKind::Required, RuleKind::Type, RuleKind::Max, RuleKind::Custom]
        );
    }

    #[test]
    fn test_length_counts_characters() {
        assert_eq!(value_length("abc"), 3);
        assert_eq!(value_length("äöü"), 3);
    }

    fn doc_with(field: Element) -> (Document, NodeId) {
        let mut doc = Document::new();
        doc.append(doc.root(), Element::new("input").id("other").value("secret"));
        let node = doc.append(doc.root(), field);
        (doc, node)
    }

    fn compile(doc: &Document, node: NodeId, predicates: &PredicateRegistry) -> Result<FieldRules<NodeId>, BindError> {
        let config = crate::attributes::read_config(doc, &node);
        FieldRules::compile(doc, &node, &config, predicates)
    }

    #[test]
    fn test_compile_keeps_table_order() {
        let (doc, node) = doc_with(
            Element::new("input")
                .id("f")
                .data("custom", "ok")
                .data("max", "9")
                .data("refers", "other")
                .flag("required"),
        );
        let predicates = PredicateRegistry::new().with("ok", |_| true);
        let rules = compile(&doc, node, &predicates).unwrap();
        assert_eq!(
            rules.kinds().collect::<Vec<_>>(),
            vec![RuleKind::Required, RuleKind::Max, RuleKind::Refers, RuleKind::Custom]
        );
        assert_eq!(rules.refers_target(), doc.element_by_id("other").as_ref());
    }

    #[test]
    fn test_compile_trims_parameters() {
        let (doc, node) = doc_with(Element::new("input").data("type", " email ").data("min", " 2"));
        let rules = compile(&doc, node, &PredicateRegistry::new()).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(matches!(rules.iter().next(), Some(Rule::Type(TypePattern::Email))));
    }

    #[test]
    fn test_compile_errors() {
        let predicates = PredicateRegistry::new();

        let (doc, node) = doc_with(Element::new("input").id("f").data("type", "decimal"));
        assert_eq!(
            compile(&doc, node, &predicates).unwrap_err(),
            BindError::UnknownType {
                field: "#f".to_string(),
                name: "decimal".to_string()
            }
        );

        let (doc, node) = doc_with(Element::new("input").id("f").data("max", "-1"));
        assert!(matches!(
            compile(&doc, node, &predicates),
            Err(BindError::InvalidLength { kind: RuleKind::Max, .. })
        ));

        let (doc, node) = doc_with(Element::new("input").id("f").data("refers", "nope"));
        assert!(matches!(
            compile(&doc, node, &predicates),
            Err(BindError::MissingReferTarget { .. })
        ));

        let (doc, node) = doc_with(Element::new("input").id("f").data("custom", "isPrime"));
        assert_eq!(
            compile(&doc, node, &predicates).unwrap_err(),
            BindError::UnresolvedPredicate {
                field: "#f".to_string(),
                name: "isPrime".to_string()
            }
        );
    }

    #[test]
    fn test_rule_checks() {
        let (mut doc, _) = doc_with(Element::new("input"));
        let other = doc.element_by_id("other").unwrap();

        assert!(!Rule::<NodeId>::Required.check(&doc, ""));
        assert!(Rule::<NodeId>::Required.check(&doc, " "));
        assert!(!Rule::<NodeId>::Min(3).check(&doc, "ab"));
        assert!(Rule::<NodeId>::Min(3).check(&doc, "abc"));
        assert!(!Rule::<NodeId>::Max(3).check(&doc, "abcd"));
        assert!(Rule::<NodeId>::Max(3).check(&doc, "abc"));

        let refers = Rule::Refers { target: other };
        assert!(refers.check(&doc, "secret"));
        assert!(!refers.check(&doc, "secret "));
        doc.set_value(other, "changed");
        assert!(refers.check(&doc, "changed"));

        let custom: Rule<NodeId> = Rule::Custom {
            name: "short".to_string(),
            predicate: Predicate::new(|v| v.len() < 2),
        };
        assert!(custom.check(&doc, "a"));
        assert!(!custom.check(&doc, "ab"));
    }
}
