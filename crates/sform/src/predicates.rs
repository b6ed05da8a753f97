// File: src/predicates.rs
// Purpose: Host-supplied named predicates for `data-custom` rules

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A named check supplied by the embedding page
#[derive(Clone)]
pub struct Predicate(Rc<dyn Fn(&str) -> bool>);

impl Predicate {
    pub fn new(check: impl Fn(&str) -> bool + 'static) -> Self {
        Self(Rc::new(check))
    }

    pub fn call(&self, value: &str) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Predicates available to `data-custom`, keyed by name.
///
/// Handed to the binder when forms are bound; a field naming a predicate
/// that is not registered here fails to bind.
///
/// # Example
///
/// ```
/// use sform::PredicateRegistry;
///
/// let predicates = PredicateRegistry::new()
///     .with("isEven", |v| v.parse::<u32>().map(|n| n % 2 == 0).unwrap_or(false));
/// assert!(predicates.get("isEven").unwrap().call("4"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PredicateRegistry {
    predicates: HashMap<String, Predicate>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `check` under `name`, replacing any previous entry
    pub fn register(&mut self, name: impl Into<String>, check: impl Fn(&str) -> bool + 'static) {
        self.insert(name, Predicate::new(check));
    }

    pub fn insert(&mut self, name: impl Into<String>, predicate: Predicate) {
        self.predicates.insert(name.into(), predicate);
    }

    pub fn with(mut self, name: impl Into<String>, check: impl Fn(&str) -> bool + 'static) -> Self {
        self.register(name, check);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = PredicateRegistry::new();
        assert!(registry.is_empty());

        registry.register("startsWithA", |v| v.starts_with('a'));
        assert!(registry.contains("startsWithA"));
        assert_eq!(registry.len(), 1);

        let predicate = registry.get("startsWithA").unwrap();
        assert!(predicate.call("apple"));
        assert!(!predicate.call("banana"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_later_registration_wins() {
        let registry = PredicateRegistry::new()
            .with("check", |_| false)
            .with("check", |_| true);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("check").unwrap().call(""));
    }
}
