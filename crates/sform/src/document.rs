// File: src/document.rs
// Purpose: In-memory element tree implementing `Dom`

use crate::dom::Dom;

/// Index of an element inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Element description used to build a [`Document`]
///
/// # Example
///
/// ```
/// use sform::{Document, Element};
///
/// let mut doc = Document::new();
/// let form = doc.append(doc.root(), Element::new("form").class("SForm"));
/// let input = doc.append(
///     form,
///     Element::new("input").id("age").class("SForm-field").data("type", "int"),
/// );
/// doc.set_value(input, "42");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// `data-*` attributes in declaration order, without the prefix
    pub data: Vec<(String, String)>,
    pub value: String,
    /// Explicit display state; `None` means never touched
    pub visible: Option<bool>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds one or more whitespace separated class tokens
    pub fn class(mut self, classes: &str) -> Self {
        for token in classes.split_whitespace() {
            if !self.classes.iter().any(|c| c == token) {
                self.classes.push(token.to_string());
            }
        }
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.data.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.data.push((key, value)),
        }
        self
    }

    /// Bare `data-<key>` attribute, e.g. `data-required`
    pub fn flag(self, key: impl Into<String>) -> Self {
        self.data(key, "")
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// The `class` attribute as the browser would serialize it
    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    fn data_value(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct Slot {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A small DOM: enough structure for discovery, hint lookup and cloning.
///
/// Nodes are never freed; a removed element simply loses its parent link and
/// stops showing up in lookups.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                element: Element::new("#document"),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends `element` as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            element,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.slots[parent.0].children.push(id);
        id
    }

    pub fn element(&self, node: NodeId) -> &Element {
        &self.slots[node.0].element
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.slots[node.0].children
    }

    pub fn set_value(&mut self, node: NodeId, value: impl Into<String>) {
        self.slots[node.0].element.value = value.into();
    }

    /// Elements start out visible until something hides them
    pub fn is_visible(&self, node: NodeId) -> bool {
        self.slots[node.0].element.visible.unwrap_or(true)
    }

    /// Whether the node is still reachable from the root
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root() {
                return true;
            }
            match self.slots[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.slots[scope.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.slots[node.0].children.iter().rev().copied());
        }
        out
    }

    fn deep_copy(&mut self, source: NodeId, parent: NodeId) -> NodeId {
        let element = self.slots[source.0].element.clone();
        let copy = self.append(parent, element);
        let children = self.slots[source.0].children.clone();
        for child in children {
            self.deep_copy(child, copy);
        }
        copy
    }
}

impl Dom for Document {
    type Node = NodeId;

    fn id(&self, node: &NodeId) -> Option<String> {
        self.element(*node).id.clone().filter(|id| !id.is_empty())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|node| self.element(*node).id.as_deref() == Some(id))
    }

    fn elements_by_class(&self, scope: Option<&NodeId>, class: &str) -> Vec<NodeId> {
        let scope = scope.copied().unwrap_or_else(|| self.root());
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.has_class(node, class))
            .collect()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.slots[node.0].parent
    }

    fn data(&self, node: &NodeId, key: &str) -> Option<String> {
        self.element(*node).data_value(key).map(str::to_string)
    }

    fn value(&self, node: &NodeId) -> String {
        self.element(*node).value.clone()
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.element(*node).classes.iter().any(|c| c == class)
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.slots[node.0].element.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        self.slots[node.0].element.classes.retain(|c| c != class);
    }

    fn set_visible(&mut self, node: &NodeId, visible: bool) {
        self.slots[node.0].element.visible = Some(visible);
    }

    fn replace_with_clone(&mut self, node: &NodeId, template: &NodeId) -> Option<NodeId> {
        let parent = self.slots[node.0].parent?;
        self.slots[parent.0].children.retain(|child| child != node);
        self.slots[node.0].parent = None;
        Some(self.deep_copy(*template, parent))
    }
}
