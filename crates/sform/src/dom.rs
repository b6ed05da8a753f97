// File: src/dom.rs
// Purpose: The document access the engine needs from its host

use std::fmt::Debug;

/// Access to the host document.
///
/// The engine never touches a page directly. Element lookup, class tokens,
/// visibility and data attributes all go through this trait, so the same
/// binder runs against the in-memory [`Document`](crate::Document) and
/// against a real browser DOM.
pub trait Dom {
    /// Handle to one element.
    type Node: Clone + PartialEq + Debug;

    /// The element's `id` attribute, if it has a non-empty one.
    fn id(&self, node: &Self::Node) -> Option<String>;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Elements carrying `class`, in document order.
    ///
    /// With a scope only its descendants are searched; the scope itself is
    /// never part of the result.
    fn elements_by_class(&self, scope: Option<&Self::Node>, class: &str) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Reads `data-<key>`. A bare attribute reads as an empty string.
    fn data(&self, node: &Self::Node, key: &str) -> Option<String>;

    /// Current value of a form control. Non-controls read as empty.
    fn value(&self, node: &Self::Node) -> String;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Adds a class token; a token already present is left alone.
    fn add_class(&mut self, node: &Self::Node, class: &str);

    fn remove_class(&mut self, node: &Self::Node, class: &str);

    fn set_visible(&mut self, node: &Self::Node, visible: bool);

    /// Detaches `node` from its parent and appends a deep copy of `template`
    /// to that parent. Returns the copy, or `None` when `node` is detached.
    fn replace_with_clone(&mut self, node: &Self::Node, template: &Self::Node) -> Option<Self::Node>;

    /// Label used in logs and error messages.
    fn describe(&self, node: &Self::Node) -> String {
        self.id(node)
            .map(|id| format!("#{}", id))
            .unwrap_or_else(|| format!("{:?}", node))
    }
}
