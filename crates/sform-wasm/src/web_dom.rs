//! `Dom` over the browser's live document

use sform::Dom;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlCollection, HtmlElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement,
};

/// The page's document as seen by the engine
pub struct WebDom {
    document: Document,
    /// `display` value written when a hint is shown
    display: String,
}

impl WebDom {
    pub fn new(document: Document, display: impl Into<String>) -> Self {
        Self {
            document,
            display: display.into(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn collect(collection: HtmlCollection) -> Vec<Element> {
    (0..collection.length())
        .filter_map(|i| collection.item(i))
        .collect()
}

impl Dom for WebDom {
    type Node = Element;

    fn id(&self, node: &Element) -> Option<String> {
        let id = node.id();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn elements_by_class(&self, scope: Option<&Element>, class: &str) -> Vec<Element> {
        match scope {
            Some(element) => collect(element.get_elements_by_class_name(class)),
            None => collect(self.document.get_elements_by_class_name(class)),
        }
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn data(&self, node: &Element, key: &str) -> Option<String> {
        node.get_attribute(&format!("data-{}", key))
    }

    fn value(&self, node: &Element) -> String {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        if let Err(err) = node.class_list().add_1(class) {
            web_sys::console::warn_1(&err);
        }
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        if let Err(err) = node.class_list().remove_1(class) {
            web_sys::console::warn_1(&err);
        }
    }

    fn set_visible(&mut self, node: &Element, visible: bool) {
        // Only HTML elements carry an inline style
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            let display = if visible { self.display.as_str() } else { "none" };
            if let Err(err) = element.style().set_property("display", display) {
                web_sys::console::warn_1(&err);
            }
        }
    }

    fn replace_with_clone(&mut self, node: &Element, template: &Element) -> Option<Element> {
        let parent = node.parent_node()?;
        let copy = template
            .clone_node_with_deep(true)
            .ok()?
            .dyn_into::<Element>()
            .ok()?;
        parent.remove_child(node).ok()?;
        parent.append_child(&copy).ok()?;
        Some(copy)
    }
}
