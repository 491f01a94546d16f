//! DOM helpers shared by the listing extractors.

use scraper::{ElementRef, Node, Selector};

use crate::error::ExtractError;

/// Compile a CSS selector, mapping the parse error into an `ExtractError`.
pub fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Concatenated text of an element and all of its descendants.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// One direct child of an element, as seen by a positional walk.
#[derive(Debug, Clone, Copy)]
pub enum ChildNode<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
    Other,
}

impl<'a> ChildNode<'a> {
    /// Text content of the node. Elements yield their descendant text.
    pub fn text(&self) -> String {
        match self {
            ChildNode::Element(element) => element_text(*element),
            ChildNode::Text(text) => (*text).to_string(),
            ChildNode::Other => String::new(),
        }
    }

    pub fn as_element(&self) -> Option<ElementRef<'a>> {
        match self {
            ChildNode::Element(element) => Some(*element),
            _ => None,
        }
    }
}

/// Materialize the direct children of `element` in document order.
///
/// Text and comment nodes are kept, so indices line up with the raw markup.
pub fn child_nodes(element: ElementRef<'_>) -> Vec<ChildNode<'_>> {
    element
        .children()
        .map(|node| match node.value() {
            Node::Element(_) => ElementRef::wrap(node)
                .map(ChildNode::Element)
                .unwrap_or(ChildNode::Other),
            Node::Text(text) => ChildNode::Text(&**text),
            Node::Comment(comment) => ChildNode::Text(&**comment),
            _ => ChildNode::Other,
        })
        .collect()
}

/// Direct element children of `element` with the given tag name.
pub fn child_elements<'a>(element: ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == tag)
        .collect()
}

/// Nearest ancestor of `element` matching `selector`.
pub fn closest<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| selector.matches(ancestor))
}

/// First element under `scope` matching `selector` whose text contains `needle`.
pub fn find_with_text<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    needle: &str,
) -> Option<ElementRef<'a>> {
    scope
        .select(selector)
        .find(|element| element_text(*element).contains(needle))
}

/// First element under `scope` matching `selector` whose `attr` starts with `prefix`.
pub fn find_with_attr_prefix<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    attr: &str,
    prefix: &str,
) -> Option<ElementRef<'a>> {
    scope.select(selector).find(|element| {
        element
            .value()
            .attr(attr)
            .is_some_and(|value| value.starts_with(prefix))
    })
}
