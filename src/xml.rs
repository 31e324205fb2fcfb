//! XML node accessors shared by the GPX and KML readers.
//!
//! Tags are matched by local name so namespaced documents
//! (`<gpx xmlns="http://www.topografix.com/GPX/1/1">`) need no prefix
//! handling. Missing data yields `None` (or NaN for numbers), never an error.

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{Result, TrackMapError};

/// Parse a document, naming it in the error when it is not well-formed.
///
/// Exported GPX and KML files often carry a `<!DOCTYPE>`, so DTDs are accepted.
pub fn parse_document<'input>(source: &str, text: &'input str) -> Result<Document<'input>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options).map_err(|e| TrackMapError::parse(source, e))
}

fn is_tag(node: &Node, tag: &str) -> bool {
    node.is_element() && node.tag_name().name() == tag
}

/// First direct child element named `tag`.
pub fn first_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_tag(n, tag))
}

/// First element named `tag` anywhere below `node`.
pub fn first_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants().skip(1).find(|n| is_tag(n, tag))
}

/// All direct child elements named `tag`.
pub fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| is_tag(n, tag))
}

/// Text content with runs of whitespace merged into single spaces.
pub fn node_text(node: Node) -> Option<String> {
    let text = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<Vec<_>>()
        .join(" ");

    let merged = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if merged.is_empty() {
        None
    } else {
        Some(merged)
    }
}

/// Text of the first direct child named `tag`.
pub fn child_text(node: Node, tag: &str) -> Option<String> {
    first_child(node, tag).and_then(node_text)
}

/// Attribute parsed as a float; NaN when absent or not a number.
pub fn number_attribute(node: Node, name: &str) -> f64 {
    node.attribute(name)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}
