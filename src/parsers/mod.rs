//! Extractors for the documents Last.fm serves: web service XML,
//! plain-text charts and the scraped user page.

pub mod legacy;
pub mod profile;
pub mod recent_tracks;
pub mod tasteometer;

pub use recent_tracks::TrackSource;

use crate::helpers::lastfm::LastfmError;
use roxmltree::{Document, Node};

/// Parse a web service XML response, turning `<lfm status="failed">` into an error
pub(crate) fn parse_xml(text: &str) -> Result<Document<'_>, LastfmError> {
    let doc = Document::parse(text).map_err(|e| LastfmError::Parse(format!("Invalid XML: {}", e)))?;

    let root = doc.root_element();
    if root.has_tag_name("lfm") && root.attribute("status") == Some("failed") {
        let message = first_text(root, "error").unwrap_or_else(|| "request failed".to_string());
        return match find(root, "error").and_then(|e| e.attribute("code")) {
            // 6: no such user, 3: invalid method
            Some("6") | Some("3") => Err(LastfmError::NotFound(message)),
            _ => Err(LastfmError::Parse(message)),
        };
    }
    Ok(doc)
}

/// First element named `name` below `node`, or `node` itself
pub(crate) fn find<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().find(|n| n.is_element() && n.has_tag_name(name))
}

/// First element named `name` below `node`, as a parse error when missing
pub(crate) fn require<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Result<Node<'a, 'input>, LastfmError> {
    find(node, name).ok_or_else(|| LastfmError::Parse(format!("Missing <{}> element", name)))
}

/// Trimmed text of the first element named `name`; empty text counts as missing
pub(crate) fn first_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    find(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
