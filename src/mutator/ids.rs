//! Deterministic id derivation for synthetic nodes and links.
//!
//! Every call site that needs a tag id or a tag-owner id goes through these
//! functions; deriving them inline elsewhere produces shadow duplicates of
//! the same logical cell or tag.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::graph::NodeType;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s:!/\\|]+").expect("separator pattern is valid"));

/// Lowercase, trim, and collapse whitespace and separator runs into `_`.
pub fn normalize_key(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    SEPARATORS
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

pub fn tag_node_id(label: &str) -> String {
    format!("tag_{}", normalize_key(label))
}

/// Id of the node that owns tags for a sheet coordinate.
pub fn owner_node_id(kind: NodeType, sheet: &str, address: &str) -> String {
    format!(
        "{}_{}_{}",
        kind.as_str(),
        normalize_key(sheet),
        normalize_key(address)
    )
}

pub fn has_tag_link_id(owner_id: &str, tag_id: &str) -> String {
    format!("has_tag_{}_{}", owner_id, tag_id)
}

pub fn new_link_id() -> String {
    format!("link_{}", Uuid::new_v4())
}
