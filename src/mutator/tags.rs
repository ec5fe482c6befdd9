use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use super::ids::{has_tag_link_id, owner_node_id, tag_node_id};
use crate::graph::{relation, Graph, Link, Node, NodeType};

/// The node a tag set attaches to. A coordinate owner may not have a backing
/// node yet; one is synthesized the first time tags are set on it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TagOwner {
    pub id: String,
    pub kind: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl TagOwner {
    pub fn node(id: impl Into<String>, kind: NodeType) -> Self {
        Self {
            id: id.into(),
            kind,
            sheet: None,
            address: None,
        }
    }

    pub fn coordinate(kind: NodeType, sheet: impl Into<String>, address: impl Into<String>) -> Self {
        let sheet = sheet.into();
        let address = address.into();
        Self {
            id: owner_node_id(kind, &sheet, &address),
            kind,
            sheet: Some(sheet),
            address: Some(address),
        }
    }

    fn synthesize(&self) -> Node {
        let label = self.address.clone().unwrap_or_else(|| self.id.clone());
        Node {
            address: self.address.clone(),
            ..Node::new(self.id.clone(), self.kind, label)
        }
    }
}

/// Reconcile the owner's HAS_TAG links to exactly `labels`.
///
/// Blank labels are ignored and labels that normalize to the same tag id
/// collapse to the first spelling. Tag nodes left without links are kept.
pub fn set_tags(graph: &Graph, owner: &TagOwner, labels: &[String]) -> Graph {
    let desired = desired_tags(labels);
    let desired_ids: HashSet<&str> = desired.iter().map(|(id, _)| id.as_str()).collect();

    let mut next = graph.clone();

    if !next.contains_node(&owner.id) {
        debug!("Synthesizing tag owner node {}", owner.id);
        next.nodes.push(owner.synthesize());
    }

    let linked: HashSet<String> = next
        .links
        .iter()
        .filter(|l| l.is_tag_link() && l.source == owner.id)
        .map(|l| l.target.clone())
        .collect();

    let before = next.links.len();
    next.links.retain(|l| {
        !(l.is_tag_link() && l.source == owner.id && !desired_ids.contains(l.target.as_str()))
    });
    let removed = before - next.links.len();

    let mut added = 0;
    for (tag_id, label) in &desired {
        if !next.contains_node(tag_id) {
            next.nodes
                .push(Node::new(tag_id.clone(), NodeType::Tag, label.clone()));
        }
        let link_id = has_tag_link_id(&owner.id, tag_id);
        if !linked.contains(tag_id) && next.link(&link_id).is_none() {
            next.links.push(Link::new(
                link_id,
                owner.id.clone(),
                tag_id.clone(),
                relation::HAS_TAG,
            ));
            added += 1;
        }
    }

    if let Some(node) = next.nodes.iter_mut().find(|n| n.id == owner.id) {
        node.tags = Some(desired.into_iter().map(|(_, label)| label).collect());
    }

    debug!(
        "Set tags on {}: {} added, {} removed",
        owner.id, added, removed
    );
    next
}

fn desired_tags(labels: &[String]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .filter_map(|l| {
            let id = tag_node_id(l);
            seen.insert(id.clone()).then(|| (id, l.to_string()))
        })
        .collect()
}
