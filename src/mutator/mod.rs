//! Pure graph reducers. Each operation takes the current graph by reference
//! and returns a new graph; the input is never modified.

pub mod ids;
mod tags;

pub use tags::{set_tags, TagOwner};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{GraphError, GraphResult};
use crate::graph::{relation, Graph, Link, Node, NodeType};

/// A node or link record supplied by a property editor.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "item", rename_all = "snake_case")]
pub enum EditableItem {
    Node(Node),
    Link(Link),
}

/// Edit intents accepted by [`apply_edit`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GraphEdit {
    RenameNode {
        node_id: String,
        label: String,
    },
    CreateLink {
        source: String,
        target: String,
        #[serde(default)]
        label: Option<String>,
    },
    /// Same as `CreateLink` but rejects endpoints that do not exist.
    CreateLinkStrict {
        source: String,
        target: String,
        #[serde(default)]
        label: Option<String>,
    },
    SetEditableItem {
        item: EditableItem,
    },
    SetTags {
        owner: TagOwner,
        tags: Vec<String>,
    },
    AddNode {
        node: Node,
    },
    RemoveNode {
        node_id: String,
    },
    RemoveLink {
        link_id: String,
    },
}

pub fn apply_edit(graph: &Graph, edit: &GraphEdit) -> GraphResult<Graph> {
    match edit {
        GraphEdit::RenameNode { node_id, label } => Ok(rename_node(graph, node_id, label)),
        GraphEdit::CreateLink {
            source,
            target,
            label,
        } => Ok(create_link(graph, source, target, label.as_deref())),
        GraphEdit::CreateLinkStrict {
            source,
            target,
            label,
        } => create_link_strict(graph, source, target, label.as_deref()),
        GraphEdit::SetEditableItem { item } => Ok(set_editable_item(graph, item)),
        GraphEdit::SetTags { owner, tags } => Ok(set_tags(graph, owner, tags)),
        GraphEdit::AddNode { node } => add_node(graph, node),
        GraphEdit::RemoveNode { node_id } => Ok(remove_node(graph, node_id)),
        GraphEdit::RemoveLink { link_id } => Ok(remove_link(graph, link_id)),
    }
}

/// Replace a node's label. A missing node is a stale reference, not an
/// error, and yields an unchanged graph.
pub fn rename_node(graph: &Graph, node_id: &str, label: &str) -> Graph {
    let mut next = graph.clone();
    match next.nodes.iter_mut().find(|n| n.id == node_id) {
        Some(node) => node.label = label.to_string(),
        None => debug!("Rename skipped, node {} not found", node_id),
    }
    next
}

/// Append a link with a fresh id. Endpoints are not checked; see
/// [`create_link_strict`].
pub fn create_link(graph: &Graph, source: &str, target: &str, label: Option<&str>) -> Graph {
    for endpoint in [source, target] {
        if !graph.contains_node(endpoint) {
            warn!("Creating link to missing node {}", endpoint);
        }
    }

    let mut next = graph.clone();
    next.links.push(Link::new(
        ids::new_link_id(),
        source,
        target,
        label.unwrap_or(relation::RELATED_TO),
    ));
    next
}

pub fn create_link_strict(
    graph: &Graph,
    source: &str,
    target: &str,
    label: Option<&str>,
) -> GraphResult<Graph> {
    for (role, endpoint) in [("source", source), ("target", target)] {
        if !graph.contains_node(endpoint) {
            return Err(GraphError::InvalidLink {
                source_id: source.to_string(),
                target_id: target.to_string(),
                reason: format!("{} node '{}' not found", role, endpoint),
            });
        }
    }
    Ok(create_link(graph, source, target, label))
}

/// Find-and-replace a node or link by id. A node's `tags` are kept from the
/// existing record since only `set_tags` maintains them.
pub fn set_editable_item(graph: &Graph, item: &EditableItem) -> Graph {
    let mut next = graph.clone();
    match item {
        EditableItem::Node(node) => {
            if let Some(existing) = next.nodes.iter_mut().find(|n| n.id == node.id) {
                let tags = existing.tags.take();
                *existing = Node {
                    tags,
                    ..node.clone()
                };
            } else {
                debug!("Edit skipped, node {} not found", node.id);
            }
        }
        EditableItem::Link(link) => {
            if let Some(existing) = next.links.iter_mut().find(|l| l.id == link.id) {
                *existing = link.clone();
            } else {
                debug!("Edit skipped, link {} not found", link.id);
            }
        }
    }
    next
}

pub fn add_node(graph: &Graph, node: &Node) -> GraphResult<Graph> {
    if graph.contains_node(&node.id) {
        return Err(GraphError::NodeAlreadyExists(node.id.clone()));
    }
    let mut next = graph.clone();
    next.nodes.push(node.clone());
    Ok(next)
}

/// Remove a node together with every link touching it. Removing a tag node
/// first detaches it from its owners through [`set_tags`] so their cached
/// tag lists stay in sync.
pub fn remove_node(graph: &Graph, node_id: &str) -> Graph {
    let mut next = match graph.node(node_id) {
        Some(node) if node.kind == NodeType::Tag => detach_tag(graph, node_id),
        _ => graph.clone(),
    };
    next.nodes.retain(|n| n.id != node_id);
    next.links
        .retain(|l| l.source != node_id && l.target != node_id);
    next
}

fn detach_tag(graph: &Graph, tag_id: &str) -> Graph {
    let owners: Vec<TagOwner> = graph
        .links
        .iter()
        .filter(|l| l.is_tag_link() && l.target == tag_id)
        .filter_map(|l| graph.node(&l.source))
        .map(|n| TagOwner::node(n.id.clone(), n.kind))
        .collect();

    owners.iter().fold(graph.clone(), |acc, owner| {
        let remaining: Vec<String> = acc
            .tags_of(&owner.id)
            .into_iter()
            .filter(|label| ids::tag_node_id(label) != tag_id)
            .map(str::to_string)
            .collect();
        set_tags(&acc, owner, &remaining)
    })
}

pub fn remove_link(graph: &Graph, link_id: &str) -> Graph {
    let mut next = graph.clone();
    next.links.retain(|l| l.id != link_id);
    next
}
