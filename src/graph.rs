use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::errors::{GraphError, GraphResult};
use crate::table::CellValue;

/// Conventional relationship kinds carried in `Link::label`.
pub mod relation {
    pub const CONTAINS: &str = "CONTAINS";
    pub const REFERENCES: &str = "REFERENCES";
    pub const HAS_TAG: &str = "HAS_TAG";
    pub const RELATED_TO: &str = "RELATED_TO";
    pub const PERFORMS: &str = "PERFORMS";
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Container,
    Sheet,
    Table,
    Cell,
    Formula,
    Analysis,
    Tag,
    Row,
    Column,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Container => "container",
            NodeType::Sheet => "sheet",
            NodeType::Table => "table",
            NodeType::Cell => "cell",
            NodeType::Formula => "formula",
            NodeType::Analysis => "analysis",
            NodeType::Tag => "tag",
            NodeType::Row => "row",
            NodeType::Column => "column",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Denormalized copy of the HAS_TAG labels; written only by `SetTags`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            description: None,
            tags: None,
            formula: None,
            value: None,
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Link {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

impl Link {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: label.into(),
        }
    }

    pub fn is_tag_link(&self) -> bool {
        self.label == relation::HAS_TAG
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    /// Parse an externally produced payload. Both `nodes` and `links` must
    /// be present as arrays; integrity is checked separately.
    pub fn from_payload(payload: Value) -> GraphResult<Self> {
        let Some(object) = payload.as_object() else {
            return Err(GraphError::InvalidStructure(
                "payload is not an object".to_string(),
            ));
        };
        for key in ["nodes", "links"] {
            if !object.get(key).is_some_and(Value::is_array) {
                return Err(GraphError::InvalidStructure(format!(
                    "missing '{}' array",
                    key
                )));
            }
        }
        serde_json::from_value(payload).map_err(|e| GraphError::InvalidStructure(e.to_string()))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Labels of the tag nodes reachable from `owner_id` through HAS_TAG links,
    /// in link order.
    pub fn tags_of(&self, owner_id: &str) -> Vec<&str> {
        self.links
            .iter()
            .filter(|l| l.is_tag_link() && l.source == owner_id)
            .filter_map(|l| self.node(&l.target))
            .map(|n| n.label.as_str())
            .collect()
    }

    pub fn stats(&self) -> String {
        format!("Nodes: {}, Links: {}", self.nodes.len(), self.links.len())
    }

    /// Every violation of link resolution and id uniqueness, as messages.
    pub fn verify_integrity(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        for violation in self.violations() {
            errors.push(violation.to_string());
        }

        if errors.is_empty() {
            debug!("Graph integrity verified ({})", self.stats());
            Ok(())
        } else {
            warn!("Graph has {} integrity violations", errors.len());
            Err(errors)
        }
    }

    /// First integrity violation as a typed error.
    pub fn validate(&self) -> GraphResult<()> {
        match self.violations().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Drop duplicate nodes and links (first occurrence wins) and links whose
    /// endpoints do not resolve. Returns what was removed.
    pub fn repair(&mut self) -> Vec<String> {
        let mut repairs = Vec::new();

        let mut seen_nodes = HashSet::new();
        self.nodes.retain(|n| {
            let keep = seen_nodes.insert(n.id.clone());
            if !keep {
                repairs.push(format!("Removed duplicate node '{}'", n.id));
            }
            keep
        });

        let mut seen_links = HashSet::new();
        self.links.retain(|l| {
            let keep = seen_links.insert(l.id.clone());
            if !keep {
                repairs.push(format!("Removed duplicate link '{}'", l.id));
            }
            keep
        });

        self.links.retain(|l| {
            let keep = seen_nodes.contains(&l.source) && seen_nodes.contains(&l.target);
            if !keep {
                repairs.push(format!(
                    "Removed dangling link '{}' ({} -> {})",
                    l.id, l.source, l.target
                ));
            }
            keep
        });

        repairs
    }

    fn violations(&self) -> Vec<GraphError> {
        let mut errors = Vec::new();

        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                errors.push(GraphError::DuplicateNodeId(node.id.clone()));
            }
        }

        let mut link_ids = HashSet::new();
        for link in &self.links {
            if !link_ids.insert(link.id.as_str()) {
                errors.push(GraphError::DuplicateLinkId(link.id.clone()));
            }
            for endpoint in [&link.source, &link.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    errors.push(GraphError::DanglingLink {
                        link: link.id.clone(),
                        endpoint: endpoint.clone(),
                    });
                }
            }
        }

        errors
    }
}
