//! Template definitions and instantiation.
//!
//! A template is a static starter map with template-local ids. Every
//! instantiation mints fresh ids for all nodes and edges, so the same
//! template can be loaded any number of times without id collisions.
//!
//! ## Algorithm
//!
//! 1. Mint one fresh node id per template node, recording `local -> fresh`
//! 2. Mint one fresh edge id per template edge, rewriting `source`/`target`
//!    through the mapping
//! 3. Edges whose endpoint is not a template node are skipped and logged

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::IdProvider;
use crate::types::{Edge, Node, NodeId, NodeType, Position, ProcessGraph};

/// Error type for template lookup and parsing.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template JSON could not be parsed.
    #[error("Template parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// No template with this name.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),
}

/// A node inside a template, keyed by a template-local id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNode {
    /// Template-local id. Never copied into an instantiated graph.
    pub id: String,
    /// Node kind.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Label.
    pub label: String,
    /// Position.
    pub position: Position,
    /// Optional color override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_color: Option<String>,
}

/// An edge inside a template, referencing template-local node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEdge {
    /// Template-local id.
    pub id: String,
    /// Template-local source node id.
    pub source: String,
    /// Template-local target node id.
    pub target: String,
    /// Optional branch label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A named starter map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Lookup name (e.g. `"document-review"`).
    pub name: String,
    /// Short human-readable description.
    #[serde(default)]
    pub description: String,
    /// Template nodes.
    pub nodes: Vec<TemplateNode>,
    /// Template edges.
    #[serde(default)]
    pub edges: Vec<TemplateEdge>,
}

impl Template {
    /// Parse a template from JSON.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Expand into a fresh graph. See [`instantiate`].
    pub fn instantiate<I: IdProvider + ?Sized>(&self, ids: &mut I) -> Instantiation {
        instantiate(self, ids)
    }
}

/// Result of instantiating a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Instantiation {
    /// The freshly minted graph.
    pub graph: ProcessGraph,
    /// Template-local ids of edges that referenced unknown nodes.
    pub skipped_edges: Vec<String>,
}

impl Instantiation {
    /// Whether every template edge made it into the graph.
    pub fn is_complete(&self) -> bool {
        self.skipped_edges.is_empty()
    }
}

/// Expand `template` into a graph with fresh ids.
///
/// Malformed edges are skipped rather than failing the whole template.
pub fn instantiate<I: IdProvider + ?Sized>(template: &Template, ids: &mut I) -> Instantiation {
    let mut mapping: HashMap<&str, NodeId> = HashMap::with_capacity(template.nodes.len());
    let mut nodes = Vec::with_capacity(template.nodes.len());

    for tn in &template.nodes {
        let fresh = ids.next_node_id();
        mapping.insert(tn.id.as_str(), fresh.clone());
        nodes.push(Node {
            id: fresh,
            node_type: tn.node_type,
            label: tn.label.clone(),
            position: tn.position,
            custom_color: tn.custom_color.clone(),
        });
    }

    let mut edges = Vec::with_capacity(template.edges.len());
    let mut skipped_edges = Vec::new();

    for te in &template.edges {
        match (mapping.get(te.source.as_str()), mapping.get(te.target.as_str())) {
            (Some(source), Some(target)) => {
                let mut edge = Edge::new(ids.next_edge_id(), source.clone(), target.clone());
                edge.label = te.label.clone();
                edges.push(edge);
            }
            _ => {
                tracing::warn!(
                    template = %template.name,
                    edge = %te.id,
                    source = %te.source,
                    target = %te.target,
                    "Skipping template edge with unknown endpoint"
                );
                skipped_edges.push(te.id.clone());
            }
        }
    }

    Instantiation {
        graph: ProcessGraph::from_parts(nodes, edges),
        skipped_edges,
    }
}

/// Named collection of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
}

impl TemplateLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Library preloaded with the built-in accreditation starter maps.
    pub fn builtin() -> Self {
        Self {
            templates: vec![document_review(), corrective_action_plan(), incident_review()],
        }
    }

    /// Add a template, replacing any template with the same name.
    pub fn insert(&mut self, template: Template) {
        self.templates.retain(|t| t.name != template.name);
        self.templates.push(template);
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Result<&Template, TemplateError> {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))
    }

    /// Template names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.name.as_str())
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the library has no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn tnode(id: &str, node_type: NodeType, label: &str, x: f64, y: f64) -> TemplateNode {
    TemplateNode {
        id: id.to_string(),
        node_type,
        label: label.to_string(),
        position: Position::new(x, y),
        custom_color: None,
    }
}

fn tedge(id: &str, source: &str, target: &str, label: Option<&str>) -> TemplateEdge {
    TemplateEdge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        label: label.map(str::to_string),
    }
}

fn document_review() -> Template {
    Template {
        name: "document-review".to_string(),
        description: "Policy document drafted, reviewed and approved".to_string(),
        nodes: vec![
            tnode("1", NodeType::Start, "Draft policy", 250.0, 50.0),
            tnode("2", NodeType::Process, "Department review", 250.0, 200.0),
            tnode("3", NodeType::Decision, "Approved?", 250.0, 350.0),
            tnode("4", NodeType::Process, "Revise draft", 500.0, 350.0),
            tnode("5", NodeType::End, "Publish policy", 250.0, 500.0),
        ],
        edges: vec![
            tedge("e1", "1", "2", None),
            tedge("e2", "2", "3", None),
            tedge("e3", "3", "5", Some("Yes")),
            tedge("e4", "3", "4", Some("No")),
            tedge("e5", "4", "2", None),
        ],
    }
}

fn corrective_action_plan() -> Template {
    Template {
        name: "corrective-action-plan".to_string(),
        description: "Finding identified, root cause analysed, action verified".to_string(),
        nodes: vec![
            tnode("1", NodeType::Start, "Finding identified", 250.0, 50.0),
            tnode("2", NodeType::Process, "Root cause analysis", 250.0, 200.0),
            tnode("3", NodeType::Process, "Implement action", 250.0, 350.0),
            tnode("4", NodeType::Decision, "Effective?", 250.0, 500.0),
            tnode("5", NodeType::End, "Close finding", 250.0, 650.0),
        ],
        edges: vec![
            tedge("e1", "1", "2", None),
            tedge("e2", "2", "3", None),
            tedge("e3", "3", "4", None),
            tedge("e4", "4", "5", Some("Yes")),
            tedge("e5", "4", "2", Some("No")),
        ],
    }
}

fn incident_review() -> Template {
    Template {
        name: "incident-review".to_string(),
        description: "Patient safety incident reported and reviewed".to_string(),
        nodes: vec![
            tnode("1", NodeType::Start, "Incident reported", 250.0, 50.0),
            tnode("2", NodeType::Process, "Immediate safety actions", 250.0, 200.0),
            tnode("3", NodeType::Decision, "Serious harm?", 250.0, 350.0),
            tnode("4", NodeType::Process, "Formal investigation", 500.0, 500.0),
            tnode("5", NodeType::Process, "Local review", 0.0, 500.0),
            tnode("6", NodeType::End, "Share learning", 250.0, 650.0),
        ],
        edges: vec![
            tedge("e1", "1", "2", None),
            tedge("e2", "2", "3", None),
            tedge("e3", "3", "4", Some("Yes")),
            tedge("e4", "3", "5", Some("No")),
            tedge("e5", "4", "6", None),
            tedge("e6", "5", "6", None),
        ],
    }
}
