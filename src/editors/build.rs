//! Build configuration browser
//!
//! Each project has a tree of labelled nodes; leaves carry the build parts
//! shown in the parts table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::action::Action;
use crate::core::store::AppState;
use crate::editors::catalog::mount_project;

/// Column headings of the build parts table
pub const BUILD_COLUMNS: [&str; 7] = [
    "Part Id#",
    "Part Name*",
    "Qty*",
    "Order#",
    "Prod Status*",
    "HW View",
    "QC",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPart {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub production_status: String,
    #[serde(default)]
    pub hardware_view: String,
    #[serde(default)]
    pub qc: String,
}

impl BuildPart {
    /// Cells in [`BUILD_COLUMNS`] order
    pub fn cells(&self) -> [String; 7] {
        [
            self.id.clone(),
            self.name.clone(),
            self.quantity.to_string(),
            self.order.clone(),
            self.production_status.clone(),
            self.hardware_view.clone(),
            self.qc.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BuildNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<BuildPart>,
}

impl BuildNode {
    /// Depth-first search for `id` in this subtree
    pub fn find(&self, id: &str) -> Option<&BuildNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// First node carrying parts, depth-first
    pub fn first_with_parts(&self) -> Option<&BuildNode> {
        if !self.parts.is_empty() {
            return Some(self);
        }
        self.children.iter().find_map(BuildNode::first_with_parts)
    }

    /// Visit every node with its depth, parents first
    pub fn walk<'a>(&'a self, depth: usize, visit: &mut dyn FnMut(&'a BuildNode, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk(depth + 1, visit);
        }
    }
}

/// Find a node by id anywhere in a forest
pub fn find_node<'a>(nodes: &'a [BuildNode], id: &str) -> Option<&'a BuildNode> {
    nodes.iter().find_map(|node| node.find(id))
}

/// One project's build tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfiguration {
    pub project_name: String,
    #[serde(default)]
    pub tree: Vec<BuildNode>,
}

impl BuildConfiguration {
    /// Node opened when nothing is selected
    pub fn default_node(&self) -> Option<&BuildNode> {
        let root = self.tree.first()?;
        root.first_with_parts().or(Some(root))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildBrowser {
    #[serde(default)]
    configurations: BTreeMap<String, BuildConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    project: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    node: Option<String>,
}

impl BuildBrowser {
    pub fn new(configurations: BTreeMap<String, BuildConfiguration>) -> Self {
        Self {
            configurations,
            project: None,
            node: None,
        }
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn configuration(&self) -> Option<&BuildConfiguration> {
        self.project.as_deref().and_then(|id| self.configurations.get(id))
    }

    pub fn tree(&self) -> &[BuildNode] {
        self.configuration().map(|c| c.tree.as_slice()).unwrap_or(&[])
    }

    pub fn mount(&mut self, url_project: Option<&str>, state: &AppState) -> Vec<Action> {
        let (project, action) =
            mount_project(url_project, state, |id| self.configurations.contains_key(id));
        if project != self.project {
            self.project = project;
            self.node = None;
        }
        self.seed_node();
        action.into_iter().collect()
    }

    /// Switch project; the node goes back to the project's default
    pub fn select_project(&mut self, project_id: Option<String>) -> Option<Action> {
        self.project = project_id.clone();
        self.node = None;
        self.seed_node();
        project_id.map(Action::set_active_project)
    }

    /// Select a node by id; unknown ids are ignored
    pub fn select_node(&mut self, node_id: &str) -> bool {
        let exists = find_node(self.tree(), node_id).is_some();
        if exists {
            self.node = Some(node_id.to_string());
        } else {
            tracing::trace!(node = %node_id, "unknown build node, ignoring");
        }
        exists
    }

    /// The selected node, falling back to the first root
    pub fn current_node(&self) -> Option<&BuildNode> {
        let tree = self.tree();
        self.node
            .as_deref()
            .and_then(|id| find_node(tree, id))
            .or_else(|| tree.first())
    }

    fn seed_node(&mut self) {
        if self.node.is_none() {
            self.node = self
                .configuration()
                .and_then(BuildConfiguration::default_node)
                .map(|n| n.id.clone());
        }
    }
}
