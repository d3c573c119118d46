//! Resolved dependency graph and the cycle-safe boundary walk.
//!
//! Nodes live in an arena and are interned by `(alias, name, version)`, so a
//! package reached along several paths is one node. Workspace projects
//! linked to each other (`link:` versions) point back at their root node,
//! which is how cycles appear.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Deserialize;
use tracing::debug;

use guardrails_core::ToolError;

use crate::spec::BoundarySpec;

/// Index of a node in a [`DependencyGraph`].
pub type NodeId = usize;

/// One resolved package (or workspace project).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    /// Key the package was installed under.
    pub alias: String,
    /// Real package name (`from`); equals `alias` unless aliased.
    pub name: String,
    /// Resolved version (may be a `link:` path).
    pub version: String,
    /// Direct dependencies, sorted by label.
    pub children: Vec<NodeId>,
}

impl PackageNode {
    /// `alias@version`, or `alias (name)@version` for aliased packages.
    #[must_use]
    pub fn label(&self) -> String {
        let base = if self.alias == self.name {
            self.alias.clone()
        } else {
            format!("{} ({})", self.alias, self.name)
        };
        if self.version.is_empty() {
            base
        } else {
            format!("{base}@{}", self.version)
        }
    }
}

/// A forbidden package reached from a workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphViolation {
    /// Forbidden package name (the real name when that is the forbidden one).
    pub package: String,
    /// Labels from the workspace root down to the offending node.
    pub chain: Vec<String>,
}

impl GraphViolation {
    /// Label of the workspace root the chain starts at.
    #[must_use]
    pub fn root(&self) -> &str {
        self.chain.first().map_or("", String::as_str)
    }

    /// `root > dep > offender`.
    #[must_use]
    pub fn chain_text(&self) -> String {
        self.chain.join(" > ")
    }
}

/// Resolved dependency graph with workspace roots.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<PackageNode>,
    roots: Vec<NodeId>,
    index: HashMap<(String, String, String), NodeId>,
    root_names: HashMap<String, NodeId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    name: Option<String>,
    version: Option<String>,
    path: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, RawDependency>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, RawDependency>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, RawDependency>,
    #[serde(default)]
    unsaved_dependencies: BTreeMap<String, RawDependency>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDependency {
    from: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, RawDependency>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, RawDependency>,
}

impl RawProject {
    fn label(&self, position: usize) -> String {
        self.name
            .clone()
            .or_else(|| {
                self.path.as_deref().and_then(|p| {
                    std::path::Path::new(p)
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                })
            })
            .unwrap_or_else(|| format!("(workspace {position})"))
    }

    fn dependency_blocks(&self) -> [&BTreeMap<String, RawDependency>; 4] {
        [
            &self.dependencies,
            &self.dev_dependencies,
            &self.optional_dependencies,
            &self.unsaved_dependencies,
        ]
    }
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the output of `pnpm list --recursive --depth Infinity --json`.
    ///
    /// A single project object (non-recursive output) is accepted too.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Parse`] if the document is not a project list.
    pub fn from_pnpm_json(text: &str) -> Result<Self, ToolError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ToolError::parse("pnpm dependency graph JSON", e))?;
        let projects: Vec<RawProject> = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value),
            serde_json::Value::Object(_) => serde_json::from_value(value).map(|p| vec![p]),
            _ => {
                return Err(ToolError::parse(
                    "pnpm dependency graph JSON",
                    "expected an array of workspace projects",
                ))
            }
        }
        .map_err(|e| ToolError::parse("pnpm dependency graph JSON", e))?;

        let mut graph = Self::new();
        let roots: Vec<NodeId> = projects
            .iter()
            .enumerate()
            .map(|(pos, p)| graph.add_root(&p.label(pos), p.version.as_deref().unwrap_or("")))
            .collect();

        for (project, root) in projects.iter().zip(roots) {
            for block in project.dependency_blocks() {
                graph.attach(root, block);
            }
        }
        graph.sort_children();

        debug!(
            roots = graph.roots.len(),
            nodes = graph.nodes.len(),
            "dependency graph loaded"
        );
        Ok(graph)
    }

    fn attach(&mut self, parent: NodeId, deps: &BTreeMap<String, RawDependency>) {
        for (alias, dep) in deps {
            let name = dep.from.as_deref().unwrap_or(alias);
            let version = dep.version.as_deref().unwrap_or("");

            let linked_root = version
                .starts_with("link:")
                .then(|| self.root_names.get(name).copied())
                .flatten();
            let child = match linked_root {
                Some(root) => root,
                None => self.add_node(alias, name, version),
            };
            self.add_edge(parent, child);

            if linked_root.is_none() {
                self.attach(child, &dep.dependencies);
                self.attach(child, &dep.optional_dependencies);
            }
        }
    }

    /// Adds a workspace root.
    pub fn add_root(&mut self, name: &str, version: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(PackageNode {
            alias: name.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            children: Vec::new(),
        });
        self.roots.push(id);
        self.root_names.entry(name.to_string()).or_insert(id);
        id
    }

    /// Adds (or finds) a package node.
    pub fn add_node(&mut self, alias: &str, name: &str, version: &str) -> NodeId {
        let key = (alias.to_string(), name.to_string(), version.to_string());
        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        let id = self.nodes.len();
        self.nodes.push(PackageNode {
            alias: alias.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            children: Vec::new(),
        });
        self.index.insert(key, id);
        id
    }

    /// Adds a dependency edge; duplicate edges are ignored.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            if !node.children.contains(&child) {
                node.children.push(child);
            }
        }
    }

    fn sort_children(&mut self) {
        let labels: Vec<String> = self.nodes.iter().map(PackageNode::label).collect();
        for node in &mut self.nodes {
            node.children.sort_by(|a, b| labels[*a].cmp(&labels[*b]));
        }
    }

    /// Node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&PackageNode> {
        self.nodes.get(id)
    }

    /// Workspace roots, in document order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes, roots included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks every root and reports each forbidden node it reaches.
    ///
    /// Each root keeps its own visited set, so a node shared by two roots is
    /// reported once per root, and cycles terminate. The walk continues
    /// below a forbidden node.
    #[must_use]
    pub fn violations(&self, spec: &BoundarySpec) -> Vec<GraphViolation> {
        let mut violations = Vec::new();
        for &root in &self.roots {
            let mut visited = HashSet::new();
            let mut chain = Vec::new();
            self.walk(root, root, spec, &mut visited, &mut chain, &mut violations);
        }
        violations
    }

    fn walk(
        &self,
        root: NodeId,
        id: NodeId,
        spec: &BoundarySpec,
        visited: &mut HashSet<NodeId>,
        chain: &mut Vec<NodeId>,
        out: &mut Vec<GraphViolation>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        chain.push(id);

        if id != root {
            let offender = if spec.is_forbidden(&node.name) {
                Some(&node.name)
            } else if spec.is_forbidden(&node.alias) {
                Some(&node.alias)
            } else {
                None
            };
            if let Some(package) = offender {
                out.push(GraphViolation {
                    package: package.clone(),
                    chain: chain
                        .iter()
                        .filter_map(|n| self.nodes.get(*n).map(PackageNode::label))
                        .collect(),
                });
            }
        }

        for &child in &node.children {
            self.walk(root, child, spec, visited, chain, out);
        }
        chain.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = r#"[
      {
        "name": "marketing-site",
        "version": "1.0.0",
        "path": "/repo",
        "dependencies": {
          "ui-kit": {
            "from": "ui-kit",
            "version": "2.0.0",
            "dependencies": {
              "charts": {
                "from": "charts",
                "version": "0.3.0",
                "dependencies": {
                  "@scientia/engine": { "from": "@scientia/engine", "version": "0.9.0" }
                }
              }
            }
          },
          "react": { "from": "react", "version": "18.2.0" }
        },
        "devDependencies": {
          "fast-db": { "from": "@scientia/db", "version": "0.1.0" },
          "docs": { "from": "docs", "version": "link:packages/docs" }
        }
      },
      {
        "name": "docs",
        "version": "0.0.0",
        "path": "/repo/packages/docs",
        "dependencies": {
          "marketing-site": { "from": "marketing-site", "version": "link:../.." }
        }
      }
    ]"#;

    #[test]
    fn finds_deep_and_aliased_violations() {
        let graph = DependencyGraph::from_pnpm_json(GRAPH).unwrap();
        let violations = graph.violations(&BoundarySpec::default());
        let chains: Vec<String> = violations.iter().map(GraphViolation::chain_text).collect();
        assert_eq!(
            chains,
            vec![
                "marketing-site@1.0.0 > fast-db (@scientia/db)@0.1.0",
                "marketing-site@1.0.0 > ui-kit@2.0.0 > charts@0.3.0 > @scientia/engine@0.9.0",
                "docs@0.0.0 > marketing-site@1.0.0 > fast-db (@scientia/db)@0.1.0",
                "docs@0.0.0 > marketing-site@1.0.0 > ui-kit@2.0.0 > charts@0.3.0 > @scientia/engine@0.9.0",
            ]
        );
        assert_eq!(violations[0].package, "@scientia/db");
        assert_eq!(violations[0].root(), "marketing-site@1.0.0");
    }

    #[test]
    fn linked_workspaces_form_a_cycle_that_terminates() {
        let graph = DependencyGraph::from_pnpm_json(GRAPH).unwrap();
        let site = graph.roots()[0];
        let docs = graph.roots()[1];
        assert!(graph.node(site).unwrap().children.contains(&docs));
        assert!(graph.node(docs).unwrap().children.contains(&site));
        assert_eq!(graph.violations(&BoundarySpec::default()).len(), 4);
    }

    #[test]
    fn clean_graph_has_no_violations() {
        let graph = DependencyGraph::from_pnpm_json(
            r#"{ "name": "site", "dependencies": { "react": { "from": "react", "version": "18.2.0" } } }"#,
        )
        .unwrap();
        assert_eq!(graph.roots().len(), 1);
        assert!(graph.violations(&BoundarySpec::default()).is_empty());
    }

    #[test]
    fn shared_nodes_are_interned() {
        let mut graph = DependencyGraph::new();
        let root = graph.add_root("site", "1.0.0");
        let a = graph.add_node("a", "a", "1.0.0");
        let b = graph.add_node("a", "a", "1.0.0");
        assert_eq!(a, b);
        graph.add_edge(root, a);
        graph.add_edge(root, a);
        graph.add_edge(a, root);
        assert_eq!(graph.node(root).unwrap().children, vec![a]);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn malformed_documents_are_tool_failures() {
        assert!(DependencyGraph::from_pnpm_json("not json").is_err());
        assert!(DependencyGraph::from_pnpm_json("42").is_err());
        assert!(DependencyGraph::from_pnpm_json(r#"[{"dependencies": 3}]"#).is_err());
    }
}
