//! Metadata dependency registry.
//!
//! Records which metadata must be refreshed when another piece of metadata
//! changes. Edges point from **upstream** (the source of truth) to
//! **downstream** (the metadata derived from it), and either end may be a
//! class or an instance identifier.
//!
//! # Invariants
//!
//! - The graph is acyclic by reachability: an edge is refused if its downstream
//!   already reaches its upstream, so no identifier ever depends on itself.
//! - [`DependencyRegistry::register`] is the only way edges are created.
//! - Nodes without any edge are pruned, so the graph only holds live identifiers.
//!
//! Notification dispatch needs the [`MetadataService`](super::MetadataService)
//! and therefore lives there; this type is the pure graph plus the ordered list
//! of additional listeners.

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use super::{MetadataId, MetadataNotificationListener};
use crate::core::{MetadataError, Result};

/// Upstream → downstream graph of metadata identifiers.
#[derive(Default)]
pub struct DependencyRegistry {
    graph: StableDiGraph<MetadataId, ()>,
    node_map: HashMap<MetadataId, NodeIndex>,
    listeners: Vec<Arc<dyn MetadataNotificationListener>>,
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, id: &MetadataId) -> NodeIndex {
        if let Some(&index) = self.node_map.get(id) {
            index
        } else {
            let index = self.graph.add_node(id.clone());
            self.node_map.insert(id.clone(), index);
            index
        }
    }

    /// Drop a node once it no longer participates in any edge.
    fn prune(&mut self, index: NodeIndex) {
        let isolated = self.graph.edges_directed(index, Direction::Incoming).next().is_none()
            && self.graph.edges_directed(index, Direction::Outgoing).next().is_none();
        if isolated && let Some(id) = self.graph.remove_node(index) {
            self.node_map.remove(&id);
        }
    }

    /// Whether `upstream → downstream` may be registered without creating a cycle.
    ///
    /// A self reference is never valid. Otherwise the edge is valid unless
    /// `downstream` is already (transitively) upstream of `upstream`.
    pub fn is_valid_dependency(&self, upstream: &MetadataId, downstream: &MetadataId) -> bool {
        if upstream == downstream {
            return false;
        }
        match (self.node_map.get(upstream), self.node_map.get(downstream)) {
            (Some(&up), Some(&down)) => !has_path_connecting(&self.graph, down, up, None),
            _ => true,
        }
    }

    /// Register `upstream → downstream`.
    ///
    /// Registering an existing edge again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::InvalidDependency`] when the edge would make an
    /// identifier depend on itself.
    pub fn register(&mut self, upstream: &MetadataId, downstream: &MetadataId) -> Result<()> {
        if !self.is_valid_dependency(upstream, downstream) {
            return Err(MetadataError::InvalidDependency {
                upstream: upstream.to_string(),
                downstream: downstream.to_string(),
            });
        }
        let up = self.ensure_node(upstream);
        let down = self.ensure_node(downstream);
        if self.graph.find_edge(up, down).is_none() {
            self.graph.add_edge(up, down, ());
        }
        Ok(())
    }

    /// Remove `upstream → downstream` if present.
    pub fn deregister(&mut self, upstream: &MetadataId, downstream: &MetadataId) {
        let (Some(&up), Some(&down)) = (self.node_map.get(upstream), self.node_map.get(downstream))
        else {
            return;
        };
        if let Some(edge) = self.graph.find_edge(up, down) {
            self.graph.remove_edge(edge);
            self.prune(up);
            self.prune(down);
        }
    }

    /// Remove every edge whose downstream is `downstream`.
    pub fn deregister_all(&mut self, downstream: &MetadataId) {
        let Some(&down) = self.node_map.get(downstream) else {
            return;
        };
        let incoming: Vec<_> = self
            .graph
            .edges_directed(down, Direction::Incoming)
            .map(|edge| (edge.id(), edge.source()))
            .collect();
        for (edge, up) in incoming {
            self.graph.remove_edge(edge);
            self.prune(up);
        }
        self.prune(down);
    }

    fn neighbors(&self, id: &MetadataId, direction: Direction) -> BTreeSet<MetadataId> {
        self.node_map
            .get(id)
            .map(|&index| {
                self.graph
                    .neighbors_directed(index, direction)
                    .map(|n| self.graph[n].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Immediate downstream dependencies of `upstream`.
    pub fn downstream(&self, upstream: &MetadataId) -> BTreeSet<MetadataId> {
        self.neighbors(upstream, Direction::Outgoing)
    }

    /// Immediate upstream dependencies of `downstream`.
    pub fn upstream(&self, downstream: &MetadataId) -> BTreeSet<MetadataId> {
        self.neighbors(downstream, Direction::Incoming)
    }

    /// Every identifier reachable downstream of `upstream`, breadth first.
    pub fn transitive_downstream(&self, upstream: &MetadataId) -> Vec<MetadataId> {
        let mut result = Vec::new();
        let Some(&start) = self.node_map.get(upstream) else {
            return result;
        };
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if seen.insert(next) {
                    result.push(self.graph[next].clone());
                    queue.push_back(next);
                }
            }
        }
        result
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Add a general-purpose listener; adding the same listener twice is a no-op.
    pub fn add_listener(&mut self, listener: Arc<dyn MetadataNotificationListener>) {
        if !self.listeners.iter().any(|l| same_listener(l, &listener)) {
            self.listeners.push(listener);
        }
    }

    pub fn remove_listener(&mut self, listener: &Arc<dyn MetadataNotificationListener>) {
        self.listeners.retain(|l| !same_listener(l, listener));
    }

    /// Listeners in registration order.
    pub fn listeners(&self) -> &[Arc<dyn MetadataNotificationListener>] {
        &self.listeners
    }

    /// Render the downstream tree of `root`.
    pub fn to_tree_string(&self, root: &MetadataId) -> String {
        let mut result = format!("{root}\n");
        let mut visited = HashSet::from([root.clone()]);
        let children: Vec<_> = self.downstream(root).into_iter().collect();
        for (i, child) in children.iter().enumerate() {
            self.build_tree_string(child, &mut result, "", i == children.len() - 1, &mut visited);
        }
        result
    }

    fn build_tree_string(
        &self,
        node: &MetadataId,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<MetadataId>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{prefix}{connector}{node}\n"));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(node.clone()) {
            // Shared downstream already expanded elsewhere in the tree
            result.push_str(&format!("{child_prefix}└── (see above)\n"));
            return;
        }

        let children: Vec<_> = self.downstream(node).into_iter().collect();
        for (i, child) in children.iter().enumerate() {
            self.build_tree_string(child, result, &child_prefix, i == children.len() - 1, visited);
        }
    }
}

fn same_listener(
    a: &Arc<dyn MetadataNotificationListener>,
    b: &Arc<dyn MetadataNotificationListener>,
) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
