//! Compiled, read-only flow graph.
//!
//! A [`Flow`] is built once from a [`FlowModel`] and then shared by every
//! session running it. Nodes live in a petgraph `DiGraph`; each node's
//! outgoing edges are resolved into [`Links`] during compilation, in edge
//! declaration order. An edge to an unknown node is kept in the links and
//! only fails a session that follows it.

use std::collections::{HashMap, HashSet};

use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::Dfs,
};

use crate::{
    ConvoflowError, FlowModel, Result,
    workflow::{
        edge::{Edge, Links},
        node::{Node, NodeId},
    },
};

/// Runtime flow representation as a directed graph.
#[derive(Debug)]
pub struct Flow {
    id: String,
    name: String,
    graph: DiGraph<Node, Edge>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Flow {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First `start` node in declaration order.
    pub fn start_node(&self) -> Option<&Node> {
        self.graph.node_indices().map(|idx| &self.graph[idx]).find(|node| node.is_start())
    }

    /// get node by id
    pub fn node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.index.get(id).map(|idx| &self.graph[*idx])
    }

    #[cfg(test)]
    pub(crate) fn node_mut(
        &mut self,
        id: &str,
    ) -> Option<&mut Node> {
        self.index.get(id).map(|idx| &mut self.graph[*idx])
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node ids that cannot be reached from the start node.
    pub fn unreachable(&self) -> Vec<NodeId> {
        let Some(start) = self.start_node().and_then(|n| self.index.get(&n.id)) else {
            return self.nodes().map(|n| n.id.clone()).collect();
        };

        let mut seen = HashSet::new();
        let mut dfs = Dfs::new(&self.graph, *start);
        while let Some(idx) = dfs.next(&self.graph) {
            seen.insert(idx);
        }

        self.graph.node_indices().filter(|idx| !seen.contains(idx)).map(|idx| self.graph[idx].id.clone()).collect()
    }

    /// Output a human-readable representation of the flow graph
    pub fn schema(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("=== Flow {} ===", self.id));
        lines.push(format!("Nodes: {}, Edges: {}", self.graph.node_count(), self.graph.edge_count()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for node in self.nodes() {
            let kind = node.uses.map(|u| u.as_ref().to_string()).unwrap_or_else(|| format!("unsupported: {}", node.type_tag));
            lines.push(format!("[{}] type: {}", node.id, kind));
        }
        lines.push(String::new());

        lines.push("--- Links ---".to_string());
        for node in self.nodes() {
            let targets = node.links.targets();
            if targets.is_empty() {
                lines.push(format!("{} -> (end)", node.id));
            } else {
                let rendered: Vec<String> = targets.iter().map(|(handle, target)| format!("{}({})", target, handle)).collect();
                lines.push(format!("{} -> {}", node.id, rendered.join(", ")));
            }
        }

        lines.join("\n")
    }
}

impl TryFrom<&FlowModel> for Flow {
    type Error = ConvoflowError;

    fn try_from(model: &FlowModel) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for node_model in &model.nodes {
            if index.contains_key(&node_model.id) {
                tracing::warn!(flow_id = %model.id, node_id = %node_model.id, "duplicate node id, keeping the first");
                continue;
            }
            let idx = graph.add_node(Node::new(node_model));
            index.insert(node_model.id.clone(), idx);
        }

        // outgoing edges per source in declaration order, including edges to missing targets
        let mut outgoing: HashMap<NodeIndex, Vec<Edge>> = HashMap::new();
        for edge_model in &model.edges {
            let edge = Edge::from(edge_model);
            let Some(source) = index.get(&edge.source).copied() else {
                tracing::warn!(flow_id = %model.id, edge_id = %edge.id, source = %edge.source, "edge leaves an unknown node, ignoring it");
                continue;
            };
            match index.get(&edge.target) {
                Some(target) => {
                    graph.add_edge(source, *target, edge.clone());
                }
                None => {
                    tracing::warn!(flow_id = %model.id, edge_id = %edge.id, target = %edge.target, "edge points at an unknown node");
                }
            }
            outgoing.entry(source).or_default().push(edge);
        }

        let resolved: Vec<(NodeIndex, Links)> = graph
            .node_indices()
            .map(|idx| {
                let edges: Vec<&Edge> = outgoing.get(&idx).map(|edges| edges.iter().collect()).unwrap_or_default();
                let node = &graph[idx];
                (idx, Links::resolve(node.uses, node.option_count(), &edges))
            })
            .collect();

        for (idx, links) in resolved {
            graph[idx].links = links;
        }

        let flow = Self {
            id: model.id.clone(),
            name: model.name.clone(),
            graph,
            index,
        };

        if flow.start_node().is_none() {
            tracing::warn!(flow_id = %flow.id, "flow has no start node");
        } else {
            for nid in flow.unreachable() {
                tracing::warn!(flow_id = %flow.id, node_id = %nid, "node is unreachable from start");
            }
        }

        Ok(flow)
    }
}
