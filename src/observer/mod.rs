use serde::Serialize;

use crate::graph::Node;
use crate::network::Network;
use crate::solver::NetworkSolver;

/// A read-only snapshot of a network's activation state.
///
/// Design intent:
/// - Observers cannot mutate or steer the network.
/// - Snapshotting is *on-demand* and can allocate; propagation stays unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub node_count: usize,
    pub link_count: usize,
    pub active_nodes: usize,
    pub nodes: Vec<NodeSnapshot>,
    pub outputs: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: usize,
    pub node_type: &'static str,
    pub role: &'static str,
    pub activation: String,
    pub value: f64,
    pub activations_count: u32,
    pub active: bool,
}

impl NetworkSnapshot {
    /// Pretty-printed JSON, for dumping into logs or files.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct NetworkAdapter<'a> {
    network: &'a Network,
}

impl<'a> NetworkAdapter<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        let diagnostics = self.network.diagnostics();
        let nodes = self
            .network
            .graph()
            .nodes()
            .iter()
            .map(|n| self.node_snapshot(n))
            .collect();

        NetworkSnapshot {
            node_count: diagnostics.node_count,
            link_count: diagnostics.link_count,
            active_nodes: diagnostics.active_nodes,
            nodes,
            outputs: self.network.read_outputs(),
        }
    }

    fn node_snapshot(&self, node: &Node) -> NodeSnapshot {
        // Kinds evicted from a custom registry have no name left.
        let activation = self
            .network
            .registry()
            .name_of(node.activation_kind)
            .map(|s| s.to_string())
            .unwrap_or_else(|_| node.activation_kind.to_string());

        NodeSnapshot {
            id: node.id,
            node_type: node.node_type.name(),
            role: node.role.name(),
            activation,
            value: node.activation(),
            activations_count: node.activations_count(),
            active: node.is_active(),
        }
    }
}
