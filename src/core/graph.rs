// no_std support
#[cfg(not(feature = "std"))]
use alloc::{string::ToString, vec::Vec};

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activation::ActivationKind;
use crate::error::{NetworkError, Result};

/// Stable handle of a node inside a [`Graph`].
pub type NodeId = usize;

/// Stable handle of a link inside a [`Graph`].
pub type LinkId = usize;

/// Whether a node is computed or loaded from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeType {
    Neuron,
    Sensor,
}

impl NodeType {
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Neuron => "NEURON",
            NodeType::Sensor => "SENSOR",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "NEURON" => Ok(NodeType::Neuron),
            "SENSOR" => Ok(NodeType::Sensor),
            _ => Err(NetworkError::UnknownNodeType(name.to_string())),
        }
    }
}

/// The layer-like role a node plays in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NeuronRole {
    Hidden,
    Input,
    Output,
    Bias,
}

impl NeuronRole {
    pub fn name(self) -> &'static str {
        match self {
            NeuronRole::Hidden => "HIDN",
            NeuronRole::Input => "INPT",
            NeuronRole::Output => "OUTP",
            NeuronRole::Bias => "BIAS",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "HIDN" => Ok(NeuronRole::Hidden),
            "INPT" => Ok(NeuronRole::Input),
            "OUTP" => Ok(NeuronRole::Output),
            "BIAS" => Ok(NeuronRole::Bias),
            _ => Err(NetworkError::UnknownNeuronRole(name.to_string())),
        }
    }

    /// Inputs and biases are fed from outside.
    pub fn node_type(self) -> NodeType {
        match self {
            NeuronRole::Input | NeuronRole::Bias => NodeType::Sensor,
            NeuronRole::Hidden | NeuronRole::Output => NodeType::Neuron,
        }
    }
}

/// A weighted connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
    /// Reads the source's previous activation instead of the current one.
    pub time_delayed: bool,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    pub role: NeuronRole,
    pub activation_kind: ActivationKind,
    /// Auxiliary parameters passed to the activation function.
    pub params: Vec<f64>,

    pub activation_sum: f64,
    pub(crate) activation: f64,
    pub(crate) last_activation: f64,
    pub(crate) last_activation2: f64,
    pub(crate) activations_count: u32,
    pub(crate) is_active: bool,

    pub(crate) incoming: Vec<LinkId>,
    pub(crate) outgoing: Vec<LinkId>,
}

impl Node {
    fn new(id: NodeId, role: NeuronRole, activation_kind: ActivationKind) -> Self {
        Self {
            id,
            node_type: role.node_type(),
            role,
            activation_kind,
            params: Vec::new(),
            activation_sum: 0.0,
            activation: 0.0,
            last_activation: 0.0,
            last_activation2: 0.0,
            activations_count: 0,
            is_active: false,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn is_sensor(&self) -> bool {
        self.node_type == NodeType::Sensor
    }

    pub fn is_module(&self) -> bool {
        self.activation_kind.is_module()
    }

    pub fn activation(&self) -> f64 {
        self.activation
    }

    pub fn last_activation(&self) -> f64 {
        self.last_activation
    }

    pub fn activations_count(&self) -> u32 {
        self.activations_count
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn incoming(&self) -> &[LinkId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[LinkId] {
        &self.outgoing
    }

    /// Current output, or 0 if the node was never activated since the last flush.
    #[inline]
    pub fn active_out(&self) -> f64 {
        if self.activations_count > 0 {
            self.activation
        } else {
            0.0
        }
    }

    /// Previous output for time-delayed links, or 0 without enough history.
    #[inline]
    pub fn active_out_td(&self) -> f64 {
        if self.activations_count > 1 {
            self.last_activation
        } else {
            0.0
        }
    }

    /// Store a newly computed output, keeping two steps of history.
    pub(crate) fn set_activation(&mut self, value: f64) {
        self.last_activation2 = self.last_activation;
        self.last_activation = self.activation;
        self.activation = value;
        self.activations_count = self.activations_count.saturating_add(1);
    }

    /// Load an external value into a sensor. Returns false for non-sensors.
    pub(crate) fn sensor_load(&mut self, value: f64) -> bool {
        if !self.is_sensor() {
            return false;
        }
        self.set_activation(value);
        self.is_active = true;
        true
    }

    pub(crate) fn flushback(&mut self) {
        self.activation_sum = 0.0;
        self.activation = 0.0;
        self.last_activation = 0.0;
        self.last_activation2 = 0.0;
        self.activations_count = 0;
        self.is_active = false;
    }

    pub(crate) fn is_flushed(&self) -> bool {
        self.activation_sum == 0.0
            && self.activation == 0.0
            && self.last_activation == 0.0
            && self.last_activation2 == 0.0
            && self.activations_count == 0
            && !self.is_active
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} id:{}, {}, {}, step:{} activation:{:.3})",
            self.node_type.name(),
            self.id,
            self.role.name(),
            self.activation_kind,
            self.activations_count,
            self.activation
        )
    }
}

/// Arena of nodes and links. Links reference nodes by handle, so cycles are
/// plain data.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, role: NeuronRole, activation_kind: ActivationKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, role, activation_kind));
        id
    }

    /// Add a node carrying auxiliary activation parameters.
    pub fn add_node_with_params(
        &mut self,
        role: NeuronRole,
        activation_kind: ActivationKind,
        params: Vec<f64>,
    ) -> NodeId {
        let id = self.add_node(role, activation_kind);
        self.nodes[id].params = params;
        id
    }

    pub fn add_link(&mut self, source: NodeId, target: NodeId, weight: f64) -> Result<LinkId> {
        self.push_link(source, target, weight, false)
    }

    pub fn add_delayed_link(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
    ) -> Result<LinkId> {
        self.push_link(source, target, weight, true)
    }

    fn push_link(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
        time_delayed: bool,
    ) -> Result<LinkId> {
        if source >= self.nodes.len() {
            return Err(NetworkError::InvalidNode(source));
        }
        if target >= self.nodes.len() {
            return Err(NetworkError::InvalidNode(target));
        }
        let id = self.links.len();
        self.links.push(Link {
            source,
            target,
            weight,
            time_delayed,
        });
        self.nodes[source].outgoing.push(id);
        self.nodes[target].incoming.push(id);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// True if any incoming link of `id` leaves a (non-sensor) module node.
    pub fn is_module_driven(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| {
            node.incoming.iter().any(|&l| {
                let source = &self.nodes[self.links[l].source];
                !source.is_sensor() && source.is_module()
            })
        })
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_and_type_names_roundtrip() {
        for role in [
            NeuronRole::Hidden,
            NeuronRole::Input,
            NeuronRole::Output,
            NeuronRole::Bias,
        ] {
            assert_eq!(NeuronRole::from_name(role.name()), Ok(role));
        }
        for t in [NodeType::Neuron, NodeType::Sensor] {
            assert_eq!(NodeType::from_name(t.name()), Ok(t));
        }
        assert_eq!(
            NeuronRole::from_name("nope"),
            Err(NetworkError::UnknownNeuronRole("nope".to_string()))
        );
        assert!(NodeType::from_name("").is_err());
    }

    #[test]
    fn bias_and_input_are_sensors() {
        assert_eq!(NeuronRole::Bias.node_type(), NodeType::Sensor);
        assert_eq!(NeuronRole::Input.node_type(), NodeType::Sensor);
        assert_eq!(NeuronRole::Output.node_type(), NodeType::Neuron);
    }

    #[test]
    fn links_are_indexed_on_both_ends() {
        let mut g = Graph::new();
        let a = g.add_node(NeuronRole::Input, ActivationKind::Linear);
        let b = g.add_node(NeuronRole::Output, ActivationKind::SigmoidPlain);
        let l = g.add_link(a, b, 0.5).unwrap();
        let back = g.add_delayed_link(b, b, -1.0).unwrap();

        assert_eq!(g.node(a).unwrap().outgoing(), &[l]);
        assert_eq!(g.node(b).unwrap().incoming(), &[l, back]);
        assert!(g.link(back).unwrap().time_delayed);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.link_count(), 2);
    }

    #[test]
    fn link_to_missing_node_is_rejected() {
        let mut g = Graph::new();
        let a = g.add_node(NeuronRole::Input, ActivationKind::Linear);
        assert_eq!(g.add_link(a, 7, 1.0), Err(NetworkError::InvalidNode(7)));
        assert_eq!(g.link_count(), 0);
    }

    #[test]
    fn activation_history_and_flush() {
        let mut g = Graph::new();
        let id = g.add_node(NeuronRole::Hidden, ActivationKind::Linear);
        let node = g.node_mut(id).unwrap();
        assert_eq!(node.active_out(), 0.0);

        node.set_activation(0.25);
        assert_eq!(node.active_out(), 0.25);
        assert_eq!(node.active_out_td(), 0.0);

        node.set_activation(0.75);
        assert_eq!(node.active_out_td(), 0.25);
        assert_eq!(node.activations_count(), 2);

        node.flushback();
        assert!(node.is_flushed());
        assert_eq!(node.active_out(), 0.0);
    }

    #[test]
    fn sensor_load_rejects_neurons() {
        let mut g = Graph::new();
        let s = g.add_node(NeuronRole::Input, ActivationKind::Linear);
        let h = g.add_node(NeuronRole::Hidden, ActivationKind::Linear);
        assert!(g.node_mut(s).unwrap().sensor_load(3.0));
        assert!(!g.node_mut(h).unwrap().sensor_load(3.0));
        assert_eq!(g.node(s).unwrap().activation(), 3.0);
        assert!(g.node(s).unwrap().is_active());
        assert_eq!(g.node(h).unwrap().activations_count(), 0);
    }
}
