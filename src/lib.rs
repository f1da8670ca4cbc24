//! # evonet
//!
//! Activation registry and signal-propagation solver for evolvable,
//! graph-structured neural networks.
//!
//! Networks are arbitrary directed graphs of sensors, neurons and
//! multi-input/multi-output "module" nodes, possibly with cycles and
//! time-delayed links. A shared [`registry::ActivatorRegistry`] maps every
//! [`activation::ActivationKind`] to its numeric function and canonical name.
//!
//! ## Quick Start
//!
//! ```
//! use evonet::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ActivatorRegistry::new());
//!
//! let mut graph = Graph::new();
//! let input = graph.add_node(NeuronRole::Input, ActivationKind::Linear);
//! let bias = graph.add_node(NeuronRole::Bias, ActivationKind::Linear);
//! let out = graph.add_node(NeuronRole::Output, ActivationKind::SigmoidSteepened);
//! graph.add_link(input, out, 1.5).unwrap();
//! graph.add_link(bias, out, -0.5).unwrap();
//!
//! let mut net = Network::new(graph, registry);
//! net.load_sensors(&[1.0, 1.0]).unwrap();
//! assert!(net.forward_steps(net.max_activation_depth()).unwrap());
//! let outputs = net.read_outputs();
//! assert_eq!(outputs.len(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `serde` (default): Serialization of kinds, roles, links and configs
//! - `parallel`: Evaluate neurons of a forward round on rayon workers
//!
//! ## no_std Support
//!
//! Disable default features for `no_std` environments:
//! ```toml
//! evonet = { version = "0.1", default-features = false }
//! ```
//!
//! ## Modules
//!
//! - [`activation`]: Activation kinds and their numeric functions
//! - [`registry`]: Kind to function and name lookup
//! - [`graph`]: Node/link arena
//! - [`solver`]: The solver contract
//! - [`network`]: Forward, recursive and relaxation propagation
//! - [`observer`]: Read-only snapshots of a network

// no_std support
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[path = "core/activation.rs"]
pub mod activation;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/graph.rs"]
pub mod graph;

#[path = "core/registry.rs"]
pub mod registry;

#[path = "core/solver.rs"]
pub mod solver;

#[path = "core/network.rs"]
pub mod network;

#[cfg(all(feature = "std", feature = "serde"))]
pub mod observer;

/// Prelude module for convenient imports.
///
/// ```
/// use evonet::prelude::*;
/// ```
pub mod prelude {
    pub use crate::activation::{ActivationKind, ModuleActivation, ScalarActivation};
    pub use crate::error::NetworkError;
    pub use crate::graph::{Graph, Link, LinkId, Node, NodeId, NodeType, NeuronRole};
    pub use crate::network::{Diagnostics, ExecutionTier, Network, SolverConfig};
    pub use crate::registry::ActivatorRegistry;
    pub use crate::solver::NetworkSolver;
}
