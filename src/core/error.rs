//! Error taxonomy for the activation registry and network solvers.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::graph::NodeId;

/// Result type for registry and solver operations.
pub type Result<T> = core::result::Result<T, NetworkError>;

/// Errors surfaced by the registry and by network solvers.
///
/// None of these are retried internally and none are downgraded to a default
/// numeric value.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// No scalar/module function is registered for this kind.
    #[error("unknown neuron activation type: {0}")]
    UnknownActivationKind(u8),

    /// Name lookup against an unregistered name.
    #[error("unsupported activation type name: {0}")]
    UnsupportedActivationName(String),

    /// Name lookup for a kind that has no registered name.
    #[error("unsupported activation type: {0}")]
    UnsupportedActivationKind(u8),

    /// A module produced a different number of outputs than it has outgoing links.
    #[error(
        "module activator returned {actual} output values, but the module has {expected} output links"
    )]
    ModuleArityMismatch { expected: usize, actual: usize },

    #[error("the sensors array size {actual} is unsupported by network solver, expected {expected}")]
    UnsupportedSensorsArraySize { expected: usize, actual: usize },

    /// Propagation did not settle within the configured bound.
    #[error("maximal network activation attempts exceeded: {0}")]
    ExceededMaxActivationAttempts(usize),

    #[error("unknown neuron type name: {0}")]
    UnknownNeuronRole(String),

    #[error("unknown node type name: {0}")]
    UnknownNodeType(String),

    /// A handle that does not address a node of this graph.
    #[error("invalid node handle: {0}")]
    InvalidNode(NodeId),

    /// A node kept non-zero state after a flush.
    #[error("node {node} is not in flushed state")]
    FlushFailed { node: NodeId },

    #[error("invalid solver config: {0}")]
    InvalidConfig(&'static str),
}
