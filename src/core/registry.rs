#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(not(feature = "std"))]
use alloc::{
    string::{String, ToString},
    vec::Vec,
};
#[cfg(not(feature = "std"))]
use hashbrown::HashMap;

use crate::activation::{functions, ActivationKind, ModuleActivation, ScalarActivation};
use crate::error::{NetworkError, Result};
use crate::graph::{Graph, Node, NodeId};

const BUILTIN_SCALARS: [(ActivationKind, ScalarActivation, &str); 19] = [
    (ActivationKind::SigmoidPlain, functions::plain_sigmoid, "SigmoidPlainActivation"),
    (ActivationKind::SigmoidReduced, functions::reduced_sigmoid, "SigmoidReducedActivation"),
    (ActivationKind::SigmoidSteepened, functions::steepened_sigmoid, "SigmoidSteepenedActivation"),
    (ActivationKind::SigmoidBipolar, functions::bipolar_sigmoid, "SigmoidBipolarActivation"),
    (
        ActivationKind::SigmoidApproximation,
        functions::approximation_sigmoid,
        "SigmoidApproximationActivation",
    ),
    (
        ActivationKind::SigmoidSteepenedApproximation,
        functions::approximation_steepened_sigmoid,
        "SigmoidSteepenedApproximationActivation",
    ),
    (
        ActivationKind::SigmoidInverseAbsolute,
        functions::inverse_absolute_sigmoid,
        "SigmoidInverseAbsoluteActivation",
    ),
    (
        ActivationKind::SigmoidLeftShifted,
        functions::left_shifted_sigmoid,
        "SigmoidLeftShiftedActivation",
    ),
    (
        ActivationKind::SigmoidLeftShiftedSteepened,
        functions::left_shifted_steepened_sigmoid,
        "SigmoidLeftShiftedSteepenedActivation",
    ),
    (
        ActivationKind::SigmoidRightShiftedSteepened,
        functions::right_shifted_steepened_sigmoid,
        "SigmoidRightShiftedSteepenedActivation",
    ),
    (ActivationKind::Tanh, functions::hyperbolic_tangent, "TanhActivation"),
    (ActivationKind::GaussianBipolar, functions::bipolar_gaussian, "GaussianBipolarActivation"),
    (ActivationKind::Linear, functions::linear, "LinearActivation"),
    (ActivationKind::LinearAbs, functions::absolute_linear, "LinearAbsActivation"),
    (ActivationKind::LinearClipped, functions::clipped_linear, "LinearClippedActivation"),
    (ActivationKind::Null, functions::null, "NullActivation"),
    (ActivationKind::Sign, functions::sign, "SignActivation"),
    (ActivationKind::Sine, functions::sine, "SineActivation"),
    (ActivationKind::Step, functions::step, "StepActivation"),
];

const BUILTIN_MODULES: [(ActivationKind, ModuleActivation, &str); 3] = [
    (ActivationKind::MultiplyModule, functions::multiply_module, "MultiplyModuleActivation"),
    (ActivationKind::MaxModule, functions::max_module, "MaxModuleActivation"),
    (ActivationKind::MinModule, functions::min_module, "MinModuleActivation"),
];

/// Maps activation kinds to their numeric implementation and canonical name.
///
/// Build one with [`ActivatorRegistry::new`] at startup and share it
/// read-only (for example behind an `Arc`) between any number of networks.
/// The name table is kept bijective: each registered kind has exactly one
/// name and each name resolves to exactly one kind.
#[derive(Debug, Clone)]
pub struct ActivatorRegistry {
    activators: HashMap<ActivationKind, ScalarActivation>,
    module_activators: HashMap<ActivationKind, ModuleActivation>,

    // Forward and inverse kind <-> name tables.
    forward: HashMap<ActivationKind, String>,
    inverse: HashMap<String, ActivationKind>,
}

impl Default for ActivatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivatorRegistry {
    /// Registry with every built-in activation pre-registered.
    pub fn new() -> Self {
        let mut reg = Self::empty();
        for (kind, func, name) in BUILTIN_SCALARS {
            reg.register(kind, func, name);
        }
        for (kind, func, name) in BUILTIN_MODULES {
            reg.register_module(kind, func, name);
        }
        reg
    }

    /// Registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            activators: HashMap::new(),
            module_activators: HashMap::new(),
            forward: HashMap::new(),
            inverse: HashMap::new(),
        }
    }

    /// Register (or replace) a scalar activation. Last write wins.
    pub fn register(&mut self, kind: ActivationKind, func: ScalarActivation, name: &str) {
        self.module_activators.remove(&kind);
        self.activators.insert(kind, func);
        self.bind_name(kind, name);
    }

    /// Register (or replace) a module activation. Last write wins.
    pub fn register_module(&mut self, kind: ActivationKind, func: ModuleActivation, name: &str) {
        self.activators.remove(&kind);
        self.module_activators.insert(kind, func);
        self.bind_name(kind, name);
    }

    fn bind_name(&mut self, kind: ActivationKind, name: &str) {
        // Drop stale entries on both sides so the tables stay inverse.
        if let Some(old_name) = self.forward.remove(&kind) {
            self.inverse.remove(&old_name);
        }
        // A kind that loses its name is unregistered entirely.
        if let Some(old_kind) = self.inverse.remove(name) {
            self.forward.remove(&old_kind);
            if old_kind != kind {
                self.activators.remove(&old_kind);
                self.module_activators.remove(&old_kind);
            }
        }
        self.forward.insert(kind, name.to_string());
        self.inverse.insert(name.to_string(), kind);
    }

    /// Number of kinds with a registered function.
    pub fn len(&self) -> usize {
        self.activators.len() + self.module_activators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, kind: ActivationKind) -> bool {
        self.activators.contains_key(&kind) || self.module_activators.contains_key(&kind)
    }

    /// Evaluate the scalar function registered for `kind`.
    pub fn activate(&self, kind: ActivationKind, input: f64, aux_params: &[f64]) -> Result<f64> {
        let func = self
            .activators
            .get(&kind)
            .ok_or(NetworkError::UnknownActivationKind(kind.id()))?;
        Ok(func(input, aux_params))
    }

    /// Evaluate the module function registered for `kind`.
    ///
    /// The output length is whatever the function returns.
    pub fn activate_module(
        &self,
        kind: ActivationKind,
        inputs: &[f64],
        aux_params: &[f64],
    ) -> Result<Vec<f64>> {
        let func = self
            .module_activators
            .get(&kind)
            .ok_or(NetworkError::UnknownActivationKind(kind.id()))?;
        Ok(func(inputs, aux_params))
    }

    /// Activate `node` from its accumulated input. On error the node is untouched.
    pub fn activate_node(&self, node: &mut Node) -> Result<()> {
        let out = self.activate(node.activation_kind, node.activation_sum, &node.params)?;
        node.set_activation(out);
        Ok(())
    }

    /// Activate a module node: gather the outputs of its incoming sources,
    /// evaluate the module and write one output per outgoing link target,
    /// marking each target active. Nothing is written on error.
    pub fn activate_module_node(&self, graph: &mut Graph, module: NodeId) -> Result<()> {
        let writes = self.resolve_module(graph, module)?;
        let nodes = graph.nodes_mut();
        for (target, value) in writes {
            nodes[target].set_activation(value);
            nodes[target].is_active = true;
        }
        Ok(())
    }

    /// Compute the `(target, value)` writes of a module node without applying them.
    pub(crate) fn resolve_module(&self, graph: &Graph, module: NodeId) -> Result<Vec<(NodeId, f64)>> {
        let node = graph.node(module).ok_or(NetworkError::InvalidNode(module))?;
        let links = graph.links();
        let nodes = graph.nodes();

        let inputs: Vec<f64> = node
            .incoming
            .iter()
            .map(|&l| nodes[links[l].source].active_out())
            .collect();

        let outputs = self.activate_module(node.activation_kind, &inputs, &node.params)?;
        if outputs.len() != node.outgoing.len() {
            log::warn!(
                "module node {} ({}) produced {} outputs for {} output links",
                module,
                node.activation_kind,
                outputs.len(),
                node.outgoing.len()
            );
            return Err(NetworkError::ModuleArityMismatch {
                expected: node.outgoing.len(),
                actual: outputs.len(),
            });
        }

        Ok(node
            .outgoing
            .iter()
            .map(|&l| links[l].target)
            .zip(outputs)
            .collect())
    }

    /// Canonical name of a registered kind.
    pub fn name_of(&self, kind: ActivationKind) -> Result<&str> {
        self.forward
            .get(&kind)
            .map(|s| s.as_str())
            .ok_or(NetworkError::UnsupportedActivationKind(kind.id()))
    }

    /// Kind registered under `name`.
    pub fn kind_of(&self, name: &str) -> Result<ActivationKind> {
        self.inverse
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnsupportedActivationName(name.to_string()))
    }
}
