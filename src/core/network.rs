// no_std support: use core and alloc when std is not available
#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};
use crate::graph::{Graph, NeuronRole, NodeId};
use crate::registry::ActivatorRegistry;
use crate::solver::NetworkSolver;

/// Execution tier for forward rounds.
///
/// - `Scalar`: Single-threaded (default, works everywhere)
/// - `Parallel`: Neuron evaluation spread over rayon workers
///
/// Both tiers produce identical results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExecutionTier {
    #[default]
    Scalar,
    /// Requires the `parallel` feature; falls back to `Scalar` otherwise.
    Parallel,
}

/// Bounds and execution settings of a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Maximum forward rounds `Network::activate` may run before giving up.
    pub max_activation_attempts: usize,

    /// Maximum node visits per `recursive_steps` pass.
    /// `None` allows one visit per node.
    pub max_recursive_visits: Option<usize>,

    pub execution_tier: ExecutionTier,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_activation_attempts: 20,
            max_recursive_visits: None,
            execution_tier: ExecutionTier::Scalar,
        }
    }
}

impl SolverConfig {
    pub fn with_max_activation_attempts(mut self, attempts: usize) -> Self {
        self.max_activation_attempts = attempts;
        self
    }

    pub fn with_max_recursive_visits(mut self, visits: usize) -> Self {
        self.max_recursive_visits = Some(visits);
        self
    }

    pub fn with_execution_tier(mut self, tier: ExecutionTier) -> Self {
        self.execution_tier = tier;
        self
    }

    /// Validate the configuration, returning an error message if invalid.
    pub fn validate(&self) -> core::result::Result<(), &'static str> {
        if self.max_activation_attempts == 0 {
            return Err("max_activation_attempts must be > 0");
        }
        if self.max_recursive_visits == Some(0) {
            return Err("max_recursive_visits must be > 0");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub node_count: usize,
    pub link_count: usize,
    pub sensor_count: usize,
    pub output_count: usize,
    pub module_count: usize,
    pub active_nodes: usize,
    pub avg_abs_activation: f64,
}

/// Staged result of one neuron for the current round.
#[derive(Debug, Clone, Copy)]
struct NeuronUpdate {
    id: NodeId,
    sum: f64,
    active: bool,
    out: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// A wired network over a [`Graph`] arena, evaluated with a shared registry.
#[derive(Debug, Clone)]
pub struct Network {
    graph: Graph,
    registry: Arc<ActivatorRegistry>,
    cfg: SolverConfig,

    sensors: Vec<NodeId>,
    outputs: Vec<NodeId>,
    // Computed neurons: not sensors, not modules, not written by a module.
    neurons: Vec<NodeId>,
    modules: Vec<NodeId>,

    // Per node, the nodes a recursive pull must settle first.
    pull_deps: Vec<Vec<NodeId>>,
}

impl Network {
    /// Wrap a fully wired graph. Sensors (inputs and biases) and outputs are
    /// ordered by node handle.
    ///
    /// A module node never holds a value of its own, so a module with role
    /// `Output` is not read as an output. Wire its results into output
    /// neurons instead.
    pub fn new(graph: Graph, registry: Arc<ActivatorRegistry>) -> Self {
        let mut sensors = Vec::new();
        let mut outputs = Vec::new();
        let mut neurons = Vec::new();
        let mut modules = Vec::new();

        for node in graph.nodes() {
            if node.is_sensor() {
                sensors.push(node.id);
                continue;
            }
            if node.role == NeuronRole::Output {
                if node.is_module() {
                    log::warn!(
                        "module node {} has role {}; its targets are the outputs",
                        node.id,
                        node.role.name()
                    );
                } else {
                    outputs.push(node.id);
                }
            }
            if node.is_module() {
                modules.push(node.id);
            } else if !graph.is_module_driven(node.id) {
                neurons.push(node.id);
            }
        }

        let pull_deps = graph
            .nodes()
            .iter()
            .map(|node| {
                if node.is_sensor() {
                    return Vec::new();
                }
                let driven = !node.is_module() && graph.is_module_driven(node.id);
                node.incoming()
                    .iter()
                    .filter_map(|&l| graph.link(l))
                    .filter(|link| {
                        if node.is_module() {
                            return true;
                        }
                        let source = &graph.nodes()[link.source];
                        let from_module = !source.is_sensor() && source.is_module();
                        if driven {
                            from_module
                        } else {
                            !link.time_delayed
                        }
                    })
                    .map(|link| link.source)
                    .collect()
            })
            .collect();

        Self {
            graph,
            registry,
            cfg: SolverConfig::default(),
            sensors,
            outputs,
            neurons,
            modules,
            pull_deps,
        }
    }

    pub fn with_config(
        graph: Graph,
        registry: Arc<ActivatorRegistry>,
        cfg: SolverConfig,
    ) -> Result<Self> {
        cfg.validate().map_err(NetworkError::InvalidConfig)?;
        let mut net = Self::new(graph, registry);
        net.cfg = cfg;
        Ok(net)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn registry(&self) -> &ActivatorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SolverConfig {
        &self.cfg
    }

    pub fn sensors(&self) -> &[NodeId] {
        &self.sensors
    }

    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    pub fn set_execution_tier(&mut self, tier: ExecutionTier) {
        self.cfg.execution_tier = tier;
    }

    /// The tier that will actually run, honoring compile-time feature gates.
    pub fn effective_execution_tier(&self) -> ExecutionTier {
        match self.cfg.execution_tier {
            ExecutionTier::Scalar => ExecutionTier::Scalar,
            ExecutionTier::Parallel => {
                #[cfg(feature = "parallel")]
                {
                    ExecutionTier::Parallel
                }
                #[cfg(not(feature = "parallel"))]
                {
                    ExecutionTier::Scalar
                }
            }
        }
    }

    /// True once every output node has been activated since the last flush.
    pub fn outputs_on(&self) -> bool {
        let nodes = self.graph.nodes();
        self.outputs
            .iter()
            .all(|&id| nodes[id].activations_count() > 0)
    }

    /// Run forward rounds until every output is on, at most
    /// `max_activation_attempts` of them.
    pub fn activate(&mut self) -> Result<bool> {
        let limit = self.cfg.max_activation_attempts;
        for attempt in 1..=limit {
            self.forward_round()?;
            if self.outputs_on() {
                log::debug!("outputs reached after {} rounds", attempt);
                return Ok(true);
            }
        }
        log::debug!("outputs still off after {} rounds", limit);
        Err(NetworkError::ExceededMaxActivationAttempts(limit))
    }

    /// Longest sensor-to-output path, with back edges of cycles ignored.
    /// The hop from a module to the nodes it drives costs nothing.
    ///
    /// This is the number of forward rounds needed for a signal loaded into
    /// the sensors to reach the deepest output.
    pub fn max_activation_depth(&self) -> usize {
        let nodes = self.graph.nodes();
        let n = self.graph.node_count();
        let mut state = vec![Visit::Unvisited; n];
        let mut depth = vec![0usize; n];
        let mut stack: Vec<(NodeId, usize)> = Vec::new();

        for &root in &self.outputs {
            if state[root] != Visit::Unvisited {
                continue;
            }
            state[root] = Visit::InProgress;
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let (id, cursor) = *top;
                let next = self.pull_deps[id].get(cursor).copied();
                match next {
                    Some(dep) => {
                        top.1 += 1;
                        if state[dep] == Visit::Unvisited {
                            state[dep] = Visit::InProgress;
                            stack.push((dep, 0));
                        }
                    }
                    None => {
                        stack.pop();
                        // A module writes its targets in the round it fires.
                        let driven = !nodes[id].is_module();
                        depth[id] = self.pull_deps[id]
                            .iter()
                            .filter(|&&dep| state[dep] == Visit::Done)
                            .map(|&dep| {
                                if driven && nodes[dep].is_module() {
                                    depth[dep]
                                } else {
                                    depth[dep] + 1
                                }
                            })
                            .max()
                            .unwrap_or(0);
                        state[id] = Visit::Done;
                    }
                }
            }
        }

        self.outputs.iter().map(|&id| depth[id]).max().unwrap_or(0)
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let nodes = self.graph.nodes();
        let active_nodes = nodes.iter().filter(|n| n.is_active()).count();
        let avg_abs_activation = if nodes.is_empty() {
            0.0
        } else {
            nodes.iter().map(|n| libm::fabs(n.activation())).sum::<f64>() / nodes.len() as f64
        };

        Diagnostics {
            node_count: self.graph.node_count(),
            link_count: self.graph.link_count(),
            sensor_count: self.sensors.len(),
            output_count: self.outputs.len(),
            module_count: self.modules.len(),
            active_nodes,
            avg_abs_activation,
        }
    }

    /// One synchronous round. Every new value is computed from the state at
    /// the start of the round and nothing is written unless all nodes succeed.
    fn forward_round(&mut self) -> Result<()> {
        let staged = match self.effective_execution_tier() {
            ExecutionTier::Scalar => self.stage_neurons_scalar()?,
            ExecutionTier::Parallel => self.stage_neurons_parallel()?,
        };

        let mut module_writes = Vec::new();
        for &module in &self.modules {
            // A module fires only once a signal has reached it.
            if is_fed(&self.graph, module) {
                module_writes.extend(self.registry.resolve_module(&self.graph, module)?);
            }
        }

        let nodes = self.graph.nodes_mut();
        for update in &staged {
            let node = &mut nodes[update.id];
            node.activation_sum = update.sum;
            node.is_active = update.active;
            if let Some(out) = update.out {
                node.set_activation(out);
            }
        }
        for (target, value) in module_writes {
            nodes[target].set_activation(value);
            nodes[target].is_active = true;
        }

        log::trace!(
            "forward round: {} neurons, {} modules",
            staged.len(),
            self.modules.len()
        );
        Ok(())
    }

    fn stage_neurons_scalar(&self) -> Result<Vec<NeuronUpdate>> {
        self.neurons
            .iter()
            .map(|&id| evaluate_neuron(&self.graph, &self.registry, id))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn stage_neurons_parallel(&self) -> Result<Vec<NeuronUpdate>> {
        let graph = &self.graph;
        let registry: &ActivatorRegistry = &self.registry;
        self.neurons
            .par_iter()
            .map(|&id| evaluate_neuron(graph, registry, id))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn stage_neurons_parallel(&self) -> Result<Vec<NeuronUpdate>> {
        self.stage_neurons_scalar()
    }

    /// Compute and store the value of `id` during a recursive pass. Its pull
    /// dependencies are already settled or on the current path.
    fn settle(&mut self, id: NodeId) -> Result<()> {
        let node = &self.graph.nodes()[id];
        if node.is_sensor() {
            return Ok(());
        }
        if node.is_module() {
            if !is_fed(&self.graph, id) {
                return Ok(());
            }
            return self.registry.activate_module_node(&mut self.graph, id);
        }
        if self.graph.is_module_driven(id) {
            // Written by its module.
            return Ok(());
        }

        let update = evaluate_neuron(&self.graph, &self.registry, id)?;
        let node = &mut self.graph.nodes_mut()[id];
        node.activation_sum = update.sum;
        node.is_active = update.active;
        if let Some(out) = update.out {
            node.set_activation(out);
        }
        Ok(())
    }
}

/// True if any non-delayed source of `id` is a sensor or currently active.
fn is_fed(graph: &Graph, id: NodeId) -> bool {
    let nodes = graph.nodes();
    let links = graph.links();
    nodes[id].incoming().iter().any(|&l| {
        let link = &links[l];
        let source = &nodes[link.source];
        !link.time_delayed && (source.is_active() || source.is_sensor())
    })
}

fn evaluate_neuron(graph: &Graph, registry: &ActivatorRegistry, id: NodeId) -> Result<NeuronUpdate> {
    let nodes = graph.nodes();
    let links = graph.links();
    let node = &nodes[id];

    let mut sum = 0.0;
    let mut active = false;
    for &l in node.incoming() {
        let link = &links[l];
        let source = &nodes[link.source];
        if link.time_delayed {
            sum += link.weight * source.active_out_td();
        } else {
            if source.is_active() || source.is_sensor() {
                active = true;
            }
            sum += link.weight * source.active_out();
        }
    }

    let out = if active {
        Some(registry.activate(node.activation_kind, sum, &node.params)?)
    } else {
        None
    };

    Ok(NeuronUpdate {
        id,
        sum,
        active,
        out,
    })
}

impl NetworkSolver for Network {
    fn forward_steps(&mut self, steps: usize) -> Result<bool> {
        for _ in 0..steps {
            self.forward_round()?;
        }
        Ok(self.outputs_on())
    }

    fn recursive_steps(&mut self) -> Result<bool> {
        let n = self.graph.node_count();
        let bound = self.cfg.max_recursive_visits.unwrap_or(n);
        let mut state = vec![Visit::Unvisited; n];
        let mut visits = 0usize;
        let mut stack: Vec<(NodeId, usize)> = Vec::new();

        for i in 0..self.outputs.len() {
            let root = self.outputs[i];
            if state[root] != Visit::Unvisited {
                continue;
            }
            visits += 1;
            if visits > bound {
                return Err(NetworkError::ExceededMaxActivationAttempts(bound));
            }
            state[root] = Visit::InProgress;
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let (id, cursor) = *top;
                let next = self.pull_deps[id].get(cursor).copied();
                match next {
                    Some(dep) => {
                        top.1 += 1;
                        // A dependency still on the path is a cycle: it keeps
                        // its last-known value for this pass.
                        if state[dep] == Visit::Unvisited {
                            visits += 1;
                            if visits > bound {
                                return Err(NetworkError::ExceededMaxActivationAttempts(bound));
                            }
                            state[dep] = Visit::InProgress;
                            stack.push((dep, 0));
                        }
                    }
                    None => {
                        stack.pop();
                        self.settle(id)?;
                        state[id] = Visit::Done;
                    }
                }
            }
        }

        Ok(self.outputs_on())
    }

    fn relax(&mut self, max_steps: usize, max_allowed_signal_delta: f64) -> Result<bool> {
        if max_allowed_signal_delta <= 0.0 {
            return Ok(true);
        }

        // (activation, has fired, is active) per node before the round.
        let mut before: Vec<(f64, bool, bool)> = Vec::with_capacity(self.graph.node_count());
        for step in 1..=max_steps {
            before.clear();
            before.extend(
                self.graph
                    .nodes()
                    .iter()
                    .map(|n| (n.activation(), n.activations_count() > 0, n.is_active())),
            );

            self.forward_round()?;

            let mut max_delta: f64 = 0.0;
            // A node switching on is a change even when its value is unchanged.
            let mut switched = false;
            for (node, &(prev, fired, active)) in self.graph.nodes().iter().zip(&before) {
                if fired != (node.activations_count() > 0) || active != node.is_active() {
                    switched = true;
                }
                let delta = libm::fabs(node.activation() - prev);
                if delta.is_nan() {
                    max_delta = f64::INFINITY;
                } else if delta > max_delta {
                    max_delta = delta;
                }
            }

            if !switched && max_delta < max_allowed_signal_delta {
                log::debug!("relaxed after {} steps (max delta {:e})", step, max_delta);
                return Ok(true);
            }
        }

        log::debug!("not relaxed within {} steps", max_steps);
        Ok(false)
    }

    fn flush(&mut self) -> Result<bool> {
        for node in self.graph.nodes_mut() {
            node.flushback();
        }
        if let Some(node) = self.graph.nodes().iter().find(|n| !n.is_flushed()) {
            log::warn!("flush left node {} in state {}", node.id, node);
            return Err(NetworkError::FlushFailed { node: node.id });
        }
        Ok(true)
    }

    fn load_sensors(&mut self, inputs: &[f64]) -> Result<()> {
        if inputs.len() != self.sensors.len() {
            return Err(NetworkError::UnsupportedSensorsArraySize {
                expected: self.sensors.len(),
                actual: inputs.len(),
            });
        }
        let nodes = self.graph.nodes_mut();
        for (&id, &value) in self.sensors.iter().zip(inputs) {
            let loaded = nodes[id].sensor_load(value);
            debug_assert!(loaded, "node {} is not a sensor", id);
        }
        Ok(())
    }

    fn read_outputs(&self) -> Vec<f64> {
        let nodes = self.graph.nodes();
        self.outputs.iter().map(|&id| nodes[id].activation()).collect()
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn link_count(&self) -> usize {
        self.graph.link_count()
    }
}
