// no_std support
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::Result;

/// Behavioral contract of a network that can run activation waves.
///
/// The expected call sequence per evaluation is
/// `flush` (optional on a fresh network) → `load_sensors` → one of the
/// propagation methods → `read_outputs`. Implementations are synchronous and
/// mutate node state in place, so a single instance must not be driven from
/// several threads at once.
pub trait NetworkSolver {
    /// Run exactly `steps` synchronous propagation rounds.
    ///
    /// Returns `Ok(true)` if every output node has been activated since the
    /// last flush, `Ok(false)` if the rounds were not enough to reach them.
    fn forward_steps(&mut self, steps: usize) -> Result<bool>;

    /// Pull values from every output back towards the sensors in one pass.
    ///
    /// Returns `Ok(true)` if every output node received a value.
    fn recursive_steps(&mut self) -> Result<bool>;

    /// Run single forward rounds until the largest per-node change drops
    /// strictly below `max_allowed_signal_delta`, at most `max_steps` times.
    ///
    /// A delta `<= 0` disables the check: returns `Ok(true)` without
    /// propagating anything.
    fn relax(&mut self, max_steps: usize, max_allowed_signal_delta: f64) -> Result<bool>;

    /// Reset all activation state to zero.
    fn flush(&mut self) -> Result<bool>;

    /// Load one value per sensor node, in sensor order.
    fn load_sensors(&mut self, inputs: &[f64]) -> Result<()>;

    /// Current output of each output node, in output order.
    fn read_outputs(&self) -> Vec<f64>;

    fn node_count(&self) -> usize;

    fn link_count(&self) -> usize;
}
