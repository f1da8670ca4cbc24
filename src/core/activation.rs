//! Activation kinds and the built-in numeric function library.
//!
//! All transcendental math goes through `libm` so that evolved genomes produce
//! the same outputs on every target, with or without `std`.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar activation: `(accumulated input, auxiliary params) -> output`.
pub type ScalarActivation = fn(f64, &[f64]) -> f64;

/// Module activation: `(input vector, auxiliary params) -> output vector`.
pub type ModuleActivation = fn(&[f64], &[f64]) -> Vec<f64>;

/// Identifies the activation function attached to a node.
///
/// Discriminants are stable and start at 1; genomes store them as bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ActivationKind {
    SigmoidPlain = 1,
    SigmoidReduced,
    SigmoidBipolar,
    SigmoidSteepened,
    SigmoidApproximation,
    SigmoidSteepenedApproximation,
    SigmoidInverseAbsolute,
    SigmoidLeftShifted,
    SigmoidLeftShiftedSteepened,
    SigmoidRightShiftedSteepened,

    Tanh,
    GaussianBipolar,
    Linear,
    LinearAbs,
    LinearClipped,
    Null,
    Sign,
    Sine,
    Step,

    /// Product of all inputs.
    MultiplyModule,
    /// Maximum of all inputs.
    MaxModule,
    /// Minimum of all inputs.
    MinModule,
}

impl ActivationKind {
    /// Every built-in kind, in discriminant order.
    pub const ALL: [Self; 22] = [
        Self::SigmoidPlain,
        Self::SigmoidReduced,
        Self::SigmoidBipolar,
        Self::SigmoidSteepened,
        Self::SigmoidApproximation,
        Self::SigmoidSteepenedApproximation,
        Self::SigmoidInverseAbsolute,
        Self::SigmoidLeftShifted,
        Self::SigmoidLeftShiftedSteepened,
        Self::SigmoidRightShiftedSteepened,
        Self::Tanh,
        Self::GaussianBipolar,
        Self::Linear,
        Self::LinearAbs,
        Self::LinearClipped,
        Self::Null,
        Self::Sign,
        Self::Sine,
        Self::Step,
        Self::MultiplyModule,
        Self::MaxModule,
        Self::MinModule,
    ];

    /// True for multi-input/multi-output module functions.
    #[inline]
    pub fn is_module(self) -> bool {
        matches!(
            self,
            Self::MultiplyModule | Self::MaxModule | Self::MinModule
        )
    }

    /// Raw byte identifier.
    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Decode a raw byte identifier. Returns `None` for unknown bytes.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.id())
    }
}

/// The built-in functions registered by `ActivatorRegistry::new`.
pub mod functions {
    #[cfg(not(feature = "std"))]
    use alloc::{vec, vec::Vec};

    const STEEPNESS: f64 = 4.924273;
    const SHIFT: f64 = 2.4621365;

    pub fn plain_sigmoid(input: f64, _aux: &[f64]) -> f64 {
        1.0 / (1.0 + libm::exp(-input))
    }

    pub fn reduced_sigmoid(input: f64, _aux: &[f64]) -> f64 {
        1.0 / (1.0 + libm::exp(-0.5 * input))
    }

    pub fn steepened_sigmoid(input: f64, _aux: &[f64]) -> f64 {
        1.0 / (1.0 + libm::exp(-STEEPNESS * input))
    }

    /// x in [-1,1] maps onto y in [-1,1].
    pub fn bipolar_sigmoid(input: f64, _aux: &[f64]) -> f64 {
        (2.0 / (1.0 + libm::exp(-STEEPNESS * input))) - 1.0
    }

    /// Quadratic approximation, squashing range [-4, 4].
    pub fn approximation_sigmoid(input: f64, _aux: &[f64]) -> f64 {
        let four = 4.0;
        let one_32nd = 0.03125;
        if input < -4.0 {
            0.0
        } else if input < 0.0 {
            (input + four) * (input + four) * one_32nd
        } else if input < 4.0 {
            1.0 - (input - four) * (input - four) * one_32nd
        } else {
            1.0
        }
    }

    /// Quadratic approximation, squashing range [-1, 1].
    pub fn approximation_steepened_sigmoid(input: f64, _aux: &[f64]) -> f64 {
        let one = 1.0;
        let one_half = 0.5;
        if input < -1.0 {
            0.0
        } else if input < 0.0 {
            (input + one) * (input + one) * one_half
        } else if input < 1.0 {
            1.0 - (input - one) * (input - one) * one_half
        } else {
            1.0
        }
    }

    pub fn inverse_absolute_sigmoid(input: f64, _aux: &[f64]) -> f64 {
        0.5 + (input / (1.0 + libm::fabs(input))) * 0.5
    }

    pub fn left_shifted_sigmoid(input: f64, _aux: &[f64]) -> f64 {
        1.0 / (1.0 + libm::exp(-input - SHIFT))
    }

    pub fn left_shifted_steepened_sigmoid(input: f64, _aux: &[f64]) -> f64 {
        1.0 / (1.0 + libm::exp(-(STEEPNESS * input + SHIFT)))
    }

    pub fn right_shifted_steepened_sigmoid(input: f64, _aux: &[f64]) -> f64 {
        1.0 / (1.0 + libm::exp(-(STEEPNESS * input - SHIFT)))
    }

    pub fn hyperbolic_tangent(input: f64, _aux: &[f64]) -> f64 {
        libm::tanh(0.9 * input)
    }

    pub fn bipolar_gaussian(input: f64, _aux: &[f64]) -> f64 {
        let scaled = input * 2.5;
        2.0 * libm::exp(-(scaled * scaled)) - 1.0
    }

    pub fn linear(input: f64, _aux: &[f64]) -> f64 {
        input
    }

    pub fn absolute_linear(input: f64, _aux: &[f64]) -> f64 {
        libm::fabs(input)
    }

    /// Linear between -1 and 1, clipped outside.
    pub fn clipped_linear(input: f64, _aux: &[f64]) -> f64 {
        if input < -1.0 {
            return -1.0;
        }
        if input > 1.0 {
            return 1.0;
        }
        input
    }

    pub fn null(_input: f64, _aux: &[f64]) -> f64 {
        0.0
    }

    pub fn sign(input: f64, _aux: &[f64]) -> f64 {
        if input.is_nan() || input == 0.0 {
            0.0
        } else if input.is_sign_negative() {
            -1.0
        } else {
            1.0
        }
    }

    /// Sine with doubled frequency.
    pub fn sine(input: f64, _aux: &[f64]) -> f64 {
        libm::sin(2.0 * input)
    }

    /// Sign-bit step: `-0.0` maps to 0, `+0.0` maps to 1.
    pub fn step(input: f64, _aux: &[f64]) -> f64 {
        if input.is_sign_negative() {
            0.0
        } else {
            1.0
        }
    }

    pub fn multiply_module(inputs: &[f64], _aux: &[f64]) -> Vec<f64> {
        vec![inputs.iter().product()]
    }

    /// Seeded with `i64::MIN as f64`, so an empty input yields that value.
    /// A NaN input propagates.
    pub fn max_module(inputs: &[f64], _aux: &[f64]) -> Vec<f64> {
        let mut max = i64::MIN as f64;
        for &v in inputs {
            max = nan_max(max, v);
        }
        vec![max]
    }

    /// Seeded with `f64::MAX`, so an empty input yields that value.
    /// A NaN input propagates.
    pub fn min_module(inputs: &[f64], _aux: &[f64]) -> Vec<f64> {
        let mut min = f64::MAX;
        for &v in inputs {
            min = nan_min(min, v);
        }
        vec![min]
    }

    // f64::max/min drop NaN; these keep it and order signed zeros.
    fn nan_max(a: f64, b: f64) -> f64 {
        if a.is_nan() || b.is_nan() {
            f64::NAN
        } else if a == b && a == 0.0 {
            if a.is_sign_negative() {
                b
            } else {
                a
            }
        } else if a > b {
            a
        } else {
            b
        }
    }

    fn nan_min(a: f64, b: f64) -> f64 {
        if a.is_nan() || b.is_nan() {
            f64::NAN
        } else if a == b && a == 0.0 {
            if a.is_sign_negative() {
                a
            } else {
                b
            }
        } else if a < b {
            a
        } else {
            b
        }
    }
}
