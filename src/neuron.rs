//! This module provides the `Neuron` structure which composes the `Network` structure.
//!
//! Neurons follow the [Izhikevich model](https://www.izhikevich.org/publications/spikes.htm):
//! ```text
//! dv/dt = 0.04 v² + 5 v + 140 - u + I
//! du/dt = a (b v - u)
//! if v >= 30: v <- c, u <- u + d
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SNNError;
use crate::FIRING_THRESHOLD;

/// The resting potential of a freshly created neuron.
pub const RESTING_POTENTIAL: f64 = -65.0;

/// The firing patterns supported by the network.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum NeuronType {
    /// Regular spiking, the default excitatory type.
    RS,
    /// Intrinsically bursting.
    IB,
    /// Chattering.
    CH,
    /// Fast spiking, the default inhibitory type.
    FS,
    /// Thalamo-cortical.
    TC,
    /// Resonator.
    RZ,
    /// Low-threshold spiking.
    LTS,
}

impl NeuronType {
    /// All the neuron types, in declaration order.
    pub const ALL: [NeuronType; 7] = [
        NeuronType::RS,
        NeuronType::IB,
        NeuronType::CH,
        NeuronType::FS,
        NeuronType::TC,
        NeuronType::RZ,
        NeuronType::LTS,
    ];

    /// Returns the nominal `(a, b, c, d)` parameters of the type.
    pub fn default_params(&self) -> NeuronParams {
        let (a, b, c, d) = match self {
            NeuronType::RS => (0.02, 0.2, -65.0, 8.0),
            NeuronType::IB => (0.02, 0.2, -55.0, 4.0),
            NeuronType::CH => (0.02, 0.2, -50.0, 2.0),
            NeuronType::FS => (0.1, 0.2, -65.0, 2.0),
            NeuronType::TC => (0.02, 0.25, -65.0, 0.05),
            NeuronType::RZ => (0.1, 0.26, -65.0, 2.0),
            NeuronType::LTS => (0.02, 0.25, -65.0, 2.0),
        };
        NeuronParams { a, b, c, d }
    }

    /// Returns true if neurons of this type dampen downstream activity.
    pub fn is_inhibitory(&self) -> bool {
        matches!(self, NeuronType::FS | NeuronType::LTS)
    }

    /// Returns true if a type with the provided name exists.
    pub fn exists(name: &str) -> bool {
        name.parse::<NeuronType>().is_ok()
    }
}

impl fmt::Display for NeuronType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NeuronType::RS => "RS",
            NeuronType::IB => "IB",
            NeuronType::CH => "CH",
            NeuronType::FS => "FS",
            NeuronType::TC => "TC",
            NeuronType::RZ => "RZ",
            NeuronType::LTS => "LTS",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for NeuronType {
    type Err = SNNError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NeuronType::ALL
            .into_iter()
            .find(|neuron_type| neuron_type.to_string() == s)
            .ok_or_else(|| SNNError::InvalidParameter(format!("Unknown neuron type: {}", s)))
    }
}

/// The kinetic constants of a neuron.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct NeuronParams {
    /// Time scale of the recovery variable.
    pub a: f64,
    /// Sensitivity of the recovery variable to the potential.
    pub b: f64,
    /// After-spike reset value of the potential.
    pub c: f64,
    /// After-spike increment of the recovery variable.
    pub d: f64,
}

/// Represents a spiking neuron.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Neuron {
    // The type of the neuron.
    neuron_type: NeuronType,
    // The kinetic constants of the neuron.
    params: NeuronParams,
    // The membrane potential (v).
    potential: f64,
    // The recovery variable (u).
    recovery: f64,
    // The input accumulated since the last step.
    pending_input: f64,
    // The input applied during the last step.
    current: f64,
}

impl Default for Neuron {
    fn default() -> Self {
        Neuron::new(NeuronType::RS)
    }
}

impl Neuron {
    /// Create a new neuron at rest with the nominal parameters of its type.
    pub fn new(neuron_type: NeuronType) -> Self {
        let params = neuron_type.default_params();
        Neuron {
            neuron_type,
            params,
            potential: RESTING_POTENTIAL,
            recovery: params.b * RESTING_POTENTIAL,
            pending_input: 0.0,
            current: 0.0,
        }
    }

    /// Returns true if the neuron state is at or above the spike peak.
    pub fn firing(&self) -> bool {
        self.potential >= FIRING_THRESHOLD
    }

    /// Apply the after-spike reset.
    pub fn reset(&mut self) {
        self.potential = self.params.c;
        self.recovery += self.params.d;
    }

    /// Accumulate some drive, applied on the next step.
    pub fn input(&mut self, value: f64) {
        self.pending_input += value;
    }

    /// Advance the neuron state by one tick (1 ms), using the accumulated input.
    /// The potential is integrated in two half steps for numerical stability.
    pub fn step(&mut self) {
        let current = self.pending_input;
        for _ in 0..2 {
            self.potential += 0.5
                * (0.04 * self.potential * self.potential + 5.0 * self.potential + 140.0
                    - self.recovery
                    + current);
        }
        self.recovery += self.params.a * (self.params.b * self.potential - self.recovery);
        self.current = current;
        self.pending_input = 0.0;
    }

    /// Returns the membrane potential.
    pub fn potential(&self) -> f64 {
        self.potential
    }

    /// Set the membrane potential.
    pub fn set_potential(&mut self, potential: f64) {
        self.potential = potential;
    }

    /// Returns the recovery variable.
    pub fn recovery(&self) -> f64 {
        self.recovery
    }

    /// Returns the input applied during the last step.
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn neuron_type(&self) -> NeuronType {
        self.neuron_type
    }

    pub fn params(&self) -> &NeuronParams {
        &self.params
    }

    pub fn is_inhibitory(&self) -> bool {
        self.neuron_type.is_inhibitory()
    }

    pub fn is_type(&self, neuron_type: NeuronType) -> bool {
        self.neuron_type == neuron_type
    }

    /// Set the neuron type, keeping the current parameters.
    pub fn set_type(&mut self, neuron_type: NeuronType) {
        self.neuron_type = neuron_type;
    }

    pub fn set_params(&mut self, params: NeuronParams) {
        self.params = params;
    }

    /// Set the type and its nominal parameters, perturbed by `noise` in `[0, 1)`.
    /// Excitatory neurons get heterogeneous reset constants, inhibitory ones heterogeneous kinetics.
    /// The recovery variable is re-initialized at `b * v`.
    pub fn set_default_params(&mut self, neuron_type: NeuronType, noise: f64) {
        let mut params = neuron_type.default_params();
        if neuron_type.is_inhibitory() {
            params.a *= 1.0 - 0.8 * noise;
            params.b *= 1.0 + 0.25 * noise;
        } else {
            params.c += 15.0 * noise * noise;
            params.d -= 0.75 * params.d * noise * noise;
        }
        self.neuron_type = neuron_type;
        self.params = params;
        self.recovery = params.b * self.potential;
    }

    /// Tab-separated type, parameters and inhibitory flag.
    pub fn formatted_params(&self) -> String {
        format!(
            "{}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{}",
            self.neuron_type,
            self.params.a,
            self.params.b,
            self.params.c,
            self.params.d,
            self.is_inhibitory()
        )
    }

    /// Tab-separated potential, recovery and last applied input.
    pub fn formatted_values(&self) -> String {
        format!(
            "{:.4}\t{:.4}\t{:.4}",
            self.potential, self.recovery, self.current
        )
    }
}
