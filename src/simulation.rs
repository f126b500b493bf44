//! Simulation configuration and tick-by-tick driver.
//!
//! # Examples
//!
//! ```rust
//! use rusty_izh::simulation::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     seed: 42,
//!     num_neurons: 50,
//!     num_ticks: 20,
//!     ..SimulationConfig::default()
//! };
//! let mut simulation = Simulation::build(config).unwrap();
//!
//! let mut trajectory = Vec::new();
//! let firing_counts = simulation.run(&mut trajectory).unwrap();
//! assert_eq!(firing_counts.len(), 20);
//! ```
use log;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use crate::error::SNNError;
use crate::network::Network;
use crate::neuron::NeuronType;
use crate::random::RandomSource;
use crate::MIN_LINK_STRENGTH;

/// Number of ticks between two progress logs.
const LOG_INTERVAL: usize = 100;

/// The parameters of a simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed of the random source, 0 to draw one from the system entropy.
    pub seed: u64,
    /// Number of neurons in the network.
    pub num_neurons: usize,
    /// Fraction of fast spiking (inhibitory) neurons.
    pub inhibitory_fraction: f64,
    /// Mean number of outgoing links per neuron.
    pub mean_degree: f64,
    /// Mean link strength.
    pub mean_strength: f64,
    /// Number of ticks to simulate.
    pub num_ticks: usize,
    /// Standard deviation of the (zero-mean, normal) thalamic input.
    pub thalamic_sd: f64,
    /// Optional explicit allotment of neuron types, as `(name, count)` pairs applied in order.
    pub types: Vec<(String, usize)>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            seed: 0,
            num_neurons: 1000,
            inhibitory_fraction: 0.2,
            mean_degree: 40.0,
            mean_strength: 2.0,
            num_ticks: 1000,
            thalamic_sd: 5.0,
            types: vec![],
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a JSON file. Missing fields take their default value.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let file = File::open(path).map_err(|e| SNNError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SNNError::IOError(e.to_string()))
    }

    /// Check the configuration describes a valid simulation.
    pub fn validate(&self) -> Result<(), SNNError> {
        if !(0.0..=1.0).contains(&self.inhibitory_fraction) {
            return Err(SNNError::InvalidParameter(
                "Inhibitory fraction must be in [0, 1]".to_string(),
            ));
        }
        if !self.mean_degree.is_finite() || self.mean_degree < 0.0 {
            return Err(SNNError::InvalidParameter(
                "Mean degree must be finite and non-negative".to_string(),
            ));
        }
        if !self.mean_strength.is_finite() || 2.0 * self.mean_strength <= MIN_LINK_STRENGTH {
            return Err(SNNError::InvalidParameter(format!(
                "Mean strength must be finite and larger than {}",
                MIN_LINK_STRENGTH / 2.0
            )));
        }
        if !self.thalamic_sd.is_finite() || self.thalamic_sd < 0.0 {
            return Err(SNNError::InvalidParameter(
                "Thalamic standard deviation must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// The typed allotment of neuron types.
    /// Unknown type names are skipped, so that their neurons fall back to regular spiking.
    pub fn type_counts(&self) -> Vec<(NeuronType, usize)> {
        self.types
            .iter()
            .filter_map(|(name, count)| match name.parse::<NeuronType>() {
                Ok(neuron_type) => Some((neuron_type, *count)),
                Err(_) => {
                    log::warn!("Unknown neuron type {}: its {} neurons default to RS", name, count);
                    None
                }
            })
            .collect()
    }
}

/// A network together with the random source driving it.
pub struct Simulation {
    config: SimulationConfig,
    network: Network,
    rng: RandomSource,
    // The type allotment used to pick the traced neurons.
    type_counts: Vec<(NeuronType, usize)>,
}

impl Simulation {
    /// Build a randomly connected network as described by the configuration.
    pub fn build(config: SimulationConfig) -> Result<Self, SNNError> {
        config.validate()?;

        let mut rng = RandomSource::new(config.seed);
        log::info!("Random source seeded with {}", rng.seed());

        let mut network = Network::new();
        let mut type_counts = config.type_counts();
        if config.types.is_empty() {
            network.resize(config.num_neurons, config.inhibitory_fraction, &mut rng);
            let num_inhibitory =
                (config.inhibitory_fraction * config.num_neurons as f64 + 0.5) as usize;
            type_counts.push((NeuronType::FS, num_inhibitory));
        } else {
            // The explicit allotment overwrites every type and draws its own noise batch,
            // the batch drawn by the resize is discarded.
            network.resize(config.num_neurons, 0.0, &mut rng);
            network.set_default_params(&type_counts, 0, &mut rng)?;
        }

        let num_links = network.random_connect(config.mean_degree, config.mean_strength, &mut rng)?;
        log::info!(
            "Network built: {} neurons and {} links",
            network.size(),
            num_links
        );

        Ok(Simulation {
            config,
            network,
            rng,
            type_counts,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// The type allotment used to pick the traced neurons.
    pub fn type_counts(&self) -> &[(NeuronType, usize)] {
        &self.type_counts
    }

    /// Run the configured number of ticks, writing the trajectory table to `out`.
    /// Returns the number of neurons that fired at each tick.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<Vec<usize>, SNNError> {
        log::info!("Starting simulation of {} ticks...", self.config.num_ticks);
        self.network.write_header(&self.type_counts, out)?;

        let mut thalamic_input = vec![0.0; self.network.size()];
        let mut firing_counts = Vec::with_capacity(self.config.num_ticks);
        for tick in 0..self.config.num_ticks {
            self.rng
                .fill_normal(&mut thalamic_input, 0.0, self.config.thalamic_sd)?;
            let firing = self.network.step(&thalamic_input)?;
            firing_counts.push(firing.len());
            self.network.write_traj(tick, &self.type_counts, out)?;

            if (tick + 1) % LOG_INTERVAL == 0 {
                log::debug!(
                    "Simulation progress: {}/{} ticks ({} neurons fired at the last one)",
                    tick + 1,
                    self.config.num_ticks,
                    firing.len()
                );
            }
        }

        log::info!(
            "Simulation completed successfully! {} spikes in total",
            firing_counts.iter().sum::<usize>()
        );
        Ok(firing_counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            seed: 42,
            num_neurons: 40,
            mean_degree: 5.0,
            num_ticks: 50,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_validate() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));

        let invalid = [
            SimulationConfig {
                inhibitory_fraction: 1.5,
                ..small_config()
            },
            SimulationConfig {
                mean_degree: -2.0,
                ..small_config()
            },
            SimulationConfig {
                mean_strength: 0.0,
                ..small_config()
            },
            SimulationConfig {
                thalamic_sd: f64::NAN,
                ..small_config()
            },
        ];
        for config in invalid {
            assert!(matches!(
                config.validate(),
                Err(SNNError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_type_counts() {
        let config = SimulationConfig {
            types: vec![
                ("FS".to_string(), 5),
                ("XX".to_string(), 3),
                ("CH".to_string(), 2),
            ],
            ..small_config()
        };
        assert_eq!(
            config.type_counts(),
            vec![(NeuronType::FS, 5), (NeuronType::CH, 2)]
        );
    }

    #[test]
    fn test_build_with_types() {
        let config = SimulationConfig {
            types: vec![("LTS".to_string(), 3), ("XX".to_string(), 4), ("IB".to_string(), 2)],
            ..small_config()
        };
        let simulation = Simulation::build(config).unwrap();
        let types: Vec<NeuronType> = simulation
            .network()
            .neurons()
            .iter()
            .map(|n| n.neuron_type())
            .collect();
        assert_eq!(types[..3], [NeuronType::LTS; 3]);
        // The unknown allotment is skipped
        assert_eq!(types[3..5], [NeuronType::IB; 2]);
        assert!(types[5..].iter().all(|&t| t == NeuronType::RS));
    }

    #[test]
    fn test_build_with_types_draws() {
        let config = SimulationConfig {
            types: vec![("TC".to_string(), 6), ("FS".to_string(), 10)],
            ..small_config()
        };
        let simulation = Simulation::build(config.clone()).unwrap();

        // One discarded batch from the resize, then the batch of the allotment
        let mut rng = RandomSource::new(config.seed);
        let mut network = Network::new();
        network.resize(config.num_neurons, 0.0, &mut rng);
        network
            .set_default_params(&config.type_counts(), 0, &mut rng)
            .unwrap();
        network
            .random_connect(config.mean_degree, config.mean_strength, &mut rng)
            .unwrap();
        assert_eq!(simulation.network(), &network);
    }

    #[test]
    fn test_unknown_types_traced_as_regular_spiking() {
        let config = SimulationConfig {
            num_neurons: 4,
            num_ticks: 1,
            types: vec![("XX".to_string(), 4)],
            ..small_config()
        };
        let mut simulation = Simulation::build(config).unwrap();
        assert!(simulation.type_counts().is_empty());
        assert!(simulation
            .network()
            .neurons()
            .iter()
            .all(|n| n.is_type(NeuronType::RS)));

        let mut buffer = Vec::new();
        simulation.run(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("t\tRS.v\tRS.u\tRS.I\n"));
    }

    #[test]
    fn test_build_default_types() {
        let simulation = Simulation::build(small_config()).unwrap();
        assert_eq!(simulation.type_counts(), &[(NeuronType::FS, 8)]);
        assert_eq!(
            simulation
                .network()
                .neurons()
                .iter()
                .filter(|n| n.is_inhibitory())
                .count(),
            8
        );
        assert!(simulation.network().num_links() > 0);
    }

    #[test]
    fn test_run() {
        let mut simulation = Simulation::build(small_config()).unwrap();
        let mut buffer = Vec::new();
        let firing_counts = simulation.run(&mut buffer).unwrap();

        assert_eq!(firing_counts.len(), 50);
        assert!(firing_counts.iter().all(|&count| count <= 40));

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 51);
        assert_eq!(lines[0], "t\tFS.v\tFS.u\tFS.I\tRS.v\tRS.u\tRS.I");
        assert!(lines[50].starts_with("49\t"));
    }

    #[test]
    fn test_run_determinism() {
        let run = || {
            let mut simulation = Simulation::build(small_config()).unwrap();
            let mut buffer = Vec::new();
            let firing_counts = simulation.run(&mut buffer).unwrap();
            (firing_counts, buffer)
        };
        assert_eq!(run(), run());
    }
}
