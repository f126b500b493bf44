//! Network (with neurons and links) structure and utilities.
//!
//! # Examples
//!
//! ```rust
//! use rusty_izh::network::Network;
//! use rusty_izh::random::RandomSource;
//!
//! let mut rng = RandomSource::new(42);
//!
//! // Create a network of 100 neurons, 20% of them being inhibitory
//! let mut network = Network::new();
//! network.resize(100, 0.2, &mut rng);
//! assert_eq!(network.size(), 100);
//!
//! // Connect them at random, with 10 outgoing links per neuron on average
//! let num_links = network.random_connect(10.0, 1.0, &mut rng).unwrap();
//! assert_eq!(network.num_links(), num_links);
//!
//! // Run a tick with no external drive
//! let firing = network.step(&vec![0.0; 100]).unwrap();
//! assert!(firing.is_empty());
//! ```
use log;
use rayon::prelude::*;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::SNNError;
use crate::neuron::{Neuron, NeuronParams, NeuronType};
use crate::random::RandomSource;
use crate::{
    EXCITATORY_LINK_SCALE, INHIBITORY_LINK_FACTOR, INHIBITORY_THALAMIC_GAIN, MIN_LINK_STRENGTH,
    MIN_NEURONS_PAR,
};

/// A network of spiking neurons connected by directed weighted links.
/// Neurons are identified by their (stable) position in the network.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Network {
    neurons: Vec<Neuron>,
    // Links keyed by (source, target), so that the outgoing links of a neuron are contiguous.
    links: BTreeMap<(usize, usize), f64>,
}

impl Network {
    /// Create a new empty network.
    pub fn new() -> Self {
        Network {
            neurons: vec![],
            links: BTreeMap::new(),
        }
    }

    /// Returns the number of neurons in the network.
    pub fn size(&self) -> usize {
        self.neurons.len()
    }

    /// Returns the number of links in the network.
    pub fn num_links(&self) -> usize {
        self.links.len()
    }

    /// Returns a reference to a specific neuron, or `None` if out of bounds.
    pub fn neuron(&self, id: usize) -> Option<&Neuron> {
        self.neurons.get(id)
    }

    /// Returns a slice of all the neurons, in index order.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons[..]
    }

    /// An iterator over all the links as `(source, target, weight)`, sorted by source then target.
    pub fn links(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.links
            .iter()
            .map(|(&(source, target), &weight)| (source, target, weight))
    }

    /// Grow the network to `n` neurons. Nothing happens if the network already has `n` neurons or more.
    /// Among the new neurons, the first `round(inhibitory_fraction * (n - size()))` are fast spiking (inhibitory),
    /// the others are regular spiking (excitatory); all of them get randomly perturbed default parameters.
    pub fn resize(&mut self, n: usize, inhibitory_fraction: f64, rng: &mut RandomSource) {
        let old_size = self.size();
        if n <= old_size {
            return;
        }

        self.neurons.resize_with(n, Neuron::default);
        let num_inhibitory = (inhibitory_fraction * (n - old_size) as f64 + 0.5) as usize;
        self.assign_default_params(&[(NeuronType::FS, num_inhibitory)], old_size, rng);

        log::debug!(
            "Network resized from {} to {} neurons ({} new inhibitory)",
            old_size,
            n,
            num_inhibitory.min(n - old_size)
        );
    }

    /// Assign types and randomly perturbed default parameters to the neurons from `start` on.
    /// The types are allotted in the provided order, the neurons left over are regular spiking.
    /// Returns an error if `start` exceeds the network size.
    pub fn set_default_params(
        &mut self,
        types: &[(NeuronType, usize)],
        start: usize,
        rng: &mut RandomSource,
    ) -> Result<(), SNNError> {
        if start > self.size() {
            return Err(SNNError::OutOfBounds(format!(
                "Start index {} exceeds the network size {}",
                start,
                self.size()
            )));
        }
        self.assign_default_params(types, start, rng);
        Ok(())
    }

    fn assign_default_params(
        &mut self,
        types: &[(NeuronType, usize)],
        start: usize,
        rng: &mut RandomSource,
    ) {
        let mut noise = vec![0.0; self.size() - start];
        rng.fill_uniform(&mut noise, 0.0, 1.0);

        let mut slots = self.neurons[start..].iter_mut().zip(noise);
        for &(neuron_type, count) in types {
            slots
                .by_ref()
                .take(count)
                .for_each(|(neuron, r)| neuron.set_default_params(neuron_type, r));
        }
        slots.for_each(|(neuron, r)| neuron.set_default_params(NeuronType::RS, r));
    }

    /// Overwrite the types and parameters of the neurons from `start` on.
    pub fn set_types_params(
        &mut self,
        types: &[NeuronType],
        params: &[NeuronParams],
        start: usize,
    ) -> Result<(), SNNError> {
        if types.len() != params.len() {
            return Err(SNNError::InvalidParameter(format!(
                "Got {} types for {} parameter sets",
                types.len(),
                params.len()
            )));
        }
        self.check_range(start, params.len())?;

        self.neurons[start..start + params.len()]
            .iter_mut()
            .zip(types.iter().zip(params.iter()))
            .for_each(|(neuron, (&neuron_type, &params))| {
                neuron.set_type(neuron_type);
                neuron.set_params(params);
            });
        Ok(())
    }

    /// Overwrite the potentials of the neurons from `start` on.
    pub fn set_values(&mut self, potentials: &[f64], start: usize) -> Result<(), SNNError> {
        self.check_range(start, potentials.len())?;

        self.neurons[start..start + potentials.len()]
            .iter_mut()
            .zip(potentials.iter())
            .for_each(|(neuron, &potential)| neuron.set_potential(potential));
        Ok(())
    }

    fn check_range(&self, start: usize, len: usize) -> Result<(), SNNError> {
        match start.checked_add(len) {
            Some(end) if end <= self.size() => Ok(()),
            _ => Err(SNNError::OutOfBounds(format!(
                "Range starting at {} with {} elements exceeds the network size {}",
                start,
                len,
                self.size()
            ))),
        }
    }

    /// Add a link from neuron `a` to neuron `b`.
    /// Links onto an inhibitory neuron are stored with weight `-2 * strength`.
    ///
    /// Returns false, leaving the network untouched, for a self-loop, an out-of-bounds neuron,
    /// a strength below [`MIN_LINK_STRENGTH`], or an already existing link.
    pub fn add_link(&mut self, a: usize, b: usize, strength: f64) -> bool {
        if a == b || a >= self.size() || b >= self.size() || !(strength >= MIN_LINK_STRENGTH) {
            return false;
        }

        match self.links.entry((a, b)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                let weight = if self.neurons[b].is_inhibitory() {
                    strength * INHIBITORY_LINK_FACTOR
                } else {
                    strength
                };
                entry.insert(weight);
                true
            }
        }
    }

    /// Replace all links by random ones and returns the number of links created.
    ///
    /// The out-degree of each neuron is Poisson distributed with mean `mean_degree`, the targets
    /// are picked without replacement (and without self-loops), and the strengths are uniform in
    /// `[MIN_LINK_STRENGTH, 2 * mean_strength)`. A neuron gets fewer links than sampled if it runs out of targets.
    ///
    /// Returns an error, leaving the existing links untouched, for a negative mean degree or a
    /// mean strength too small to produce valid links.
    pub fn random_connect(
        &mut self,
        mean_degree: f64,
        mean_strength: f64,
        rng: &mut RandomSource,
    ) -> Result<usize, SNNError> {
        let max_strength = 2.0 * mean_strength;
        if !max_strength.is_finite() || max_strength <= MIN_LINK_STRENGTH {
            return Err(SNNError::InvalidParameter(format!(
                "Mean strength must be finite and larger than {}",
                MIN_LINK_STRENGTH / 2.0
            )));
        }

        let mut degrees = vec![0; self.size()];
        rng.fill_poisson(&mut degrees, mean_degree)?;

        self.links.clear();

        let max_degree = self.size().saturating_sub(1);
        let mut node_ids: Vec<usize> = (0..self.size()).collect();
        let mut num_links = 0;
        for (source, &degree) in degrees.iter().enumerate() {
            // A neuron can never be linked to more than all the others.
            let degree = degree.min(max_degree);
            rng.shuffle(&mut node_ids);
            let mut strengths = vec![0.0; degree];
            rng.fill_uniform(&mut strengths, MIN_LINK_STRENGTH, max_strength);

            // A strength is only used up by a successful link.
            let mut num_created = 0;
            for &target in node_ids.iter() {
                if num_created >= degree {
                    break;
                }
                if self.add_link(source, target, strengths[num_created]) {
                    num_created += 1;
                }
            }
            num_links += num_created;
        }

        log::debug!(
            "Random connectivity: {} links created among {} neurons (mean degree {})",
            num_links,
            self.size(),
            mean_degree
        );
        Ok(num_links)
    }

    fn outgoing(&self, n: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.links
            .range((n, 0)..=(n, usize::MAX))
            .map(|(&(_, target), &weight)| (target, weight))
    }

    /// Returns the number of outgoing links of neuron `n` and the sum of their weights (its valence).
    pub fn degree(&self, n: usize) -> (usize, f64) {
        self.outgoing(n)
            .fold((0, 0.0), |(count, valence), (_, weight)| {
                (count + 1, valence + weight)
            })
    }

    /// Returns the outgoing links of neuron `n` as `(target, weight)` pairs.
    pub fn neighbors(&self, n: usize) -> Vec<(usize, f64)> {
        self.outgoing(n).collect()
    }

    /// Returns the potentials of all neurons, in index order.
    pub fn potentials(&self) -> Vec<f64> {
        self.neurons.iter().map(|neuron| neuron.potential()).collect()
    }

    /// Returns the recovery variables of all neurons, in index order.
    pub fn recoveries(&self) -> Vec<f64> {
        self.neurons.iter().map(|neuron| neuron.recovery()).collect()
    }

    /// The drive of neuron `i` for the current tick.
    /// Only the links towards neurons that fired this tick contribute; excitatory ones at half weight.
    fn drive(&self, i: usize, fired: &[bool], thalamic_input: f64) -> f64 {
        let (excitatory_sum, inhibitory_sum) = self
            .outgoing(i)
            .filter(|&(target, _)| fired[target])
            .fold((0.0, 0.0), |(excitatory, inhibitory), (target, weight)| {
                if self.neurons[target].is_inhibitory() {
                    (excitatory, inhibitory + weight)
                } else {
                    (excitatory + weight, inhibitory)
                }
            });

        let gain = if self.neurons[i].is_inhibitory() {
            INHIBITORY_THALAMIC_GAIN
        } else {
            1.0
        };
        gain * thalamic_input + EXCITATORY_LINK_SCALE * excitatory_sum + inhibitory_sum
    }

    /// Advance the whole network by one tick and returns the neurons that fired.
    ///
    /// 1. Every neuron whose state is at the spike peak fires and is reset.
    /// 2. Every neuron receives its thalamic input plus the weights of its links towards the neurons that just fired.
    /// 3. Every neuron integrates its input.
    ///
    /// All firing tests happen before any input is delivered, and all inputs are delivered before any integration.
    /// Returns an error, without touching the network, if `thalamic_input` does not have one entry per neuron.
    pub fn step(&mut self, thalamic_input: &[f64]) -> Result<BTreeSet<usize>, SNNError> {
        if thalamic_input.len() != self.size() {
            return Err(SNNError::InvalidParameter(format!(
                "Thalamic input has {} entries for {} neurons",
                thalamic_input.len(),
                self.size()
            )));
        }

        let mut firing = BTreeSet::new();
        let mut fired = vec![false; self.size()];
        for (i, neuron) in self.neurons.iter_mut().enumerate() {
            if neuron.firing() {
                firing.insert(i);
                fired[i] = true;
                neuron.reset();
            }
        }

        let drives: Vec<f64> = if self.size() >= MIN_NEURONS_PAR {
            (0..self.size())
                .into_par_iter()
                .map(|i| self.drive(i, &fired, thalamic_input[i]))
                .collect()
        } else {
            (0..self.size())
                .map(|i| self.drive(i, &fired, thalamic_input[i]))
                .collect()
        };

        self.neurons
            .iter_mut()
            .zip(drives)
            .for_each(|(neuron, drive)| neuron.input(drive));

        if self.size() >= MIN_NEURONS_PAR {
            self.neurons.par_iter_mut().for_each(|neuron| neuron.step());
        } else {
            self.neurons.iter_mut().for_each(|neuron| neuron.step());
        }

        log::trace!("{} neurons fired", firing.len());
        Ok(firing)
    }
}
