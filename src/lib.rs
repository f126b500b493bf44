//! This crate provides tools for simulating randomly connected networks of Izhikevich spiking neurons in discrete time.
//!
//! # Creating Networks
//!
//! ## From Scratch
//!
//! ```rust
//! use rusty_izh::network::Network;
//! use rusty_izh::random::RandomSource;
//!
//! // Init a network with 3 excitatory neurons
//! let mut rng = RandomSource::new(42);
//! let mut network = Network::new();
//! network.resize(3, 0.0, &mut rng);
//!
//! // Add links to the network
//! assert!(network.add_link(0, 1, 2.0));
//! assert!(network.add_link(1, 2, 3.0));
//!
//! // Self-loops and duplicate links are rejected
//! assert!(!network.add_link(2, 2, 1.0));
//! assert!(!network.add_link(0, 1, 1.0));
//!
//! assert_eq!(network.num_links(), 2);
//! assert_eq!(network.degree(0), (1, 2.0));
//! ```
//!
//! ## At Random
//!
//! ```rust
//! use rusty_izh::network::Network;
//! use rusty_izh::random::RandomSource;
//!
//! // Create a network of 277 neurons, 20% inhibitory, with 10 outgoing links per neuron on average
//! let mut rng = RandomSource::new(42);
//! let mut network = Network::new();
//! network.resize(277, 0.2, &mut rng);
//! let num_links = network.random_connect(10.0, 0.5, &mut rng).unwrap();
//!
//! assert_eq!(network.size(), 277);
//! assert_eq!(network.num_links(), num_links);
//! ```
//!
//! # Simulating Networks
//!
//! ```rust
//! use rusty_izh::network::Network;
//! use rusty_izh::random::RandomSource;
//!
//! let mut rng = RandomSource::new(42);
//! let mut network = Network::new();
//! network.resize(100, 0.2, &mut rng);
//! network.random_connect(10.0, 0.5, &mut rng).unwrap();
//!
//! let mut thalamic_input = vec![0.0; 100];
//! for _ in 0..100 {
//!     rng.fill_normal(&mut thalamic_input, 0.0, 5.0).unwrap();
//!     let firing = network.step(&thalamic_input).unwrap();
//!     assert!(firing.iter().all(|&id| id < 100));
//! }
//! ```

pub mod error;
pub mod network;
pub mod neuron;
pub mod random;
pub mod report;
pub mod simulation;

/// The potential at which a neuron fires (the spike peak).
pub const FIRING_THRESHOLD: f64 = 30.0;
/// The minimum strength of a link.
pub const MIN_LINK_STRENGTH: f64 = 1e-6;
/// The factor applied to the strength of a link onto an inhibitory neuron.
pub const INHIBITORY_LINK_FACTOR: f64 = -2.0;
/// The scale of the contributions of excitatory firing neurons to the drive.
pub const EXCITATORY_LINK_SCALE: f64 = 0.5;
/// The gain of the thalamic input on inhibitory neurons.
pub const INHIBITORY_THALAMIC_GAIN: f64 = 0.4;
/// Minimum number of neurons to parallelize the computation.
pub const MIN_NEURONS_PAR: usize = 100;
