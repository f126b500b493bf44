use std::io::Write;
use tempfile::NamedTempFile;

use rusty_izh::error::SNNError;
use rusty_izh::neuron::NeuronType;
use rusty_izh::simulation::{Simulation, SimulationConfig};

#[test]
fn test_load_config() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"seed": 7, "num_neurons": 30, "num_ticks": 10, "types": [["FS", 4], ["TC", 2]]}}"#
    )
    .unwrap();

    let config = SimulationConfig::load_from(file.path()).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.num_neurons, 30);
    assert_eq!(config.num_ticks, 10);
    // Missing fields take their default value
    assert_eq!(config.mean_degree, SimulationConfig::default().mean_degree);
    assert_eq!(
        config.type_counts(),
        vec![(NeuronType::FS, 4), (NeuronType::TC, 2)]
    );

    let mut simulation = Simulation::build(config).unwrap();
    let mut buffer = Vec::new();
    let firing_counts = simulation.run(&mut buffer).unwrap();
    assert_eq!(firing_counts.len(), 10);

    let output = String::from_utf8(buffer).unwrap();
    assert!(output.starts_with("t\tFS.v\tFS.u\tFS.I\tTC.v\tTC.u\tTC.I\tRS.v\tRS.u\tRS.I\n"));
}

#[test]
fn test_load_config_errors() {
    assert!(matches!(
        SimulationConfig::load_from("does/not/exist.json"),
        Err(SNNError::IOError(_))
    ));

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    assert!(matches!(
        SimulationConfig::load_from(file.path()),
        Err(SNNError::IOError(_))
    ));
}

#[test]
fn test_invalid_config() {
    let config = SimulationConfig {
        seed: 1,
        num_neurons: 10,
        mean_strength: -1.0,
        ..SimulationConfig::default()
    };
    assert!(matches!(
        Simulation::build(config),
        Err(SNNError::InvalidParameter(_))
    ));
}

#[test]
fn test_parameter_table() {
    let config = SimulationConfig {
        seed: 3,
        num_neurons: 25,
        num_ticks: 0,
        ..SimulationConfig::default()
    };
    let simulation = Simulation::build(config).unwrap();

    let mut buffer = Vec::new();
    simulation.network().write_params(&mut buffer).unwrap();
    let output = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 26);

    for (id, line) in lines[1..].iter().enumerate() {
        let fields: Vec<&str> = line.split('\t').collect();
        let (degree, _) = simulation.network().degree(id);
        assert_eq!(fields[6], degree.to_string());
    }
}
