//! Tab-separated diagnostic tables of the network parameters and trajectories.
use itertools::Itertools;
use std::io::Write;

use crate::error::SNNError;
use crate::network::Network;
use crate::neuron::{Neuron, NeuronType};

impl Network {
    /// Write one row per neuron with its type, parameters, inhibitory flag, degree and valence.
    pub fn write_params<W: Write>(&self, out: &mut W) -> Result<(), SNNError> {
        writeln!(out, "Type\ta\tb\tc\td\tInhibitory\tdegree\tvalence")?;
        for (id, neuron) in self.neurons().iter().enumerate() {
            let (degree, valence) = self.degree(id);
            writeln!(out, "{}\t{}\t{}", neuron.formatted_params(), degree, valence)?;
        }
        Ok(())
    }

    /// Write the header of the trajectory table, with a `.v/.u/.I` column group per traced type.
    pub fn write_header<W: Write>(
        &self,
        counts: &[(NeuronType, usize)],
        out: &mut W,
    ) -> Result<(), SNNError> {
        let columns = self
            .traced_neurons(counts)
            .into_iter()
            .map(|neuron| {
                let name = neuron.neuron_type();
                format!("{0}.v\t{0}.u\t{0}.I", name)
            })
            .join("\t");
        write_row(out, "t", &columns)
    }

    /// Write one row of the trajectory table: the state of the first neuron of each traced type.
    pub fn write_traj<W: Write>(
        &self,
        time: usize,
        counts: &[(NeuronType, usize)],
        out: &mut W,
    ) -> Result<(), SNNError> {
        let values = self
            .traced_neurons(counts)
            .into_iter()
            .map(|neuron| neuron.formatted_values())
            .join("\t");
        write_row(out, &time.to_string(), &values)
    }

    /// The first neuron of each listed type present in the network, followed by the first
    /// regular spiking neuron when the counts do not cover the whole network.
    fn traced_neurons(&self, counts: &[(NeuronType, usize)]) -> Vec<&Neuron> {
        let neurons = self.neurons();
        let first_of = move |neuron_type: NeuronType| {
            neurons.iter().find(|neuron| neuron.is_type(neuron_type))
        };

        let mut traced: Vec<&Neuron> = counts
            .iter()
            .filter_map(|&(neuron_type, _)| first_of(neuron_type))
            .collect();

        let total: usize = counts.iter().map(|&(_, count)| count).sum();
        if total < self.size() {
            traced.extend(first_of(NeuronType::RS));
        }
        traced
    }
}

// The row key, followed by the traced columns if any.
fn write_row<W: Write>(out: &mut W, key: &str, columns: &str) -> Result<(), SNNError> {
    if columns.is_empty() {
        writeln!(out, "{}", key)?;
    } else {
        writeln!(out, "{}\t{}", key, columns)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RandomSource;

    fn network() -> Network {
        let mut rng = RandomSource::new(42);
        let mut network = Network::new();
        network.resize(4, 0.5, &mut rng);
        network.add_link(2, 0, 1.0);
        network.add_link(2, 3, 0.5);
        network
    }

    fn to_lines(buffer: Vec<u8>) -> Vec<String> {
        String::from_utf8(buffer)
            .unwrap()
            .lines()
            .map(|line| line.to_string())
            .collect()
    }

    #[test]
    fn test_write_params() {
        let network = network();
        let mut buffer = Vec::new();
        network.write_params(&mut buffer).unwrap();

        let lines = to_lines(buffer);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Type\ta\tb\tc\td\tInhibitory\tdegree\tvalence");
        assert!(lines[1].starts_with("FS\t"));
        assert!(lines[1].ends_with("\ttrue\t0\t0"));
        assert!(lines[3].starts_with("RS\t"));
        assert!(lines[3].ends_with("\tfalse\t2\t-1.5"));
        assert!(lines.iter().all(|line| line.split('\t').count() == 8));
    }

    #[test]
    fn test_write_header() {
        let network = network();

        let mut buffer = Vec::new();
        network
            .write_header(&[(NeuronType::FS, 2)], &mut buffer)
            .unwrap();
        assert_eq!(
            to_lines(buffer),
            vec!["t\tFS.v\tFS.u\tFS.I\tRS.v\tRS.u\tRS.I"]
        );

        // Full coverage, no fallback group; absent types are skipped
        let mut buffer = Vec::new();
        network
            .write_header(&[(NeuronType::LTS, 1), (NeuronType::FS, 3)], &mut buffer)
            .unwrap();
        assert_eq!(to_lines(buffer), vec!["t\tFS.v\tFS.u\tFS.I"]);
    }

    #[test]
    fn test_write_traj() {
        let network = network();
        let mut buffer = Vec::new();
        network
            .write_traj(7, &[(NeuronType::FS, 2)], &mut buffer)
            .unwrap();

        let lines = to_lines(buffer);
        assert_eq!(lines.len(), 1);
        let fields: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(fields.len(), 7);
        assert_eq!(fields[0], "7");
        assert_eq!(fields[1], "-65.0000");
        assert_eq!(fields[3], "0.0000");
    }

    #[test]
    fn test_untraced_rows() {
        let mut buffer = Vec::new();
        let empty = Network::new();
        empty.write_header(&[], &mut buffer).unwrap();
        empty.write_traj(3, &[], &mut buffer).unwrap();
        assert_eq!(to_lines(buffer), vec!["t", "3"]);

        // Counts covering the network but matching none of its types
        let mut buffer = Vec::new();
        let network = network();
        network
            .write_header(&[(NeuronType::TC, 4)], &mut buffer)
            .unwrap();
        network
            .write_traj(0, &[(NeuronType::TC, 4)], &mut buffer)
            .unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "t\n0\n");
    }
}
