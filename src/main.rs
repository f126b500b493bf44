use clap::Parser;
use log;
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use rusty_izh::error::SNNError;
use rusty_izh::simulation::{Simulation, SimulationConfig};

#[derive(Parser, Debug)]
struct Args {
    /// A JSON configuration file, overridden by the options below
    #[arg(long)]
    config: Option<PathBuf>,
    /// The seed of the random source (0 to seed from the system entropy)
    #[arg(long)]
    seed: Option<u64>,
    /// The number of neurons
    #[arg(short = 'N', long)]
    num_neurons: Option<usize>,
    /// The fraction of inhibitory neurons
    #[arg(long)]
    inhibitory_fraction: Option<f64>,
    /// The mean number of outgoing links per neuron
    #[arg(long)]
    mean_degree: Option<f64>,
    /// The mean link strength
    #[arg(long)]
    mean_strength: Option<f64>,
    /// The number of simulated ticks
    #[arg(short = 'T', long)]
    num_ticks: Option<usize>,
    /// The standard deviation of the thalamic input
    #[arg(long)]
    thalamic_sd: Option<f64>,
    /// Where to write the neuron parameter table
    #[arg(long)]
    params_out: Option<PathBuf>,
    /// Where to write the trajectory table (stdout if missing)
    #[arg(long)]
    traj_out: Option<PathBuf>,
    /// The log file
    #[arg(long, default_value = "log/rusty_izh.log")]
    log: PathBuf,
}

impl Args {
    fn simulation_config(&self) -> Result<SimulationConfig, SNNError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load_from(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(num_neurons) = self.num_neurons {
            config.num_neurons = num_neurons;
        }
        if let Some(inhibitory_fraction) = self.inhibitory_fraction {
            config.inhibitory_fraction = inhibitory_fraction;
        }
        if let Some(mean_degree) = self.mean_degree {
            config.mean_degree = mean_degree;
        }
        if let Some(mean_strength) = self.mean_strength {
            config.mean_strength = mean_strength;
        }
        if let Some(num_ticks) = self.num_ticks {
            config.num_ticks = num_ticks;
        }
        if let Some(thalamic_sd) = self.thalamic_sd {
            config.thalamic_sd = thalamic_sd;
        }
        Ok(config)
    }
}

fn writer_to(path: &Option<PathBuf>) -> Result<Box<dyn Write>, SNNError> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn main() -> Result<(), SNNError> {
    let args = Args::parse();

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} {l} - {m}\n")))
        .build(&args.log)
        .map_err(|e| SNNError::IOError(e.to_string()))?;

    let log_config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(LevelFilter::Info))
        .map_err(|e| SNNError::IOError(e.to_string()))?;

    log4rs::init_config(log_config).map_err(|e| SNNError::IOError(e.to_string()))?;

    log::info!("{:?}", args);

    let config = args.simulation_config()?;
    log::info!("{:?}", config);

    let mut simulation = Simulation::build(config)?;

    if let Some(path) = &args.params_out {
        let mut out = BufWriter::new(File::create(path)?);
        simulation.network().write_params(&mut out)?;
        out.flush()?;
        log::info!("Neuron parameters saved to {}", path.display());
    }

    let mut out = writer_to(&args.traj_out)?;
    simulation.run(&mut out)?;
    out.flush()?;

    Ok(())
}
