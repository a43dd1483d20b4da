use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use ferrite_glyph::glyph::{image_to_input, GlyphOptions};
use ferrite_glyph::logging::init_logging;
use ferrite_glyph::{
    train_loop, ExecutionConfig, ExecutionMode, Network, NetworkSpec, Sample, SampleSet, TrainConfig,
};

#[derive(Parser)]
#[command(name = "ferrite-glyph", about = "Train and run a sigmoid perceptron on glyph vectors")]
struct Cli {
    /// Log per-epoch progress
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a network with random weights and save it
    Init {
        #[arg(long, value_name = "PATH")]
        spec: PathBuf,
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Train on a labeled dataset and save the result
    Train {
        /// JSON array of { "input": [..], "label": n }
        #[arg(long, value_name = "PATH")]
        data: PathBuf,
        /// Start from a fresh network described by this spec
        #[arg(long, value_name = "PATH", conflicts_with = "model", required_unless_present = "model")]
        spec: Option<PathBuf>,
        /// Continue training a saved network
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
        #[arg(short, long, value_name = "INT", default_value_t = 50)]
        epochs: usize,
        #[arg(long, value_name = "RATE", default_value_t = 0.0)]
        acceptable_error: f64,
        #[command(flatten)]
        execution: ExecutionArgs,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Report accuracy of a saved network on a labeled dataset
    Evaluate {
        #[arg(long, value_name = "PATH")]
        model: PathBuf,
        #[arg(long, value_name = "PATH")]
        data: PathBuf,
        #[command(flatten)]
        execution: ExecutionArgs,
    },
    /// Classify one input vector or glyph image
    Predict {
        #[arg(long, value_name = "PATH")]
        model: PathBuf,
        /// Comma-separated sensor values
        #[arg(long, conflicts_with = "image", required_unless_present = "image")]
        input: Option<String>,
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
        #[arg(long, default_value_t = 20)]
        width: u32,
        #[arg(long, default_value_t = 20)]
        height: u32,
        #[arg(long)]
        threshold: Option<u8>,
        #[arg(long)]
        invert: bool,
    },
}

#[derive(Args)]
struct ExecutionArgs {
    /// Run every pass on the calling thread
    #[arg(long)]
    sequential: bool,
    /// Worker pool width for parallel passes
    #[arg(long, value_name = "INT")]
    workers: Option<usize>,
}

impl ExecutionArgs {
    fn apply(&self, network: &mut Network) -> Result<(), Box<dyn Error>> {
        let mut execution = network.execution();
        if self.sequential {
            execution.mode = ExecutionMode::Sequential;
        }
        if let Some(workers) = self.workers {
            execution = ExecutionConfig { workers, ..execution };
        }
        network.set_execution(execution)?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Init { spec, out, seed } => {
            let spec = NetworkSpec::load_json(&spec)?;
            let network = match seed {
                Some(seed) => spec.build_with_rng(&mut StdRng::seed_from_u64(seed))?,
                None => spec.build()?,
            };
            network.save_json(&out)?;
            info!(structure = ?network.structure(), path = %out.display(), "network initialized");
        }
        Command::Train {
            data,
            spec,
            model,
            out,
            epochs,
            acceptable_error,
            execution,
            seed,
        } => {
            let mut network = match (spec, model) {
                (_, Some(model)) => Network::load_json(&model)?,
                (Some(spec), None) => {
                    let spec = NetworkSpec::load_json(&spec)?;
                    match seed {
                        Some(seed) => spec.build_with_rng(&mut StdRng::seed_from_u64(seed))?,
                        None => spec.build()?,
                    }
                }
                (None, None) => return Err("either --spec or --model is required".into()),
            };
            execution.apply(&mut network)?;

            let mut set = SampleSet::load_json(&data, network.class_count())?;
            let mut config = TrainConfig::new(epochs, acceptable_error);
            config.seed = seed;
            let accuracy = train_loop(&mut network, &mut set, &config)?;
            network.save_json(&out)?;
            println!("final epoch accuracy: {accuracy:.2}%");
        }
        Command::Evaluate {
            model,
            data,
            execution,
        } => {
            let mut network = Network::load_json(&model)?;
            execution.apply(&mut network)?;
            let mut set = SampleSet::load_json(&data, network.class_count())?;
            let accuracy = network.evaluate(&mut set)?;
            println!("accuracy: {:.2}% over {} samples", accuracy * 100.0, set.len());
        }
        Command::Predict {
            model,
            input,
            image,
            width,
            height,
            threshold,
            invert,
        } => {
            let mut network = Network::load_json(&model)?;
            let values = match (input, image) {
                (Some(input), _) => parse_vector(&input)?,
                (None, Some(path)) => {
                    let options = GlyphOptions {
                        threshold,
                        invert,
                        ..GlyphOptions::new(width, height)
                    };
                    image_to_input(&path, &options)?
                }
                (None, None) => return Err("either --input or --image is required".into()),
            };
            let mut sample = Sample::unlabeled(&values, network.class_count());
            let label = network.predict(&mut sample)?;
            match network.label_name(label) {
                Some(name) => println!("{label} ({name})"),
                None => println!("{label}"),
            }
            println!("outputs: {:?}", sample.output());
        }
    }
    Ok(())
}

fn parse_vector(text: &str) -> Result<Vec<f64>, Box<dyn Error>> {
    text.split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| -> Box<dyn Error> { format!("bad value '{v}': {e}").into() })
        })
        .collect()
}
