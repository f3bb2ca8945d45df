use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use dissim_embed::{MetricParams, MetricSpec, MultiComponentTransformer, TransformerConfig};
use dissim_io::{
    ChannelPrototypes, Dataset, ExperimentName, FeatureWriter, SampleReader, align_channels,
};

#[derive(Parser)]
#[command(name = "dissim")]
#[command(about = "Prototype distance features for time series classification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for prototype selection (entropy-seeded if omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Distance workers per channel: 1 = sequential, -1 = all, -k = all but k-1
    #[arg(long, global = true, allow_negative_numbers = true)]
    jobs: Option<i32>,

    /// Size of the global thread pool used by `--jobs -1` (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Distance measure options shared by every channel.
#[derive(Args, Debug, Clone)]
struct MetricArgs {
    /// Metric name: euclidean, sqeuclidean, manhattan, cosine, nan_euclidean, dtw, fastdtw
    #[arg(long, default_value = "euclidean")]
    metric: String,

    /// Sakoe-Chiba window for dtw; -1 = 10% of the longer sequence
    #[arg(long, allow_negative_numbers = true)]
    window: Option<i64>,

    /// Band radius for fastdtw
    #[arg(long)]
    radius: Option<usize>,

    /// Weight of the first-difference term, blended with the raw distance
    #[arg(long)]
    alpha: Option<f64>,
}

#[derive(Subcommand)]
enum Command {
    /// Select prototypes and write distance features for one or more channels
    Transform {
        /// Input CSV per channel (first column = sample id)
        #[arg(long, required = true, num_args = 1..)]
        data: Vec<PathBuf>,

        /// Number of prototypes per channel
        #[arg(long, default_value_t = TransformerConfig::DEFAULT_N_COMPONENTS)]
        n_components: usize,

        /// Keep prototypes as shared views of the input instead of copies
        #[arg(long, default_value_t = false)]
        no_copy: bool,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        metric: MetricArgs,
    },

    /// Select prototypes only and print their indices
    Select {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Number of prototypes
        #[arg(long, default_value_t = TransformerConfig::DEFAULT_N_COMPONENTS)]
        n_components: usize,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TransformOutput {
    experiment: String,
    metric: String,
    n_samples: usize,
    n_features: usize,
    features_path: PathBuf,
    prototypes_path: PathBuf,
    channels: Vec<ChannelOutput>,
}

#[derive(Serialize)]
struct ChannelOutput {
    data: PathBuf,
    length: usize,
    indices: Vec<usize>,
}

#[derive(Serialize)]
struct SelectOutput {
    data: PathBuf,
    n_samples: usize,
    length: usize,
    indices: Vec<usize>,
}

fn build_metric(args: &MetricArgs) -> Result<(MetricSpec, MetricParams)> {
    let base: MetricSpec = args
        .metric
        .parse()
        .with_context(|| format!("unknown metric: {}", args.metric))?;

    let mut params = MetricParams::new();
    if let Some(window) = args.window {
        params = params.with_int("window", window);
    }
    if let Some(radius) = args.radius {
        params = params.with_int("radius", i64::try_from(radius).context("radius too large")?);
    }

    // The -1 window sentinel is resolved by the blended metric; alpha 0 is
    // exactly the base distance.
    let spec = match (args.alpha, args.window) {
        (Some(alpha), _) => MetricSpec::blended(alpha, base),
        (None, Some(-1)) => MetricSpec::blended(0.0, base),
        (None, _) => base,
    };
    Ok((spec, params))
}

fn read_channels(paths: &[PathBuf]) -> Result<Vec<Dataset>> {
    let datasets = paths
        .iter()
        .map(|p| {
            SampleReader::new(p)
                .read()
                .with_context(|| format!("failed to read {}", p.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    align_channels(datasets).context("failed to align channels by sample id")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Transform {
            data,
            n_components,
            no_copy,
            experiment,
            output_dir,
            metric,
        } => {
            let experiment = ExperimentName::new(experiment)?;
            let channels = read_channels(&data)?;
            let (spec, params) = build_metric(&metric)?;
            info!(
                n_channels = channels.len(),
                metric = %spec.name(),
                n_components,
                "transforming"
            );

            let configs = (0..channels.len())
                .map(|c| -> Result<TransformerConfig> {
                    Ok(TransformerConfig::new(n_components)?
                        .with_copy_prototypes(!no_copy)
                        .with_metric(spec.clone())
                        .with_metric_params(params.clone())
                        .with_random_state(cli.seed.map(|s| s.wrapping_add(c as u64)))
                        .with_n_jobs(cli.jobs))
                })
                .collect::<Result<Vec<_>>>()?;
            let mut agg = MultiComponentTransformer::from_configs(configs)
                .context("failed to build transformers")?;

            let xs: Vec<_> = channels.iter().map(|d| d.samples.clone()).collect();
            let features = agg.fit_transform(&xs).context("transform failed")?;
            if features.as_slice().iter().any(|v| v.is_nan()) {
                warn!("feature matrix contains NaN distances");
            }

            let indices = agg.indices()?;
            let writer = FeatureWriter::new(&output_dir, experiment.clone())?;
            let columns = FeatureWriter::column_names(&indices);
            let sample_ids = &channels[0].sample_ids;
            let features_path = writer.write_features(sample_ids, &features, &columns)?;

            let metric_name = spec.name();
            let summaries: Vec<ChannelPrototypes<'_>> = channels
                .iter()
                .zip(&indices)
                .map(|(d, idx)| ChannelPrototypes {
                    metric: &metric_name,
                    length: d.samples.length(),
                    indices: idx,
                })
                .collect();
            let prototypes_path = writer.write_prototypes(sample_ids.len(), &summaries)?;

            let output = TransformOutput {
                experiment: experiment.to_string(),
                metric: metric_name.clone(),
                n_samples: features.n_samples(),
                n_features: features.n_components(),
                features_path,
                prototypes_path,
                channels: data
                    .iter()
                    .zip(&channels)
                    .zip(&indices)
                    .map(|((path, d), idx)| ChannelOutput {
                        data: path.clone(),
                        length: d.samples.length(),
                        indices: idx.to_vec(),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Select { data, n_components } => {
            let dataset = SampleReader::new(&data)
                .read()
                .with_context(|| format!("failed to read {}", data.display()))?;
            let mut transformer = TransformerConfig::new(n_components)?
                .with_random_state(cli.seed)
                .build()?;
            transformer
                .fit(&dataset.samples)
                .context("prototype selection failed")?;

            let output = SelectOutput {
                data,
                n_samples: dataset.n_samples(),
                length: dataset.samples.length(),
                indices: transformer.indices()?.to_vec(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
