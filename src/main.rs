use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ndarray::Array3;
use serde::Serialize;
use tracing::info;

use stgraph_graph::{BandedDtw, GraphBuilder, GraphConfig, GraphOutput, average_degree};
use stgraph_io::{
    DatasetRegistry, DatasetSource, EdgeReader, FileCacheStore, ResultWriter, SignalReader, SplitSummary,
};
use stgraph_window::{Batcher, SplitConfig, SplitPolicy, StatsChannel, WindowConfig, generate_splits};

#[derive(Parser)]
#[command(name = "stgraph")]
#[command(about = "Spatial and semantic sensor graphs plus sliding-window splits for traffic forecasting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the batch order recorded in the splits artifact
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Where the raw data, caches, and results live.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Dataset name (built-in: pems03, pems04, pems07, pems08, pemsbay, pemsD7M, pemsD7L)
    #[arg(long)]
    dataset: String,

    /// Read raw files from --remote-data-dir instead of --data-dir
    #[arg(long, default_value_t = false)]
    remote: bool,

    /// Local data root
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Remote data root, required with --remote
    #[arg(long)]
    remote_data_dir: Option<PathBuf>,

    /// Directory holding cached distance matrices
    #[arg(long, default_value = "data")]
    cache_dir: PathBuf,

    /// JSON file of extra datasets: {"name": {"signal": "...", "edges": "..."}}
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

/// Graph kernel parameters.
#[derive(Args, Debug, Clone)]
struct GraphArgs {
    /// Kernel width of the semantic (DTW) graph
    #[arg(long, default_value_t = 0.1)]
    sigma1: f64,

    /// Kernel width of the spatial graph
    #[arg(long, default_value_t = 10.0)]
    sigma2: f64,

    /// Semantic threshold: kernel values above it become links
    #[arg(long, default_value_t = 0.6)]
    thres1: f64,

    /// Spatial threshold: kernel values below it are dropped
    #[arg(long, default_value_t = 0.5)]
    thres2: f64,

    /// Time steps per day for the daily profile
    #[arg(long, default_value_t = 288)]
    day_steps: usize,

    /// Sakoe-Chiba radius of the DTW alignment
    #[arg(long, default_value_t = 6)]
    dtw_radius: usize,
}

/// Split and batching parameters.
#[derive(Args, Debug, Clone)]
struct SplitArgs {
    /// Samples per batch
    #[arg(long, default_value_t = 64)]
    batch_size: usize,

    /// Fraction of time steps used for training
    #[arg(long, default_value_t = 0.6)]
    train_ratio: f64,

    /// Fraction of time steps used for validation
    #[arg(long, default_value_t = 0.2)]
    valid_ratio: f64,

    /// History window length
    #[arg(long, default_value_t = 12)]
    his_length: usize,

    /// Prediction window length
    #[arg(long, default_value_t = 12)]
    pred_length: usize,

    /// Validation placement
    #[arg(long, value_enum, default_value_t = PolicyArg::Standard)]
    split_policy: PolicyArg,

    /// Channel for split statistics: "first", "last", or an index
    #[arg(long, default_value = "last")]
    stats_channel: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum PolicyArg {
    /// Validation follows train
    Standard,
    /// Validation is the tail range shared with test
    Effective,
}

impl From<PolicyArg> for SplitPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Standard => SplitPolicy::Standard,
            PolicyArg::Effective => SplitPolicy::Effective,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Build the semantic and spatial graphs, caching distance matrices
    Graphs {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Compute per-split statistics and batch layout
    Splits {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        split: SplitArgs,
    },

    /// Build graphs and splits in one run
    Prepare {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        graph: GraphArgs,

        #[command(flatten)]
        split: SplitArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct GraphsOutput {
    dataset: String,
    n_steps: usize,
    n_nodes: usize,
    n_channels: usize,
    signal_mean: f64,
    signal_std: f64,
    semantic_average_degree: f64,
    spatial_average_degree: f64,
    artifacts: Vec<PathBuf>,
}

#[derive(Serialize)]
struct SplitsOutput {
    dataset: String,
    policy: SplitPolicy,
    batch_size: usize,
    train: SplitSummary,
    valid: SplitSummary,
    test: SplitSummary,
    artifact: PathBuf,
}

#[derive(Serialize)]
struct PrepareOutput {
    graphs: GraphsOutput,
    splits: SplitsOutput,
}

fn parse_stats_channel(s: &str) -> Result<StatsChannel> {
    match s {
        "first" => Ok(StatsChannel::First),
        "last" => Ok(StatsChannel::Last),
        other => other
            .parse()
            .map(StatsChannel::Index)
            .with_context(|| format!("unknown stats channel: {other} (expected first, last, or an index)")),
    }
}

fn resolve_source(data: &DataArgs) -> Result<DatasetSource> {
    let mut registry = DatasetRegistry::builtin();
    if let Some(path) = &data.registry {
        registry
            .extend_from_json(path)
            .with_context(|| format!("failed to load registry {}", path.display()))?;
    }
    let root = if data.remote {
        data.remote_data_dir
            .as_deref()
            .context("--remote requires --remote-data-dir")?
    } else {
        data.data_dir.as_path()
    };
    let source = registry.resolve(&data.dataset, root)?;
    info!(dataset = %source.dataset, root = %root.display(), "dataset resolved");
    Ok(source)
}

fn load_signal(source: &DatasetSource) -> Result<Array3<f64>> {
    SignalReader::new(&source.signal)
        .read()
        .with_context(|| format!("failed to read signal {}", source.signal.display()))
}

fn run_graphs(
    source: &DatasetSource,
    signal: &Array3<f64>,
    cache_dir: &Path,
    writer: &ResultWriter,
    args: &GraphArgs,
) -> Result<GraphsOutput> {
    let edges = EdgeReader::new(&source.edges)
        .read()
        .with_context(|| format!("failed to read edges {}", source.edges.display()))?;

    let config = GraphConfig::new()
        .with_sigma_semantic(args.sigma1)
        .with_sigma_spatial(args.sigma2)
        .with_thresh_semantic(args.thres1)
        .with_thresh_spatial(args.thres2)
        .with_day_steps(args.day_steps)
        .with_dtw_radius(args.dtw_radius);
    let cache = FileCacheStore::new(cache_dir)?;
    let graphs: GraphOutput = GraphBuilder::new(config, cache, BandedDtw::new())
        .context("invalid graph configuration")?
        .build(&source.dataset, signal.view(), &edges)
        .context("graph construction failed")?;

    let artifacts = vec![
        writer.write_graphs(&graphs)?,
        writer.write_matrix("semantic_adj", &graphs.semantic)?,
        writer.write_matrix("spatial_adj", &graphs.spatial)?,
        writer.write_matrix("semantic_propagation", &graphs.semantic_propagation()?)?,
        writer.write_matrix("spatial_propagation", &graphs.spatial_propagation()?)?,
    ];

    let (n_steps, n_nodes, n_channels) = signal.dim();
    Ok(GraphsOutput {
        dataset: source.dataset.to_string(),
        n_steps,
        n_nodes,
        n_channels,
        signal_mean: graphs.signal_mean,
        signal_std: graphs.signal_std,
        semantic_average_degree: average_degree(graphs.semantic.view()),
        spatial_average_degree: average_degree(graphs.spatial.view()),
        artifacts,
    })
}

fn run_splits(
    source: &DatasetSource,
    signal: &Array3<f64>,
    writer: &ResultWriter,
    args: &SplitArgs,
    seed: u64,
) -> Result<SplitsOutput> {
    let config = SplitConfig::new()
        .with_ratios(args.train_ratio, args.valid_ratio)
        .with_lengths(args.his_length, args.pred_length)
        .with_policy(args.split_policy.into())
        .with_stats_channel(parse_stats_channel(&args.stats_channel)?)
        .with_stats_window(WindowConfig::default());
    let splits = generate_splits(signal.view(), &config).context("split generation failed")?;
    let batcher = Batcher::new(args.batch_size)?.with_shuffle(seed);

    let artifact = writer.write_splits(&splits, &config, &batcher)?;
    Ok(SplitsOutput {
        dataset: source.dataset.to_string(),
        policy: config.policy(),
        batch_size: batcher.batch_size(),
        train: SplitSummary::new(&splits.train, &batcher),
        valid: SplitSummary::new(&splits.valid, &batcher),
        test: SplitSummary::new(&splits.test, &batcher),
        artifact,
    })
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

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Graphs { data, graph } => {
            let source = resolve_source(&data)?;
            let signal = load_signal(&source)?;
            let writer = ResultWriter::new(&data.output_dir, source.dataset.clone())?;
            let output = run_graphs(&source, &signal, &data.cache_dir, &writer, &graph)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Splits { data, split } => {
            let source = resolve_source(&data)?;
            let signal = load_signal(&source)?;
            let writer = ResultWriter::new(&data.output_dir, source.dataset.clone())?;
            let output = run_splits(&source, &signal, &writer, &split, cli.seed)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Prepare { data, graph, split } => {
            let source = resolve_source(&data)?;
            let signal = load_signal(&source)?;
            let writer = ResultWriter::new(&data.output_dir, source.dataset.clone())?;
            let output = PrepareOutput {
                graphs: run_graphs(&source, &signal, &data.cache_dir, &writer, &graph)?,
                splits: run_splits(&source, &signal, &writer, &split, cli.seed)?,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
