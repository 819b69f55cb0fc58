use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dryad::{Engine, EngineConfig};
use tracing_subscriber::EnvFilter;

/// Extract structurally repeated HTML fragments into include partials.
#[derive(Parser, Debug)]
#[command(name = "dryad", version, about)]
struct Cli {
    /// Directory of input .html files (searched recursively).
    src: PathBuf,

    /// Output directory; mirrors the source layout, partials under
    /// `partials/`.
    dest: PathBuf,

    /// Shingle window over root-to-leaf tag paths.
    #[arg(long)]
    window: Option<usize>,

    /// MinHash signature length.
    #[arg(long = "num-perm")]
    num_perm: Option<usize>,

    /// LSH band count (must divide --num-perm).
    #[arg(long)]
    bands: Option<usize>,

    /// Minimum estimated Jaccard similarity to accept a pair.
    #[arg(long = "jaccard-threshold")]
    jaccard_threshold: Option<f64>,

    /// Maximum SimHash Hamming distance to accept a pair.
    #[arg(long = "hamming-threshold")]
    hamming_threshold: Option<u32>,

    /// Smallest subtree node count worth extracting.
    #[arg(long = "min-nodes")]
    min_nodes: Option<usize>,

    /// Smallest cluster worth extracting.
    #[arg(long = "min-occurrences")]
    min_occurrences: Option<usize>,

    /// Attribute name to ignore during comparison (repeatable; replaces the
    /// default `class`, `id` set).
    #[arg(long = "volatile-attr")]
    volatile_attr: Vec<String>,

    /// Hash seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep shared head assets and footer scripts in place instead of
    /// hoisting them into title-meta/head-css/footer-scripts partials.
    #[arg(long = "no-hoist")]
    no_hoist: bool,

    /// Only log warnings and errors.
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = EngineConfig::default();
    if let Some(window) = cli.window {
        config = config.with_window(window);
    }
    if let Some(num_perm) = cli.num_perm {
        config = config.with_num_perm(num_perm);
    }
    if let Some(bands) = cli.bands {
        config = config.with_bands(bands);
    }
    if let Some(threshold) = cli.jaccard_threshold {
        config = config.with_jaccard_threshold(threshold);
    }
    if let Some(threshold) = cli.hamming_threshold {
        config = config.with_hamming_threshold(threshold);
    }
    if let Some(min) = cli.min_nodes {
        config = config.with_min_fragment_nodes(min);
    }
    if let Some(min) = cli.min_occurrences {
        config = config.with_min_occurrences(min);
    }
    if !cli.volatile_attr.is_empty() {
        config = config.with_volatile_attrs(cli.volatile_attr.clone());
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if cli.no_hoist {
        config = config.with_hoist_assets(false);
    }

    let engine = Engine::new(&cli.src, &cli.dest, config);
    let summary = engine
        .run()
        .with_context(|| format!("extraction failed for {}", cli.src.display()))?;

    println!(
        "{} documents rewritten, {} partials extracted -> {}",
        summary.documents_parsed,
        summary.partials_written,
        cli.dest.display()
    );
    Ok(())
}
