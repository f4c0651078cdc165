//! FastDistLaw CLI entry point
//!
//! Hi-C distance law computation and curve post-processing.

use clap::{Parser, Subcommand};
use fast_distlaw::core::{DistanceLawOptions, DEFAULT_BASE, DEFAULT_SLOPE_SIGMA};
use fast_distlaw::{
    average_distance_law, compute_distance_law, normalize_distance_law, slope_distance_law, table,
    DistanceLawCurve,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "fast-distlaw")]
#[command(about = "Hi-C contact probability as a function of genomic distance")]
#[command(version)]
#[command(author = "FastDistLaw Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the distance law of a pairs file
    Compute {
        /// Input pairs file (plain, gzip or bzip2)
        pairs: PathBuf,
        /// Fragment list the pairs were mapped to
        fragments: PathBuf,
        /// Output table (default: distance_law.txt)
        output: Option<PathBuf>,
        /// File with one centromere position per chromosome, splits chromosomes into arms
        #[arg(short = 'c', long)]
        centromeres: Option<PathBuf>,
        /// Base of the logarithmic bins
        #[arg(short = 'b', long, default_value_t = DEFAULT_BASE)]
        base: f64,
        /// Treat chromosomes as circular
        #[arg(long)]
        circular: bool,
        /// Number of threads
        #[arg(short = 't', long, default_value = "1")]
        threads: usize,
    },
    /// Average curves from one or more distance law tables
    Average {
        /// Input tables
        #[arg(required = true)]
        tables: Vec<PathBuf>,
        /// Output table (default: distance_law_average.txt)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// Normalize curves before averaging
        #[arg(short = 'n', long)]
        normalize: bool,
        /// Label of the averaged curve
        #[arg(short = 'l', long, default_value = "average")]
        label: String,
    },
    /// Normalize every curve of a table to unit mass
    Normalize {
        /// Input table
        table: PathBuf,
        /// Output table (default: distance_law_normalized.txt)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Smoothed log-log slope of every curve of a table
    Slope {
        /// Input table
        table: PathBuf,
        /// Output table (default: distance_law_slope.txt)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// Standard deviation of the smoothing kernel, in bins
        #[arg(short = 's', long, default_value_t = DEFAULT_SLOPE_SIGMA)]
        sigma: f64,
    },
}

fn load_tables(paths: &[PathBuf]) -> anyhow::Result<Vec<DistanceLawCurve>> {
    let mut curves = Vec::new();
    for path in paths {
        let loaded = table::import_distance_law(path)
            .map_err(|e| anyhow::anyhow!("Failed to read table {:?}: {}", path, e))?;
        eprintln!("Loaded {} curves from {:?}", loaded.len(), path);
        curves.extend(loaded);
    }
    Ok(curves)
}

fn labels_of(curves: &[DistanceLawCurve]) -> Vec<String> {
    curves.iter().map(|c| c.label.clone()).collect()
}

fn write_curves(path: &Path, curves: &[DistanceLawCurve]) -> anyhow::Result<()> {
    table::export_distance_law(path, curves, &labels_of(curves))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Compute { pairs, fragments, output, centromeres, base, circular, threads } => {
            let output_path = output.unwrap_or_else(|| PathBuf::from("distance_law.txt"));
            let options = DistanceLawOptions { base, circular, threads };

            eprintln!("Computing distance law: {:?} -> {:?}", pairs, output_path);
            let report = compute_distance_law(
                pairs.as_path(),
                fragments.as_path(),
                centromeres.as_deref(),
                output_path.as_path(),
                options,
            )?;

            eprintln!("\n=== Distance Law Statistics ===");
            eprintln!("Segments:        {}", report.segments);
            eprintln!("Header lines:    {}", report.header_lines);
            eprintln!("Total pairs:     {}", report.stats.total);
            eprintln!("Counted:         {}", report.stats.counted);
            eprintln!("  - Opposite:    {}", report.stats.opposite_strands);
            eprintln!("  - InterSeg:    {}", report.stats.inter_segment);
            eprintln!("  - Unbinned:    {}", report.stats.unbinned);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Average { tables, output, normalize, label } => {
            let output_path = output.unwrap_or_else(|| PathBuf::from("distance_law_average.txt"));
            let mut curves = load_tables(&tables)?;
            if normalize {
                curves = normalize_distance_law(&curves)?;
            }
            let average = average_distance_law(&curves, label)?;
            write_curves(&output_path, std::slice::from_ref(&average))?;

            eprintln!("\n=== Average Statistics ===");
            eprintln!("Input curves:    {}", curves.len());
            eprintln!("Bins:            {}", average.len());
            eprintln!("Output:          {:?}", output_path);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Normalize { table: input, output } => {
            let output_path =
                output.unwrap_or_else(|| PathBuf::from("distance_law_normalized.txt"));
            let curves = load_tables(std::slice::from_ref(&input))?;
            let normalized = normalize_distance_law(&curves)?;
            write_curves(&output_path, &normalized)?;

            eprintln!("\n=== Normalize Statistics ===");
            eprintln!("Curves:          {}", normalized.len());
            eprintln!("Output:          {:?}", output_path);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Slope { table: input, output, sigma } => {
            let output_path = output.unwrap_or_else(|| PathBuf::from("distance_law_slope.txt"));
            let curves = load_tables(std::slice::from_ref(&input))?;
            let slopes = curves
                .iter()
                .map(|c| slope_distance_law(c, sigma))
                .collect::<Result<Vec<_>, _>>()?;
            table::export_slopes(&output_path, &slopes)?;

            eprintln!("\n=== Slope Statistics ===");
            eprintln!("Curves:          {}", slopes.len());
            eprintln!("Sigma:           {}", sigma);
            eprintln!("Output:          {:?}", output_path);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }
    }

    Ok(())
}
