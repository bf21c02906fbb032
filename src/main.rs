use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use gaze_features::classify::{EventSummary, DEFAULT_LABEL_COLUMN};
use gaze_features::data::loader::{load_file, load_gaze_csv};
use gaze_features::data::writer::save_arff;
use gaze_features::features::annotate_file;
use gaze_features::features::velocity::MICROS_PER_SECOND;
use gaze_features::features::window::ConfidenceGate;
use gaze_features::FeatureConfig;

/// Multi-scale speed, direction and acceleration features for gaze recordings
#[derive(Parser, Debug)]
#[command(name = "gaze-features")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append speed/direction/acceleration columns to a recording
    Annotate {
        /// Input .arff (or raw gaze .csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Output .arff
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert a raw gaze CSV export (timestamp ms, x, y) to .arff
    Convert {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Group a classified .arff by eye-movement label and write the events as CSV
    Summarize {
        #[arg(short, long)]
        input: PathBuf,

        /// Output .csv (videoTime,x,y,classification)
        #[arg(short, long)]
        output: PathBuf,

        /// Nominal attribute holding the labels
        #[arg(long, default_value = DEFAULT_LABEL_COLUMN)]
        label_column: String,
    },

    /// Print relation, sample count and attributes of a file
    Inspect {
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = FeatureConfig::load_or_default(cli.config.as_deref())
        .context("loading configuration")?;

    match cli.command {
        Commands::Annotate { input, output } => {
            let report = annotate_file(&input, &output, &config)
                .with_context(|| format!("annotating {}", input.display()))?;
            info!(
                "{} columns added, {} replaced",
                report.appended.len(),
                report.replaced.len()
            );
        }
        Commands::Convert { input, output } => {
            let recording = load_gaze_csv(&input, &config.screen)
                .with_context(|| format!("reading {}", input.display()))?;
            save_arff(&output, &recording.dataset)
                .with_context(|| format!("writing {}", output.display()))?;
        }
        Commands::Summarize {
            input,
            output,
            label_column,
        } => {
            let summary = EventSummary::load_classified(&input, &label_column, None)
                .with_context(|| format!("reading {}", input.display()))?;
            let file = File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            summary
                .write_csv(BufWriter::new(file))
                .with_context(|| format!("writing {}", output.display()))?;
        }
        Commands::Inspect { file } => inspect(&file, &config)?,
    }
    Ok(())
}

fn inspect(path: &Path, config: &FeatureConfig) -> Result<()> {
    let ds = load_file(path).with_context(|| format!("reading {}", path.display()))?;
    println!("{ds}");
    for (i, name) in ds.schema().names().iter().enumerate() {
        let missing = ds
            .column_at(i)
            .map_or(0, |col| col.iter().filter(|v| v.is_nan()).count());
        println!("  {i:>3}  {name:<20} {missing} missing");
    }
    for line in &ds.metadata {
        println!("  {line}");
    }
    if let Ok(samples) = ds.samples() {
        if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
            let seconds = (last.time - first.time) / MICROS_PER_SECOND;
            println!("  span {seconds:.3} s");
        }
        let gate = ConfidenceGate::new(config.min_confidence);
        let gated = samples.iter().filter(|s| gate.fails(s.confidence)).count();
        println!("  {gated} samples below confidence {}", gate.threshold());
    }
    Ok(())
}
