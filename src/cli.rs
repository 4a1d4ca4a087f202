use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rusty_smith::data::model::PortPair;
use rusty_smith::data::variant::FormatVariant;
use rusty_smith::plot::Metric;

#[derive(Parser)]
#[command(author, version, about = "S-parameter file reader, metrics and plots")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render one plot to a PNG file
    Plot {
        #[command(flatten)]
        input: InputArgs,
        /// smith, db, modulus or vswr
        #[arg(long, default_value = "db")]
        metric: Metric,
        /// Comma-separated port pairs, e.g. S11,S21
        #[arg(long, value_delimiter = ',', default_value = "S11")]
        pairs: Vec<PortPair>,
        #[arg(long, default_value_t = 0.0)]
        min_mhz: f64,
        /// May exceed the data's highest frequency
        #[arg(long, default_value_t = 100_000.0)]
        max_mhz: f64,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Write the normalized table as CSV
    Export {
        #[command(flatten)]
        input: InputArgs,
        /// Defaults to the input path with a .csv extension
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render every plot listed in a JSON job file
    Run { job: PathBuf },
    /// Open the interactive viewer
    View { file: Option<PathBuf> },
}

/// A file and, optionally, how to read it. Without `--variant`/`--ports` the
/// port count comes from the `.sNp` extension.
#[derive(Args)]
pub struct InputArgs {
    pub file: PathBuf,
    /// real-imag, real-imag-n-port, db-angle-legacy or db-angle-revised
    #[arg(long)]
    pub variant: Option<FormatVariant>,
    #[arg(long)]
    pub ports: Option<usize>,
}
