mod app;
mod cli;
mod state;
mod ui;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use app::RustySmithApp;
use clap::Parser;
use cli::{Cli, Command, InputArgs};
use eframe::egui;
use rusty_smith::config::PlotJob;
use rusty_smith::data::export::write_csv_file;
use rusty_smith::data::filter::FrequencyRange;
use rusty_smith::data::{self, Dataset};
use rusty_smith::plot::{self, PlotRequest};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plot {
            input,
            metric,
            pairs,
            min_mhz,
            max_mhz,
            out_dir,
        } => {
            let dataset = open(&input)?;
            let request = PlotRequest {
                metric,
                pairs,
                range: FrequencyRange::new(min_mhz, max_mhz),
            };
            let path = render(&dataset, &request, &out_dir)?;
            println!("{}", path.display());
        }
        Command::Export { input, output } => {
            let dataset = open(&input)?;
            let output = output.unwrap_or_else(|| input.file.with_extension("csv"));
            write_csv_file(&dataset, &output)?;
            println!("{}", output.display());
        }
        Command::Run { job } => {
            let job = PlotJob::load(&job)?;
            let dataset = data::load(&job.file, job.variant, job.ports)
                .with_context(|| format!("loading {}", job.file.display()))?;
            let out_dir = job.output_dir();
            for request in job.requests()? {
                let path = render(&dataset, &request, &out_dir)?;
                println!("{}", path.display());
            }
        }
        Command::View { file } => view(file)?,
    }
    Ok(())
}

fn open(input: &InputArgs) -> Result<Dataset> {
    data::load(&input.file, input.variant, input.ports)
        .with_context(|| format!("loading {}", input.file.display()))
}

fn render(dataset: &Dataset, request: &PlotRequest, out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    Ok(plot::render(dataset, request, out_dir)?)
}

fn view(file: Option<PathBuf>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Smith - S-Parameter Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(RustySmithApp::new(file.as_deref())))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
