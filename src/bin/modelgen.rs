//! `modelgen`: compiles the default in-memory bigram models and confusion
//! graph into the packed §6 binary format, for anyone who wants to ship a
//! `models.bin` file instead of relying on the small embedded seed corpora.
//!
//! This is ambient tooling, out-of-core and not part of the library's
//! public surface.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use chardetect_rs::confusion::GRAPH;
use chardetect_rs::model::STORE;

#[derive(Parser)]
#[command(name = "modelgen", about = "Compile bigram models and the confusion graph into models.bin")]
struct Cli {
    /// Output path for the bigram model section.
    #[arg(long, default_value = "models.bin")]
    models_out: PathBuf,

    /// Output path for the confusion-graph section.
    #[arg(long, default_value = "confusion.bin")]
    confusion_out: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let models_file = match File::create(&cli.models_out) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("failed to create {}: {e}", cli.models_out.display());
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = STORE.write_to(BufWriter::new(models_file)) {
        eprintln!("failed to write bigram models: {e}");
        return ExitCode::FAILURE;
    }
    info!("wrote bigram models to {}", cli.models_out.display());

    let confusion_file = match File::create(&cli.confusion_out) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("failed to create {}: {e}", cli.confusion_out.display());
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = GRAPH.write_to(BufWriter::new(confusion_file)) {
        eprintln!("failed to write confusion graph: {e}");
        return ExitCode::FAILURE;
    }
    info!("wrote confusion graph to {}", cli.confusion_out.display());

    ExitCode::SUCCESS
}
