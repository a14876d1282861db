//! `chardetect` CLI (§6).
//!
//! Reads files named on argv, or stdin when none are given, and prints
//! `<path>: <encoding> with confidence <c>` per file, printing `None` in
//! place of the encoding when the binary gate fires. Exits 0 on success,
//! non-zero on any I/O error.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use chardetect_rs::{detect, DetectSettings, EraFilter};

#[derive(Parser)]
#[command(name = "chardetect", about = "Detect the character encoding of one or more files")]
struct Cli {
    /// Files to analyse. Reads stdin if none are given.
    files: Vec<PathBuf>,

    /// Restrict candidates to a single encoding era, or ALL (the default).
    #[arg(long = "encoding-era", default_value = "ALL")]
    encoding_era: String,
}

fn format_line(path: &str, encoding: Option<&str>, confidence: f32) -> String {
    format!("{path}: {} with confidence {confidence:.2}", encoding.unwrap_or("None"))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let encoding_era = match EraFilter::parse_filter(&cli.encoding_era) {
        Ok(filter) => filter,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let settings = DetectSettings { encoding_era, ..DetectSettings::default() };

    let mut had_error = false;

    if cli.files.is_empty() {
        let mut buffer = Vec::new();
        if let Err(e) = io::stdin().read_to_end(&mut buffer) {
            error!("failed to read stdin: {e}");
            return ExitCode::FAILURE;
        }
        let result = detect(&buffer, &settings);
        println!("{}", format_line("<stdin>", result.encoding, result.confidence));
    } else {
        for path in &cli.files {
            match chardetect_rs::detect_path(path, &settings) {
                Ok(result) => {
                    println!("{}", format_line(&path.display().to_string(), result.encoding, result.confidence));
                }
                Err(e) => {
                    error!("{e}");
                    had_error = true;
                }
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
