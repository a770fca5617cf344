use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use garbage::inspect::{self, Expectation, Summary};
use garbage::{parse_size, Alphabet, GarbageError, GeneratorConfig, Layout, Variant};

/// Inspect a payload fixture: byte count, runs and character frequencies.
#[derive(Parser, Debug)]
#[command(name = "garbage", version)]
struct Opts {
    /// Fixture file to read
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Wrapper to strip; guessed from the extension when omitted
    #[arg(long, value_parser = layout_arg)]
    layout: Option<Layout>,

    /// Check the fixture against a variant (html, blob or shuffled)
    #[arg(long, value_name = "VARIANT")]
    verify: Option<Variant>,

    /// Expected target size when verifying
    #[arg(short, long, value_parser = size_arg)]
    size: Option<u64>,

    /// Expected alphabet when verifying (default depends on variant)
    #[arg(short, long)]
    alphabet: Option<Alphabet>,

    /// Treat FILE as a testpath file and check its content
    #[arg(long, conflicts_with_all = ["verify", "layout"])]
    testpath: bool,

    /// More log output; repeat for debug
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn size_arg(s: &str) -> Result<u64, String> {
    parse_size(s).map_err(|e| e.to_string())
}

fn layout_arg(s: &str) -> Result<Layout, String> {
    match s {
        "html" => Ok(Layout::Html),
        "blob" => Ok(Layout::Blob),
        other => Err(format!("unknown layout '{other}' (expected html or blob)")),
    }
}

fn guess_layout(file: &std::path::Path) -> Layout {
    match file.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("html") => Layout::Html,
        _ => Layout::Blob,
    }
}

fn print_summary(file: &std::path::Path, summary: &Summary) {
    println!("File: {}", file.display());
    println!(
        "Payload bytes: {} | Runs: {} | Distinct characters: {}",
        summary.total_bytes, summary.runs, summary.distinct
    );
    for (byte, count) in summary.frequencies() {
        println!("  {:?}: {}", char::from(byte), count);
    }
}

fn run(opts: &Opts) -> garbage::Result<()> {
    let data = inspect::read_fixture(&opts.file)?;

    if opts.testpath {
        inspect::verify_testpath(&data)?;
        println!("{}: testpath OK", opts.file.display());
        return Ok(());
    }

    let summary = match opts.verify {
        Some(variant) => {
            let mut config = GeneratorConfig::for_variant(variant);
            if let Some(size) = opts.size {
                config.size = size;
            }
            if let Some(alphabet) = &opts.alphabet {
                config.alphabet = alphabet.clone();
            }
            let mut expect = Expectation::for_config(&config);
            if let Some(layout) = opts.layout {
                expect.layout = layout;
            }
            let summary = inspect::verify(&data, &expect)?;
            println!("{}: matches {} fixture", opts.file.display(), variant);
            summary
        }
        None => {
            let layout = opts.layout.unwrap_or_else(|| guess_layout(&opts.file));
            inspect::summarize(inspect::extract_payload(&data, layout)?)?
        }
    };

    print_summary(&opts.file, &summary);
    Ok(())
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    garbage::init_logging(opts.verbose, false);

    if !opts.file.exists() {
        eprintln!("Error: File '{}' not found.", opts.file.display());
        return ExitCode::FAILURE;
    }

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ GarbageError::Verification(_)) => {
            error!("{}: {e}", opts.file.display());
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("inspection failed: {e}");
            ExitCode::FAILURE
        }
    }
}
