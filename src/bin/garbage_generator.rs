use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::error;

use garbage::{parse_size, Alphabet, GeneratorConfig, Variant};

/// Write large synthetic payload files for download/upload tests.
///
/// With no arguments, writes a 200 MiB `public/garbage.html`.
#[derive(Parser, Debug)]
#[command(name = "garbage_generator", version)]
struct Opts {
    /// Fixture to write: html, blob or shuffled
    #[arg(long, default_value_t = Variant::Html)]
    variant: Variant,

    /// Target payload size, e.g. 4096, 64K, 200M
    #[arg(short, long, value_parser = size_arg)]
    size: Option<u64>,

    /// `uppercase`, `letters`, or a literal character set (default depends on variant)
    #[arg(short, long)]
    alphabet: Option<Alphabet>,

    /// Output directory
    #[arg(short, long, default_value = garbage::config::DEFAULT_OUTPUT_DIR)]
    out: PathBuf,

    /// Seed for the shuffled variant (only valid with `--variant shuffled`)
    #[arg(long)]
    seed: Option<u64>,

    /// Create the output directory if it is missing
    #[arg(long)]
    create_dirs: bool,

    /// More log output; repeat for debug
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Print nothing on success
    #[arg(short, long)]
    quiet: bool,
}

fn size_arg(s: &str) -> Result<u64, String> {
    parse_size(s).map_err(|e| e.to_string())
}

impl Opts {
    fn into_config(self) -> GeneratorConfig {
        let mut config = GeneratorConfig::for_variant(self.variant);
        if let Some(size) = self.size {
            config.size = size;
        }
        if let Some(alphabet) = self.alphabet {
            config.alphabet = alphabet;
        }
        config.output_dir = self.out;
        config.seed = self.seed;
        config.create_dirs = self.create_dirs;
        config
    }
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    if opts.seed.is_some() && opts.variant != Variant::Shuffled {
        Opts::command()
            .error(
                ErrorKind::ArgumentConflict,
                format!("--seed only applies to --variant shuffled, not {}", opts.variant),
            )
            .exit();
    }
    garbage::init_logging(opts.verbose, opts.quiet);
    let quiet = opts.quiet;
    let config = opts.into_config();

    match garbage::generate(&config) {
        Ok(report) => {
            if !quiet {
                for file in &report.files {
                    println!("Generated {} ({} bytes)", file.path.display(), file.bytes);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("generation failed: {e}");
            ExitCode::FAILURE
        }
    }
}
