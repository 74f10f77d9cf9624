use std::fs;
use std::io::{self, BufRead, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use autotyper::control::{Ack, Request, TypingService};
use autotyper::options::{self, TypingOptions};
use autotyper::resolve::FocusRegistry;
use autotyper::session::{SessionController, SessionOutcome};
use autotyper::surface::{FreeformRegion, SharedSurface};
use autotyper::trace::ConsoleSurface;
use autotyper::transform::smarten_punctuation;

#[derive(Debug, Args, Clone)]
struct TypingArgs {
    /// Options file (JSON). Flags below override its values.
    #[arg(long, value_name = "PATH")]
    options: Option<PathBuf>,

    /// Minimum inter-character delay in milliseconds.
    #[arg(long)]
    min_delay: Option<u64>,

    /// Maximum inter-character delay in milliseconds.
    #[arg(long)]
    max_delay: Option<u64>,

    /// Mistake probability per character, percent (0-25).
    #[arg(long)]
    mistake_rate: Option<u8>,

    /// Dispatch a submit-style key signal when typing finishes.
    #[arg(long)]
    press_enter: Option<bool>,

    /// Rewrite plain punctuation as curly quotes, ellipses and em dashes.
    #[arg(long)]
    smart_punct: Option<bool>,

    /// Optional RNG seed (for debugging)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Parser)]
#[command(name = "autotyper")]
#[command(about = "Human-like text insertion simulator for editable surfaces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Type text into a live console surface
    Run {
        /// Input text file, or '-' for stdin
        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        #[command(flatten)]
        typing: TypingArgs,
    },

    /// Apply the smart punctuation transform to text
    Smarten {
        /// Input text file, or '-' for stdin
        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Serve JSON control requests line by line over stdio
    Serve {
        /// Optional RNG seed (for debugging)
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == std::ffi::OsStr::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn build_options(text: String, args: &TypingArgs) -> Result<TypingOptions> {
    let mut opts = match &args.options {
        Some(path) => options::load(path)?,
        None => TypingOptions::default(),
    };

    if let Some(v) = args.min_delay {
        opts.min_delay_ms = v;
    }
    if let Some(v) = args.max_delay {
        opts.max_delay_ms = v;
    }
    if let Some(v) = args.mistake_rate {
        opts.mistake_rate_percent = v;
    }
    if let Some(v) = args.press_enter {
        opts.press_enter_at_end = v;
    }
    if let Some(v) = args.smart_punct {
        opts.smart_punctuation = v;
    }

    let mut opts = opts.sanitized();
    opts.text = text;
    Ok(opts)
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run { input, typing } => {
            let text = read_input(&input)?;
            let opts = build_options(text, &typing)?;

            let controller = SessionController::new();
            {
                let controller = controller.clone();
                ctrlc::set_handler(move || controller.stop())
                    .context("failed to install Ctrl+C handler")?;
            }

            let mut rng = rng_from_seed(typing.seed);
            let mut surface = ConsoleSurface::stdout();
            let outcome = controller.run(&mut surface, &opts, &mut rng);

            println!();
            match outcome {
                SessionOutcome::Completed => eprintln!("Completed."),
                SessionOutcome::Cancelled => eprintln!("Cancelled."),
                SessionOutcome::Failed => eprintln!("Target surface lost."),
                SessionOutcome::Busy => {}
            }
        }
        Command::Smarten { input, output } => {
            let text = read_input(&input)?;
            let smartened = smarten_punctuation(&text);
            match output {
                Some(path) => fs::write(&path, smartened)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{smartened}"),
            }
        }
        Command::Serve { seed } => {
            let mut registry = FocusRegistry::new();
            registry.insert("scratch", SharedSurface::new(FreeformRegion::new()));
            registry.focus("scratch");

            let mut service = TypingService::new(registry);
            if let Some(seed) = seed {
                service = service.with_seed(seed);
            }
            {
                let controller = service.controller().clone();
                ctrlc::set_handler(move || controller.stop())
                    .context("failed to install Ctrl+C handler")?;
            }

            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("failed to read stdin")?;
                if line.trim().is_empty() {
                    continue;
                }
                let ack = match serde_json::from_str::<Request>(&line) {
                    Ok(request) => service.handle(request),
                    Err(err) => Ack::err(format!("invalid request: {err}")),
                };
                println!(
                    "{}",
                    serde_json::to_string(&ack).context("failed to serialize ack")?
                );
            }

            // Let an in-flight session settle before exiting.
            service.wait();
        }
    }

    Ok(())
}
