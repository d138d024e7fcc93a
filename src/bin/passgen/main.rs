use std::io::{self, Write};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use passgen::charset::ModeString;
use passgen::config::ConfigError;
use passgen::{Algorithm, GenerationConfig, Generator};
use tracing_subscriber::EnvFilter;

mod clipboard;

/// Generate cryptographically secure random passwords.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Load settings from a YAML profile; options given on the command line take precedence.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Algorithm to use: "random" (1) or "coinflip" (2).
    #[arg(short, long)]
    algorithm: Option<Algorithm>,
    /// Minimum password length.
    #[arg(short, long)]
    min_length: Option<usize>,
    /// Maximum password length.
    #[arg(short = 'x', long)]
    max_length: Option<usize>,
    /// Exact password length; overrides the minimum and maximum.
    #[arg(short, long)]
    fixed_length: Option<usize>,
    /// Mode string: L (lower case), U (upper case), N (numeric), S (special), H (human
    /// readable). An upper-case letter enables the mode, a lower-case letter disables it.
    #[arg(short = 'M', long)]
    mode: Option<ModeString>,
    /// Enable lower case characters.
    #[arg(short = 'L', long)]
    lower: bool,
    /// Enable upper case characters.
    #[arg(short = 'U', long)]
    upper: bool,
    /// Enable numeric characters.
    #[arg(short = 'N', long)]
    numeric: bool,
    /// Enable special characters.
    #[arg(short = 'S', long)]
    special: bool,
    /// Leave out characters that are easily confused, like 0/O and 1/l.
    #[arg(short = 'H', long)]
    human_readable: bool,
    #[arg(long)]
    min_lower: Option<usize>,
    #[arg(long)]
    min_upper: Option<usize>,
    #[arg(long)]
    min_numeric: Option<usize>,
    #[arg(long)]
    min_special: Option<usize>,
    /// Give up after this many candidates fail to meet the minimums.
    #[arg(long)]
    max_attempts: Option<NonZeroU32>,
    /// Number of passwords to generate.
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,
    /// Copy the generated password to the clipboard instead of printing it.
    #[arg(long, conflicts_with = "count")]
    copy: bool,
}

impl Args {
    fn into_config(self) -> Result<GenerationConfig, ProgError> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::from_yaml_file(path)
                .map_err(|err| ProgError::Config(path.clone(), err))?,
            None => GenerationConfig::default(),
        };
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(min_length) = self.min_length {
            config.min_length = min_length;
        }
        if let Some(max_length) = self.max_length {
            config.max_length = max_length;
        }
        if self.fixed_length.is_some() {
            config.fixed_length = self.fixed_length;
        }
        if let Some(mode) = &self.mode {
            mode.apply(&mut config.classes, &mut config.human_readable);
        }
        config.classes.lower |= self.lower;
        config.classes.upper |= self.upper;
        config.classes.numeric |= self.numeric;
        config.classes.special |= self.special;
        config.human_readable |= self.human_readable;
        if let Some(minimum) = self.min_lower {
            config.min_lower_case = minimum;
        }
        if let Some(minimum) = self.min_upper {
            config.min_upper_case = minimum;
        }
        if let Some(minimum) = self.min_numeric {
            config.min_numeric = minimum;
        }
        if let Some(minimum) = self.min_special {
            config.min_special = minimum;
        }
        if self.max_attempts.is_some() {
            config.max_attempts = self.max_attempts;
        }
        Ok(config)
    }
}

fn run() -> Result<(), ProgError> {
    let args = Args::parse();
    let (count, copy) = (args.count, args.copy);
    let generator = Generator::new(args.into_config()?);
    tracing::debug!(config = ?generator.config(), "loaded configuration");

    if copy {
        let password = generator.generate_os()?;
        clipboard::send_to_clipboard(password.as_str().as_bytes())?;
        eprintln!("Copied to the clipboard.");
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    for _ in 0..count {
        let password = generator.generate_os()?;
        writeln!(stdout, "{}", password.as_str()).context("failed to write to stdout")?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ProgError {
    #[error("Failed to load the profile at {}: {1}", .0.display())]
    Config(PathBuf, #[source] ConfigError),
    #[error("Generation failed: {0}")]
    Generation(passgen::Error),
    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for ProgError {
    fn from(err: anyhow::Error) -> ProgError {
        ProgError::Other(err)
    }
}

impl From<passgen::Error> for ProgError {
    fn from(err: passgen::Error) -> ProgError {
        ProgError::Generation(err)
    }
}
