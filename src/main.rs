use std::path::PathBuf;
use std::process::ExitCode;

use bfront::{IrGenerator, listing, read_source, tokenize};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Scan a B source file and print the stack IR generated for it.
#[derive(Parser)]
#[command(name = "bfront")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Source file to compile
  file: PathBuf,

  /// Name used for the source in diagnostics (defaults to the path)
  #[arg(long)]
  name: Option<String>,

  /// Print the token stream before generating
  #[arg(long)]
  tokens: bool,

  /// Only list these labels (repeatable)
  #[arg(short, long = "label")]
  labels: Vec<String>,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .with_ansi(false)
    .init();

  let cli = Cli::parse();

  let source = match read_source(&cli.file) {
    Ok(source) => source,
    Err(err) => {
      eprintln!("{err}");
      return ExitCode::FAILURE;
    }
  };

  let source_name = cli
    .name
    .unwrap_or_else(|| cli.file.display().to_string());
  tracing::info!(source = %source_name, "compiling");

  let tokens = tokenize(&source);
  if cli.tokens {
    print!("{}", listing::render_tokens(&tokens));
  }

  let mut generator = IrGenerator::new(source_name);
  let ir = generator.generate(tokens);

  if generator.has_errors() {
    print!("{}", generator.report());
    return ExitCode::FAILURE;
  }

  print!("{}", listing::render_program(&ir, &cli.labels));
  ExitCode::SUCCESS
}
