//! Lispy CLI

use clap::{Parser, Subcommand};
use lispy::error::report_error;
use lispy::interp::{Config, Interpreter, DEFAULT_MAX_DEPTH};
use lispy::repl::Repl;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lispy", version, about = "Lispy - a small Lisp interpreter")]
struct Cli {
    /// Deepest S-expression nesting evaluated before giving up
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load source files, then start the interactive prompt (default)
    Repl {
        /// Files to load first
        files: Vec<PathBuf>,
    },
    /// Load source files and exit
    Run {
        /// Files to load, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Parse and dump AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let config = Config {
        max_depth: cli.max_depth,
    };

    let result = match cli.command.unwrap_or(Command::Repl { files: Vec::new() }) {
        Command::Repl { files } => start_repl(&files, config),
        Command::Run { files } => run_files(&files, config),
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Install a stderr subscriber when RUST_LOG is set
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// Load each file into the global environment, printing failures
///
/// Returns how many files could not be loaded.
fn load_files(interp: &mut Interpreter, files: &[PathBuf]) -> usize {
    let mut failed = 0;
    for file in files {
        let result = interp.load(file);
        if result.is_error() {
            println!("{result}");
            failed += 1;
        }
    }
    failed
}

fn start_repl(files: &[PathBuf], config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut interp = Interpreter::new().with_config(config);
    load_files(&mut interp, files);

    let mut repl = Repl::with_interpreter(interp)?;
    repl.run()?;
    Ok(())
}

fn run_files(files: &[PathBuf], config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut interp = Interpreter::new().with_config(config);
    match load_files(&mut interp, files) {
        0 => Ok(()),
        n => Err(format!("{n} file(s) failed to load").into()),
    }
}

fn parse_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    match lispy::parser::Parser::new().parse(&source) {
        Ok(ast) => {
            println!("{}", serde_json::to_string_pretty(&ast)?);
            Ok(())
        }
        Err(e) => {
            report_error(&filename, &source, &e);
            Err(e.into())
        }
    }
}

fn tokenize_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let tokens = match lispy::lexer::tokenize(&source) {
        Ok(tokens) => tokens,
        Err(e) => {
            report_error(&filename, &source, &e);
            return Err(e.into());
        }
    };

    for (tok, span) in &tokens {
        println!("{:?} @ {}..{}", tok, span.start, span.end);
    }

    Ok(())
}
