// Copyright (C) 2023 - 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

#![deny(elided_lifetimes_in_paths)]

use std::{
    io::{stdin, stdout, BufRead, Write},
    path::{Path, PathBuf},
    process::exit,
};

use anyhow::Context;
use clap::Subcommand;
use colored::Colorize;
use log::{debug, LevelFilter};
use quantum::{config::ConfigRoot, parse_source, Lexer, ParseTree, SourceCode};
use quantum_interpreter::{
    Builtin,
    CallTracer,
    ConsoleHost,
    Debugger,
    ErrorKind,
    ErrorPrinter,
    Interpreter,
    RuntimeError,
    run_with_call_stack,
};

const CONFIG_FILE_NAME: &str = "quantum.toml";

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level, unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file; defaults to `quantum.toml` next to the script.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        use clap::Parser;
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a script.
    Run {
        file: PathBuf,
    },

    /// Tokenize and parse a script without running it.
    Check {
        file: PathBuf,
    },

    /// Print the tokens of a script.
    Tokens {
        file: PathBuf,
    },

    /// Start an interactive session.
    Repl,
}

impl Commands {
    fn file(&self) -> Option<&Path> {
        match self {
            Self::Run { file } | Self::Check { file } | Self::Tokens { file } => Some(file.as_path()),
            Self::Repl => None,
        }
    }
}

fn main() {
    let args = Args::parse_args();

    if let Err(e) = run(args) {
        eprintln!("{}: {e:#}", "error".red().bold());
        exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    initialize_logger(&config, args.verbose);

    match &args.command {
        Commands::Run { file } => {
            let source_code = read_source(file)?;
            let max_call_depth = config.interpreter.max_call_depth;
            run_with_call_stack(max_call_depth, || {
                if config.log.trace_calls {
                    run_script(&source_code, &config, CallTracer::default());
                } else {
                    run_script(&source_code, &config, ());
                }
            }).context("failed to start the interpreter thread")?;
        }

        Commands::Check { file } => {
            let source_code = read_source(file)?;
            let tree = parse_or_exit(&source_code);
            println!(
                "{}: {} statement(s) in {}",
                "ok".green().bold(),
                tree.statements().len(),
                source_code.path().display(),
            );
        }

        Commands::Tokens { file } => {
            let source_code = read_source(file)?;
            let tokens = match Lexer::new(&source_code).tokenize() {
                Ok(tokens) => tokens,
                Err(e) => exit_with_error(&source_code, &RuntimeError::from(e)),
            };

            for token in tokens {
                println!("{:>4}:{:<3} {:<24} {:?}", token.line(), token.column(), token.kind.name(), token.text.as_str());
            }
        }

        Commands::Repl => {
            run_with_call_stack(config.interpreter.max_call_depth, || repl(&config))
                .context("failed to start the interpreter thread")??;
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<ConfigRoot> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => {
            let directory = args.command.file()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_default();

            let path = directory.join(CONFIG_FILE_NAME);
            if !path.is_file() {
                return Ok(ConfigRoot::default());
            }
            path
        }
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;

    ConfigRoot::parse(&contents)
        .with_context(|| format!("invalid configuration file {}", path.display()))
}

fn initialize_logger(config: &ConfigRoot, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        config.log.level.into()
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn read_source(path: &Path) -> anyhow::Result<SourceCode> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    Ok(SourceCode::new(path, contents))
}

fn create_interpreter<D: Debugger>(config: &ConfigRoot, directory: PathBuf, debugger: D) -> Result<Interpreter<ConsoleHost, D>, RuntimeError> {
    let host = ConsoleHost::new(directory, config.interpreter.module_extensions.clone());
    let interpreter = Interpreter::new(host, debugger)
        .with_max_call_depth(config.interpreter.max_call_depth);

    Builtin::install(interpreter.globals())?;
    Ok(interpreter)
}

fn run_script<D: Debugger>(source_code: &SourceCode, config: &ConfigRoot, debugger: D) {
    let tree = parse_or_exit(source_code);

    let directory = source_code.path().parent().map(Path::to_path_buf).unwrap_or_default();
    let mut interpreter = match create_interpreter(config, directory, debugger) {
        Ok(interpreter) => interpreter,
        Err(e) => exit_with_error(source_code, &e),
    };

    debug!("running {} with {} top-level statement(s)", source_code.path().display(), tree.statements().len());
    if let Err(e) = interpreter.execute_tree(&tree) {
        exit_with_error(source_code, &e);
    }
}

fn parse_or_exit(source_code: &SourceCode) -> ParseTree {
    match parse_source(source_code) {
        Ok(tree) => tree,
        Err(e) => exit_with_error(source_code, &RuntimeError::from(e)),
    }
}

fn exit_with_error(source_code: &SourceCode, error: &RuntimeError) -> ! {
    if let Some(code) = error.exit_code() {
        exit(code);
    }

    ErrorPrinter::for_error(source_code, error).print();

    match error.kind {
        ErrorKind::LexicalError | ErrorKind::ParseError => exit(1),
        _ => exit(2),
    }
}

fn repl(config: &ConfigRoot) -> anyhow::Result<()> {
    let directory = std::env::current_dir().context("failed to determine the working directory")?;
    let mut interpreter = create_interpreter(config, directory, ())
        .map_err(|e| anyhow::anyhow!("failed to install the native library: {e}"))?;

    while let Some(entry) = read_repl_entry(&config.repl.prompt)? {
        if entry.trim().is_empty() {
            continue;
        }

        let source_code = SourceCode::anonymous(entry);
        let tree = match parse_source(&source_code) {
            Ok(tree) => tree,
            Err(e) => {
                ErrorPrinter::for_error(&source_code, &e.into()).print();
                continue;
            }
        };

        match interpreter.execute_tree(&tree) {
            Ok(value) if config.repl.echo && !value.is_nil() => println!("{value:?}"),
            Ok(..) => (),
            Err(e) => match e.exit_code() {
                Some(code) => exit(code),
                None => ErrorPrinter::for_error(&source_code, &e).print(),
            },
        }
    }

    Ok(())
}

/// One line, or a block: a line ending in `:` or with unclosed brackets
/// continues until an empty line.
fn read_repl_entry(prompt: &str) -> anyhow::Result<Option<String>> {
    let mut entry = String::new();
    let mut prompt = prompt.to_string();

    loop {
        print!("{prompt}");
        stdout().flush().context("failed to write the prompt")?;

        let mut line = String::new();
        if stdin().lock().read_line(&mut line).context("failed to read from standard input")? == 0 {
            return Ok((!entry.is_empty()).then_some(entry));
        }

        let is_continuation = !entry.is_empty();
        if is_continuation && line.trim().is_empty() {
            return Ok(Some(entry));
        }

        entry += &line;
        if !needs_continuation(&entry) && !is_continuation {
            return Ok(Some(entry));
        }

        prompt = "... ".to_string();
    }
}

fn needs_continuation(entry: &str) -> bool {
    let mut depth = 0i32;
    for c in entry.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => (),
        }
    }

    depth > 0 || entry.trim_end().ends_with(':')
}
