use clap::{command, Parser};
use jsonlang::{
    config::RuntimeConfig,
    repl::{Repl, ReplAction},
    InternalResult, JsonLangError, Runtime,
};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Program to run; starts the interactive shell when omitted
    file: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, default_value = "jsonlang.json")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(cli: &Cli, config: &RuntimeConfig) {
    let fallback = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_file(runtime: &mut Runtime, file: &Path) -> InternalResult<()> {
    info!("running {}", file.display());
    let name = runtime.load_program_file(file)?;
    runtime.run_program(&name)?;
    Ok(())
}

fn run_shell(mut repl: Repl) -> InternalResult<()> {
    let stdout = std::io::stdout();

    if atty::is(atty::Stream::Stdin) {
        let mut line_editor = Reedline::create();
        println!("{}", repl.banner());

        loop {
            let prompt = DefaultPrompt::new(
                DefaultPromptSegment::Basic(repl.prompt()),
                DefaultPromptSegment::Empty,
            );
            let sig = line_editor
                .read_line(&prompt)
                .map_err(|e| JsonLangError::internal(format!("Reedline error: {e}")))?;

            match sig {
                Signal::Success(buffer) => {
                    let mut out = stdout.lock();
                    if repl.handle_line(&buffer, &mut out)? == ReplAction::Quit {
                        return Ok(());
                    }
                    out.flush()?;
                }
                Signal::CtrlD | Signal::CtrlC => {
                    println!();
                    return Ok(());
                }
            }
        }
    } else {
        // Pipe mode: no banner, no prompt.
        let reader = BufReader::new(std::io::stdin().lock());
        for line in reader.lines() {
            let line = line?;
            let mut out = stdout.lock();
            if repl.handle_line(&line, &mut out)? == ReplAction::Quit {
                break;
            }
            out.flush()?;
        }
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match RuntimeConfig::load_or_default(Some(&cli.config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.report());
            std::process::exit(2);
        }
    };
    init_tracing(&cli, &config);
    debug!("config: {:?}", config);

    let mut runtime = Runtime::from_config(&config);

    let result = match &cli.file {
        Some(file) => run_file(&mut runtime, file),
        None => run_shell(Repl::new(runtime, &config.repl)),
    };

    if let Err(e) = result {
        eprintln!("{}", e.report());
        std::process::exit(1);
    }
}
