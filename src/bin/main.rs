use clap::{ArgAction, Parser, Subcommand};
use ocular::text::{add_line_frame, add_sentence_frame, add_token_frame, add_word_frame, text_registry};
use ocular::Registry;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::Level;

mod shell;
use shell::{print_view, run_shell, run_shell_commands};

/// Browse a text through nested frames: words, tokens, sentences and lines.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

/// Where the text comes from and what its base sequence is called.
#[derive(clap::Args)]
struct Source {
    /// Input file (defaults to stdin)
    #[arg(short, long, value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Key of the base frame and array of graphemes
    #[arg(short, long, value_name = "KEY", default_value = "chars", value_parser = parse_base)]
    base: String,
}

/// Frames `load` registers over the base sequence.
const STANDARD_FRAMES: [&str; 4] = ["words", "tokens", "sents", "lines"];

fn parse_base(key: &str) -> Result<String, String> {
    if STANDARD_FRAMES.contains(&key) {
        return Err(format!("'{}' names a standard frame ({})", key, STANDARD_FRAMES.join(", ")));
    }
    if !ocular::scope::is_valid_key(key) {
        return Err(ocular::OcularError::InvalidKey(key.to_string()).to_string());
    }
    Ok(key.to_string())
}

#[derive(Subcommand)]
enum Commands {
    /// Print one or more scope expressions, e.g. `lines.words/chars`
    View {
        #[command(flatten)]
        source: Source,
        /// Print one JSON document per item instead of a labelled tree
        #[arg(long)]
        json: bool,
        /// Scope expression tokens (joined with spaces)
        #[arg(value_name = "SCOPE", required = true)]
        scopes: Vec<String>,
    },
    /// Dump the true cells of frames as JSON
    Frames {
        #[command(flatten)]
        source: Source,
        /// Frames to dump (default: all)
        #[arg(value_name = "FRAME")]
        keys: Vec<String>,
    },
    /// Interactive shell (or run commands non-interactively)
    Shell {
        #[command(flatten)]
        source: Source,
        /// Shell commands to execute non-interactively (skips REPL)
        #[arg(value_name = "CMD", num_args = 0.., last = true)]
        commands: Vec<String>,
    },
}

fn read_text(input: Option<&PathBuf>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Build the registry with the standard text frames over the base sequence.
fn load(source: &Source) -> Result<Registry<String>, Box<dyn std::error::Error>> {
    let text = read_text(source.input.as_ref())?;
    let base = source.base.as_str();
    let mut reg = text_registry(base, &text)?;
    let [words, tokens, sents, lines] = STANDARD_FRAMES;
    add_word_frame(&mut reg, words, base)?;
    add_token_frame(&mut reg, tokens, base)?;
    add_sentence_frame(&mut reg, sents, base)?;
    add_line_frame(&mut reg, lines, base)?;
    tracing::info!(graphemes = reg.frame(base).map(|f| f.len()).unwrap_or(0), "loaded text");
    Ok(reg)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::View { source, json, scopes } => {
            let reg = load(&source)?;
            let expr = scopes.join(" ");
            let printed = print_view(&reg, &expr, json)?;
            tracing::info!(items = printed, "view complete");
        }
        Commands::Frames { source, keys } => {
            let reg = load(&source)?;
            let keys: Vec<String> = if keys.is_empty() {
                reg.frame_keys().into_iter().map(str::to_string).collect()
            } else {
                keys
            };
            for key in &keys {
                let frame = reg
                    .frame(key)
                    .ok_or_else(|| ocular::OcularError::UnknownFrame(key.clone()))?;
                println!("{}", serde_json::to_string(frame)?);
            }
        }
        Commands::Shell { source, commands } => {
            let reg = load(&source)?;
            if commands.is_empty() {
                run_shell(reg)?;
            } else {
                run_shell_commands(reg, &commands)?;
            }
        }
    }

    Ok(())
}
