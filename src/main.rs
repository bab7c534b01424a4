use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use porcelain_diff::app::{render_json, OutputMode};
use porcelain_diff::git::{diff_hash, parse_diff, word_diff_args, DiffOptions};
use porcelain_diff::{config, logging};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Parse git word-diff porcelain output into a side-by-side line model
#[derive(Parser)]
#[command(name = "pdiff", version, about)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse captured `git diff --word-diff=porcelain` output and print it as JSON
    Parse {
        /// File holding the raw diff (stdin when omitted or '-')
        input: Option<PathBuf>,

        /// Line models to emit per hunk
        #[arg(long, value_enum)]
        mode: Option<OutputMode>,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print the git command whose output `parse` expects
    Args {
        /// Diff staged changes
        #[arg(long)]
        cached: bool,

        /// Commits or ranges to compare
        commits: Vec<String>,

        /// Limit the diff to these paths (after `--`)
        #[arg(last = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config warnings need a logger before the configured level is known
    logging::init(logging::level_for(LevelFilter::Warn, cli.verbose));
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let config = config::load_config(&cwd);
    logging::init(logging::level_for(
        logging::parse_level(&config.log.level),
        cli.verbose,
    ));

    match cli.command {
        Command::Parse {
            input,
            mode,
            compact,
        } => {
            let raw = read_input(input.as_deref())?;
            let files = parse_diff(&raw).context("Failed to parse diff output")?;
            log::info!("parsed {} file(s)", files.len());

            let mode = mode.unwrap_or(config.output.mode);
            let pretty = config.output.pretty && !compact;
            println!("{}", render_json(&diff_hash(&raw), &files, mode, pretty)?);
        }
        Command::Args {
            cached,
            commits,
            paths,
        } => {
            let options = DiffOptions {
                commits,
                paths,
                cached,
            };
            println!("git {}", word_diff_args(&options).join(" "));
        }
    }

    Ok(())
}

/// Read the raw diff from a file, or stdin for `None` / `-`
fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read diff from stdin")?;
            Ok(raw)
        }
    }
}
