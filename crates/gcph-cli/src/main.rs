//! gcph - interactive cherry-pick helper.
//!
//! Lists the commits of a source branch that are missing from a base
//! branch, flags the ones that look already applied, and replays the
//! accepted ones onto new branches.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{ArgAction, Parser};
use clap_complete::Shell;
use gcph_core::{Blacklist, Config, ErrorPolicy, History, Options, Scorer, Session};
use gcph_git::Repository;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod prompt;

use commands::{Context, Flow};

/// Interactive helper for moving commits between branches.
#[derive(Debug, Parser)]
#[command(name = "gcph", version, about)]
pub struct Cli {
    /// Branch whose history is triaged [default: HEAD].
    #[arg(long, value_name = "REF")]
    source: Option<String>,

    /// Base branch the target branches start from.
    #[arg(long, value_name = "REF")]
    onto: Option<String>,

    /// Exclude the history of another branch (repeatable).
    #[arg(long = "ignore-branch", value_name = "REF")]
    ignore_branch: Vec<String>,

    /// Print replay actions instead of running them.
    #[arg(long)]
    dry_run: bool,

    /// Classify merge commits instead of skipping them.
    #[arg(long)]
    merges: bool,

    /// Abort on the first failing command.
    #[arg(long)]
    raise_errors: bool,

    /// Config file [default: <config dir>/gcph/config.toml].
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run a `;`-separated command line, then exit.
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    command: Option<String>,

    /// Suppress informational output.
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        commands::completions::run(shell);
        return ExitCode::SUCCESS;
    }

    init_tracing(cli.verbose);
    output::set_quiet(cli.quiet);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("GCPH_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    let config_path = cli.config.clone().or_else(Config::default_path);
    let config = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    tracing::debug!(path = ?config_path, "config loaded");

    let repo = Repository::open_current().context("Not inside a git repository")?;

    let blacklist_path = config.paths.blacklist_path();
    let history_path = config.paths.history_path();
    let blacklist = match &blacklist_path {
        Some(path) => Blacklist::load(path)?,
        None => Blacklist::new(),
    };
    let history = match &history_path {
        Some(path) => History::load(path, config.paths.history_length)?,
        None => History::new(config.paths.history_length),
    };

    let mut session = Session::new(
        Options::from(&config.general),
        blacklist,
        Scorer::new(config.similarity.line_threshold),
    );
    session.options.dry_run |= cli.dry_run;
    session.options.include_merges |= cli.merges;
    if cli.raise_errors {
        session.options.error_policy = ErrorPolicy::Raise;
    }

    let mut ctx = Context {
        repo,
        session,
        history,
        config,
        interactive: std::io::stdin().is_terminal() && std::io::stdout().is_terminal(),
    };

    let result = apply_flags(&mut ctx, &cli).and_then(|()| match &cli.command {
        Some(line) => prompt::handle_line(&mut ctx, line).map(|_| 0),
        None => prompt::run_loop(&mut ctx),
    });

    if let Some(path) = &blacklist_path {
        ctx.session.blacklist().save(path)?;
    }
    if let Some(path) = &history_path {
        ctx.history.save(path)?;
    }

    let code = result?;
    Ok(u8::try_from(code).unwrap_or(1))
}

/// Apply reference flags through the same validation as the commands.
fn apply_flags(ctx: &mut Context, cli: &Cli) -> Result<()> {
    let mut lines = Vec::new();
    if let Some(source) = &cli.source {
        lines.push(format!("source {source}"));
    }
    if let Some(onto) = &cli.onto {
        lines.push(format!("onto {onto}"));
    }
    if !cli.ignore_branch.is_empty() {
        lines.push(format!("ignore_branch {}", cli.ignore_branch.join(" ")));
    }

    for line in lines {
        if commands::execute_line(ctx, &line)? == Flow::Exit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "gcph",
            "--onto",
            "main",
            "--ignore-branch",
            "a",
            "--ignore-branch",
            "b",
            "-vv",
            "-c",
            "print",
        ]);
        assert_eq!(cli.onto.as_deref(), Some("main"));
        assert_eq!(cli.ignore_branch, vec!["a", "b"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.command.as_deref(), Some("print"));
    }
}
