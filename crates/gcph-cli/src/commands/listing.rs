//! `update`, `print`, `info` and `show` commands.

use std::time::Duration;

use gcph_git::GitOps;
use indicatif::{ProgressBar, ProgressStyle};

use super::{Context, DispatchError, Flow, parse_indices, require};
use crate::output;

/// `update [quiet]` - recompute candidates, then print them unless quiet.
pub fn update(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    refresh(ctx)?;
    if !args.contains(&"quiet") {
        print_listing(ctx);
    }
    Ok(Flow::Continue)
}

/// `print` - list visible candidates, running `update` first if needed.
pub fn print(ctx: &mut Context, _args: &[&str]) -> Result<Flow, DispatchError> {
    if ctx.session.triage().is_none() {
        refresh(ctx)?;
    }
    print_listing(ctx);
    Ok(Flow::Continue)
}

/// `info <index...|all>` - similarity to excluded commits with the same timestamp.
pub fn info(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    let args = require(args, "info", "commit indices or `all`")?;
    let width = output::index_width(ctx.session.candidate_count());

    for index in parse_indices(&ctx.session, args)? {
        let candidate = ctx.session.candidate(index)?;
        if let Some(status) = ctx.session.status(candidate) {
            output::essential(&output::candidate_line(
                index,
                width,
                &status,
                &candidate.commit,
            ));
        }

        match ctx.session.similar_commits(&ctx.repo, index)? {
            None => output::essential("There are no known similar commits."),
            Some(similar) => {
                for (commit, score) in similar {
                    let label = format!("{:.1}%", score * 100.0);
                    output::essential(&output::related_line(width, &label, &commit));
                }
            }
        }
        output::essential("");
    }
    Ok(Flow::Continue)
}

/// `show <index...|all>` - full backend output for each candidate.
pub fn show(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    let args = require(args, "show", "commit indices or `all`")?;

    for index in parse_indices(&ctx.session, args)? {
        let id = ctx.session.candidate(index)?.commit.id;
        let text = ctx.repo.show_text(id).map_err(gcph_core::Error::from)?;
        output::essential(&text);
    }
    Ok(Flow::Continue)
}

fn refresh(ctx: &mut Context) -> Result<(), DispatchError> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Walking history...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = ctx.session.update(&ctx.repo).map(|t| t.candidates.len());
    spinner.finish_and_clear();

    let count = result?;
    output::success(&format!("Found {count} candidate commits"));
    Ok(())
}

fn print_listing(ctx: &Context) {
    let session = &ctx.session;
    let width = output::index_width(session.candidate_count());

    output::essential(&output::legend());
    for entry in session.visible() {
        output::essential(&output::candidate_line(
            entry.index,
            width,
            &entry.status,
            &entry.candidate.commit,
        ));
    }

    let hidden = session.hidden_count();
    if hidden > 0 {
        output::essential(&format!("Not showing {hidden} blacklisted commits"));
    }
}
