//! `run` command - create the target branches and cherry-pick into them.

use std::io::BufRead;

use colored::Colorize;
use gcph_core::{ReplayAction, ReplayHooks, ReplayResult, Resolution, replay};
use gcph_git::CommitInfo;
use inquire::{Confirm, InquireError};

use super::{Context, DispatchError, Flow};
use crate::output;

/// Replay hooks that print actions and ask on the console after a conflict.
struct ConsoleHooks {
    interactive: bool,
}

impl ReplayHooks for ConsoleHooks {
    fn on_action(&mut self, action: &ReplayAction, dry_run: bool) {
        if dry_run {
            output::essential(&format!("{} {action}", "would run".dimmed()));
        } else {
            output::info(&action.to_string());
        }
    }

    fn await_resolution(
        &mut self,
        branch: &str,
        commit: &CommitInfo,
        pick_output: &str,
    ) -> gcph_core::Result<Resolution> {
        output::warn(&format!(
            "Cherry-pick of {} {} onto {branch} failed",
            commit.short_id(),
            commit.summary
        ));
        for line in pick_output.lines() {
            output::detail(&format!("  {line}"));
        }

        if self.interactive {
            let answer = Confirm::new("Resolve the conflicts and commit the changes. Done?")
                .with_default(true)
                .prompt();
            return match answer {
                Ok(_) => Ok(Resolution::Retry),
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    Ok(Resolution::Abandon)
                }
                Err(e) => Err(std::io::Error::other(e.to_string()).into()),
            };
        }

        output::essential("Resolve the conflicts and commit the changes (press enter to continue)");
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(Resolution::Abandon);
        }
        Ok(Resolution::Retry)
    }
}

/// `run` - replay every declared branch onto the base.
pub fn run(ctx: &mut Context, _args: &[&str]) -> Result<Flow, DispatchError> {
    let dry_run = ctx.session.options.dry_run;
    let mut hooks = ConsoleHooks {
        interactive: ctx.interactive,
    };

    match replay(&ctx.repo, &ctx.session, &mut hooks)? {
        ReplayResult::Complete { branches, picked } if dry_run => {
            output::info(&format!(
                "Dry run - {branches} branch(es) planned, nothing changed"
            ));
            tracing::debug!(branches, picked, "dry run finished");
            Ok(Flow::Continue)
        }
        ReplayResult::Complete { branches, picked } => {
            output::success(&format!(
                "Created {branches} branch(es) with {picked} commit(s)"
            ));
            output::essential("Thank you for using gcph. Please call again.");
            Ok(Flow::Exit)
        }
        ReplayResult::HaltedOnConflict { branch, commit } => {
            output::warn(&format!(
                "Stopped on {branch} at {} {} - the working tree still has conflicts",
                commit.short_id(),
                commit.summary
            ));
            Ok(Flow::Continue)
        }
    }
}
