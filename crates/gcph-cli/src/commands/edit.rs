//! `branch`, `add`, `delete` and `blacklist_commits` commands.

use colored::Colorize;
use gcph_git::GitOps;

use super::{Context, DispatchError, Flow, parse_indices, require};
use crate::output;

/// `branch [<name>...]` - declare target branches, or list them.
pub fn branch(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    if args.is_empty() {
        list_branches(ctx)?;
        return Ok(Flow::Continue);
    }

    for name in args {
        if ctx.session.declare_branch(name)? {
            output::success(&format!("Declared branch {}", name.cyan()));
        } else {
            output::info(&format!("Branch {name} already declared"));
        }
    }
    Ok(Flow::Continue)
}

/// `add <branch> <index>...` - accept candidates for a branch.
pub fn add(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    let args = require(args, "add", "a branch")?;
    let (branch, rest) = (args[0], &args[1..]);
    let rest = require(rest, &format!("add {branch}"), "commit indices")?;

    let indices = parse_indices(&ctx.session, rest)?;
    ctx.session.assign(branch, &indices)?;

    let total = ctx.session.find_target(branch).map_or(0, |t| t.commits.len());
    output::success(&format!(
        "Added {} commit(s) to {} ({total} total)",
        indices.len(),
        branch.cyan()
    ));
    Ok(Flow::Continue)
}

/// `delete <branch>...` - forget target branches.
pub fn delete(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    let args = require(args, "delete", "a branch")?;

    for name in args {
        let removed = ctx.session.remove_branch(name)?;
        output::success(&format!(
            "Deleted branch {} ({} commit(s) released)",
            name.cyan(),
            removed.commits.len()
        ));
    }
    Ok(Flow::Continue)
}

/// `blacklist_commits <index...|all>` - hide candidates for good.
pub fn blacklist_commits(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    let args = require(args, "blacklist_commits", "commit indices or `all`")?;

    let mut added = 0;
    for index in parse_indices(&ctx.session, args)? {
        if ctx.session.blacklist_commit(index)? {
            added += 1;
        }
    }
    output::success(&format!("Blacklisted {added} commit(s)"));
    Ok(Flow::Continue)
}

fn list_branches(ctx: &Context) -> Result<(), DispatchError> {
    let targets = ctx.session.targets();
    if targets.is_empty() {
        output::info("No branches declared - use `branch <name>`");
        return Ok(());
    }

    for target in targets {
        output::essential(&format!(
            "{} ({} commit(s))",
            target.name.as_str().cyan().bold(),
            target.commits.len()
        ));
        for id in &target.commits {
            let commit = ctx.repo.commit(*id).map_err(gcph_core::Error::from)?;
            output::essential(&format!(
                "    {} {}",
                commit.short_id().yellow(),
                commit.summary
            ));
        }
    }
    Ok(())
}
