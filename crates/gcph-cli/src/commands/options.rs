//! `source`, `onto`, `ignore_branch` and `set ...` commands.

use gcph_core::OptionKey;

use super::{Context, DispatchError, Flow, require};
use crate::output;

fn set(ctx: &mut Context, key: OptionKey, args: &[&str]) -> Result<Flow, DispatchError> {
    ctx.session.set_option(&ctx.repo, key, args)?;
    Ok(Flow::Continue)
}

/// `source [<ref>]` - branch whose history is triaged.
pub fn source(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    set(ctx, OptionKey::Source, args)?;
    output::info(&format!("Source set to {}", ctx.session.options.source));
    Ok(Flow::Continue)
}

/// `onto [<ref>]` - base the target branches start from.
pub fn onto(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    set(ctx, OptionKey::Onto, args)?;
    if let Some(onto) = &ctx.session.options.onto {
        output::info(&format!("Base set to {onto}"));
    }
    Ok(Flow::Continue)
}

/// `ignore_branch <ref>...` - exclude more history.
pub fn ignore_branch(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    let args = require(args, "ignore_branch", "at least one branch")?;
    set(ctx, OptionKey::IgnoreBranch, args)?;
    let ignored: Vec<&str> = ctx.session.options.ignore.iter().map(String::as_str).collect();
    output::info(&format!("Ignoring {}", ignored.join(", ")));
    Ok(Flow::Continue)
}

/// `set error {print|raise}`
pub fn set_error(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    set(ctx, OptionKey::Error, args)
}

/// `set dryrun {false|true}`
pub fn set_dry_run(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    set(ctx, OptionKey::DryRun, args)
}

/// `set merge {false|true}`
pub fn set_merge(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    set(ctx, OptionKey::Merge, args)
}

/// `set show_blacklist {false|true}`
pub fn set_show_blacklist(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    set(ctx, OptionKey::ShowBlacklist, args)
}
