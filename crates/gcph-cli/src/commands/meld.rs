//! `meld <index>` - open the least similar pair of diffs in a comparison tool.

use gcph_core::{least_similar_pair, review};

use super::{Context, DispatchError, Flow, parse_indices, require};
use crate::output;

/// Run the configured merge tool on the most dissimilar pair among a
/// candidate's diff and the diffs of excluded commits sharing its timestamp.
pub fn meld(ctx: &mut Context, args: &[&str]) -> Result<Flow, DispatchError> {
    let args = require(args, "meld", "a commit index")?;

    for index in parse_indices(&ctx.session, args)? {
        let Some(diffs) = ctx.session.review_diffs(&ctx.repo, index)? else {
            output::essential("There are no known similar commits.");
            continue;
        };

        let blobs: Vec<&str> = diffs.iter().map(String::as_str).collect();
        let Some(pair) = least_similar_pair(&ctx.session.scorer(), &blobs) else {
            continue;
        };

        output::info(&format!(
            "Comparing diffs {} and {} ({:.1}% similar)",
            pair.indices.0,
            pair.indices.1,
            pair.score * 100.0
        ));
        let status = review::launch(&ctx.config.tools.merge_tool, &pair)?;
        if !status.success() {
            output::warn(&format!("{} exited with {status}", ctx.config.tools.merge_tool));
        }
    }
    Ok(Flow::Continue)
}
