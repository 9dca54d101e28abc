use bbgraph_types::models::UserId;
use bbgraph_types::store::StoreResult;

use crate::context::ForumContext;

/// "Total posts" badge for an author: the configured label followed by the
/// author's topic + reply count. `None` when the badge is switched off, the
/// author opted out, or the author's role is hidden.
pub fn total_post_count(ctx: &ForumContext, author_id: UserId) -> StoreResult<Option<String>> {
    let display = &ctx.settings.total_counts;
    if !display.enabled {
        return Ok(None);
    }

    let Some(author) = ctx.store.user(author_id)? else {
        return Ok(None);
    };
    if author.hide_total_counts || display.hidden_roles.contains(&author.role) {
        return Ok(None);
    }

    let total = ctx.store.user_post_count(author_id)?;
    Ok(Some(format!("{}{}", display.label, total)))
}
