use bbgraph_types::models::PostId;
use bbgraph_types::store::StoreResult;
use tracing::debug;

use crate::context::ForumContext;
use crate::sanitize;

/// Splits comma separated input into clean, unique tag names, keeping the
/// order of first appearance.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for piece in raw.split(',') {
        let tag = sanitize::text_field(piece);
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Replaces the topic's tags with `raw`. Nothing happens when tagging is
/// disabled or no tag input was sent, so edits without tags keep the old set.
pub fn apply_tags(ctx: &ForumContext, topic_id: PostId, raw: Option<&str>) -> StoreResult<bool> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(false);
    };
    if !ctx.settings.allow_topic_tags {
        debug!("topic tags disabled, ignoring tags for topic {}", topic_id);
        return Ok(false);
    }

    let tags = parse_tags(raw);
    ctx.store.set_topic_tags(topic_id, &tags)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_and_empty_entries_are_dropped() {
        assert_eq!(parse_tags("a, a, b,,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn tags_are_sanitized_before_dedup() {
        assert_eq!(parse_tags(" <i>rust</i> ,rust,  async  io "), vec!["rust", "async io"]);
    }

    #[test]
    fn only_separators_yields_nothing() {
        assert!(parse_tags(" , ,, ").is_empty());
    }
}
