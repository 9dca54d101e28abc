use bbgraph_types::models::{ForumRecord, PostId, TopicRecord};
use bbgraph_types::store::{ContentStore, StoreResult};
use tracing::debug;

/// What `bbpressForums` hands back for a forum id.
#[derive(Debug, Clone)]
pub enum ForumChildren {
    Forums(Vec<ForumRecord>),
    Topics(Vec<TopicRecord>),
}

/// Subforums when the forum has any, otherwise its topics when it has any,
/// otherwise the top-level forum list. Unknown and empty forums fall through
/// to the top level as well.
pub fn forum_children(store: &dyn ContentStore, forum_id: Option<PostId>) -> StoreResult<ForumChildren> {
    if let Some(id) = forum_id {
        let subforums = store.subforums(id)?;
        if !subforums.is_empty() {
            debug!("forum {} has {} subforums", id, subforums.len());
            return Ok(ForumChildren::Forums(subforums));
        }

        if let Some(forum) = store.forum(id)? {
            if forum.topic_count > 0 {
                let topics = store.forum_topics(id, None)?;
                debug!("forum {} has {} topics", id, topics.items.len());
                return Ok(ForumChildren::Topics(topics.items));
            }
        }

        debug!("forum {} has no subforums or topics, listing top-level forums", id);
    }

    Ok(ForumChildren::Forums(store.top_level_forums()?))
}
