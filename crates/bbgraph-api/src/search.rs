use std::collections::HashMap;

use bbgraph_types::models::{ForumRecord, PageWindow, PostId, PostKind, SearchHit, SearchQuery};
use bbgraph_types::store::StoreResult;

use crate::context::ForumContext;
use crate::ids::to_id;
use crate::pagination::has_more;
use crate::schema::types::{PostType, SearchPage, SearchResult, freshness_link};

/// Runs one search across forums and topics and flattens every hit into a
/// `SearchResult`. A blank query matches nothing.
pub fn search_content(ctx: &ForumContext, terms: &str, window: PageWindow) -> StoreResult<SearchPage> {
    if terms.trim().is_empty() {
        return Ok(SearchPage { results: Vec::new(), has_more: false });
    }

    let query = SearchQuery {
        terms: terms.trim().to_string(),
        kinds: vec![PostKind::Forum, PostKind::Topic],
        window,
    };
    let page = ctx.store.search(&query)?;

    // Parent lookups repeat across hits from the same forum.
    let mut parents = ParentCache::default();
    let mut results = Vec::with_capacity(page.items.len());
    for hit in &page.items {
        results.push(normalize(ctx, &mut parents, hit)?);
    }

    Ok(SearchPage {
        has_more: has_more(page.total, window, results.len()),
        results,
    })
}

fn normalize(ctx: &ForumContext, parents: &mut ParentCache, hit: &SearchHit) -> StoreResult<SearchResult> {
    let settings = &ctx.settings;
    let result = match hit {
        SearchHit::Forum(forum) => {
            let container = forum.parent_id;
            SearchResult {
                id: to_id(forum.id),
                post_type: PostType::Forum,
                title: forum.title.clone(),
                content: forum.content.clone(),
                topic_count: Some(forum.topic_count as i64),
                post_count: forum.post_count() as i64,
                voice_count: None,
                freshness_link: forum.freshness.as_ref().map(|f| freshness_link(f, settings)),
                freshness_author: forum.freshness.as_ref().map(|f| f.author_name.clone()),
                created_at: forum.created_at.to_rfc3339(),
                forum_id: parents.parent_of(ctx, container)?.map(to_id),
                subforum_id: container.map(to_id),
            }
        }
        SearchHit::Topic(topic) => SearchResult {
            id: to_id(topic.id),
            post_type: PostType::Topic,
            title: topic.title.clone(),
            content: topic.content.clone(),
            topic_count: None,
            post_count: topic.post_count() as i64,
            voice_count: Some(topic.voice_count as i64),
            freshness_link: topic.freshness.as_ref().map(|f| freshness_link(f, settings)),
            freshness_author: topic.freshness.as_ref().map(|f| f.author_name.clone()),
            created_at: topic.created_at.to_rfc3339(),
            forum_id: parents.parent_of(ctx, Some(topic.forum_id))?.map(to_id),
            subforum_id: Some(to_id(topic.forum_id)),
        },
    };
    Ok(result)
}

/// Request-scoped memo of forum -> parent forum.
#[derive(Default)]
struct ParentCache {
    seen: HashMap<PostId, Option<PostId>>,
}

impl ParentCache {
    fn parent_of(&mut self, ctx: &ForumContext, forum_id: Option<PostId>) -> StoreResult<Option<PostId>> {
        let Some(id) = forum_id else {
            return Ok(None);
        };
        if let Some(parent) = self.seen.get(&id) {
            return Ok(*parent);
        }
        let parent = ctx.store.forum(id)?.and_then(|forum: ForumRecord| forum.parent_id);
        self.seen.insert(id, parent);
        Ok(parent)
    }
}
