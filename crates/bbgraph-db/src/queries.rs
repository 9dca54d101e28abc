use crate::Database;
use crate::models::{
    FORUM_COLUMNS, READABLE, REPLY_COLUMNS, TOPIC_COLUMNS, USER_COLUMNS, forum_from_row,
    parse_timestamp, reply_from_row, topic_from_row, user_from_row,
};
use anyhow::Result;
use bbgraph_types::models::{
    ForumRecord, Freshness, NewReply, NewTopic, Page, PageWindow, PostId, PostKind, PostStatus,
    ReplyRecord, Role, SearchHit, SearchQuery, TopicRecord, UserId, UserRecord,
};
use bbgraph_types::store::StoreError;
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use tracing::debug;

/// Search never looks at more than this many words of the query.
const MAX_SEARCH_TERMS: usize = 8;

impl Database {
    // -- Administration (not part of the resolver contract) --

    pub fn create_forum(&self, title: &str, content: &str, parent_id: Option<PostId>) -> Result<PostId> {
        self.with_conn(|conn| {
            if let Some(parent) = parent_id {
                if query_forum(conn, parent)?.is_none() {
                    return Err(StoreError::NotFound("Parent forum").into());
                }
            }
            conn.execute(
                "INSERT INTO posts (kind, parent_id, title, content) VALUES ('forum', ?1, ?2, ?3)",
                params![parent_id, title, content],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn set_post_status(&self, id: PostId, status: PostStatus) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE posts SET status = ?2 WHERE id = ?1", params![id, status.as_str()])?;
            Ok(())
        })
    }

    pub fn set_user_role(&self, id: UserId, role: Role) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE users SET role = ?2 WHERE id = ?1", params![id, role.as_str()])?;
            Ok(())
        })
    }

    pub fn set_hide_total_counts(&self, id: UserId, hide: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE users SET hide_total_counts = ?2 WHERE id = ?1", params![id, hide])?;
            Ok(())
        })
    }

    pub fn forum_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM posts WHERE kind = 'forum'", [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
    }
}

// -- Lookup --

pub fn query_post_kind(conn: &Connection, id: PostId) -> Result<Option<PostKind>> {
    let kind: Option<String> = conn
        .query_row(
            &format!("SELECT kind FROM posts WHERE id = ?1 AND status IN {READABLE}"),
            [id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(kind.as_deref().and_then(PostKind::parse))
}

pub fn query_forum(conn: &Connection, id: PostId) -> Result<Option<ForumRecord>> {
    let forum = conn
        .query_row(
            &format!(
                "SELECT {FORUM_COLUMNS} FROM posts f
                 WHERE f.id = ?1 AND f.kind = 'forum' AND f.status IN {READABLE}"
            ),
            [id],
            forum_from_row,
        )
        .optional()?;

    match forum {
        Some(mut forum) => {
            forum.freshness = query_forum_freshness(conn, forum.id)?;
            Ok(Some(forum))
        }
        None => Ok(None),
    }
}

/// Forums directly below `parent_id`, or the top level when `None`.
pub fn query_forums_by_parent(conn: &Connection, parent_id: Option<PostId>) -> Result<Vec<ForumRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FORUM_COLUMNS} FROM posts f
         WHERE f.kind = 'forum' AND f.parent_id IS ?1 AND f.status IN {READABLE}
         ORDER BY f.title COLLATE NOCASE ASC, f.id ASC"
    ))?;

    let mut forums = stmt
        .query_map([parent_id], forum_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for forum in &mut forums {
        forum.freshness = query_forum_freshness(conn, forum.id)?;
    }
    Ok(forums)
}

pub fn query_topic(conn: &Connection, id: PostId) -> Result<Option<TopicRecord>> {
    let topic = conn
        .query_row(
            &format!(
                "SELECT {TOPIC_COLUMNS} FROM posts p
                 LEFT JOIN users u ON p.author_id = u.id
                 WHERE p.id = ?1 AND p.kind = 'topic' AND p.status IN {READABLE}"
            ),
            [id],
            topic_from_row,
        )
        .optional()?;

    match topic {
        Some(topic) => Ok(Some(complete_topic(conn, topic)?)),
        None => Ok(None),
    }
}

pub fn query_forum_topics(
    conn: &Connection,
    forum_id: PostId,
    window: Option<PageWindow>,
) -> Result<Page<TopicRecord>> {
    let total: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM posts p
             WHERE p.parent_id = ?1 AND p.kind = 'topic' AND p.status IN {READABLE}"
        ),
        [forum_id],
        |row| row.get(0),
    )?;

    // LIMIT -1 is SQLite for "no limit"
    let (limit, offset) = match window {
        Some(w) => (i64::from(w.limit), i64::from(w.offset)),
        None => (-1, 0),
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {TOPIC_COLUMNS} FROM posts p
         LEFT JOIN users u ON p.author_id = u.id
         WHERE p.parent_id = ?1 AND p.kind = 'topic' AND p.status IN {READABLE}
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT ?2 OFFSET ?3"
    ))?;

    let rows = stmt
        .query_map(params![forum_id, limit, offset], topic_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let items = rows
        .into_iter()
        .map(|topic| complete_topic(conn, topic))
        .collect::<Result<Vec<_>>>()?;

    Ok(Page {
        items,
        total: total.max(0) as u64,
    })
}

pub fn query_reply(conn: &Connection, id: PostId) -> Result<Option<ReplyRecord>> {
    let reply = conn
        .query_row(
            &format!(
                "SELECT {REPLY_COLUMNS} FROM posts p
                 LEFT JOIN users u ON p.author_id = u.id
                 WHERE p.id = ?1 AND p.kind = 'reply' AND p.status IN {READABLE}"
            ),
            [id],
            reply_from_row,
        )
        .optional()?;
    Ok(reply)
}

pub fn query_topic_replies(conn: &Connection, topic_id: PostId) -> Result<Vec<ReplyRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REPLY_COLUMNS} FROM posts p
         LEFT JOIN users u ON p.author_id = u.id
         WHERE p.parent_id = ?1 AND p.kind = 'reply' AND p.status IN {READABLE}
         ORDER BY p.created_at ASC, p.id ASC"
    ))?;

    let rows = stmt
        .query_map([topic_id], reply_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn complete_topic(conn: &Connection, mut topic: TopicRecord) -> Result<TopicRecord> {
    topic.tags = query_topic_tags(conn, topic.id)?;
    topic.freshness = query_topic_freshness(conn, topic.id)?;
    Ok(topic)
}

pub fn query_topic_tags(conn: &Connection, topic_id: PostId) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT tag FROM topic_tags WHERE topic_id = ?1 ORDER BY position ASC")?;
    let tags = stmt
        .query_map([topic_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(tags)
}

// -- Freshness --

/// Latest topic or reply anywhere directly inside the forum.
fn query_forum_freshness(conn: &Connection, forum_id: PostId) -> Result<Option<Freshness>> {
    query_freshness(
        conn,
        &format!(
            "(p.kind = 'topic' AND p.parent_id = ?1)
             OR (p.kind = 'reply' AND p.parent_id IN (
                 SELECT t.id FROM posts t
                 WHERE t.kind = 'topic' AND t.parent_id = ?1 AND t.status IN {READABLE}))"
        ),
        forum_id,
    )
}

/// Latest reply of the topic, or the topic itself when nobody answered.
fn query_topic_freshness(conn: &Connection, topic_id: PostId) -> Result<Option<Freshness>> {
    query_freshness(
        conn,
        "(p.kind = 'topic' AND p.id = ?1) OR (p.kind = 'reply' AND p.parent_id = ?1)",
        topic_id,
    )
}

fn query_freshness(conn: &Connection, scope: &str, id: PostId) -> Result<Option<Freshness>> {
    let freshness = conn
        .query_row(
            &format!(
                "SELECT p.id,
                        CASE WHEN p.kind = 'topic' THEN p.id ELSE p.parent_id END,
                        COALESCE(p.author_id, 0),
                        COALESCE(u.display_name, 'Anonymous'),
                        p.created_at
                 FROM posts p
                 LEFT JOIN users u ON p.author_id = u.id
                 WHERE ({scope}) AND p.status IN {READABLE}
                 ORDER BY p.created_at DESC, p.id DESC
                 LIMIT 1"
            ),
            [id],
            |row| {
                Ok(Freshness {
                    post_id: row.get(0)?,
                    topic_id: row.get(1)?,
                    author_id: row.get(2)?,
                    author_name: row.get(3)?,
                    at: parse_timestamp(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()?;
    Ok(freshness)
}

// -- Search --

/// One combined search over the requested kinds, newest first. Every
/// whitespace separated term must appear in the title or the content.
pub fn search(conn: &Connection, query: &SearchQuery) -> Result<Page<SearchHit>> {
    let terms: Vec<&str> = query.terms.split_whitespace().collect();
    if terms.len() > MAX_SEARCH_TERMS {
        debug!(
            "search for {:?} uses only its first {} of {} terms",
            query.terms,
            MAX_SEARCH_TERMS,
            terms.len()
        );
    }
    let terms = &terms[..terms.len().min(MAX_SEARCH_TERMS)];
    let kinds: Vec<&str> = query
        .kinds
        .iter()
        .filter(|kind| matches!(kind, PostKind::Forum | PostKind::Topic))
        .map(|kind| kind.as_str())
        .collect();

    if terms.is_empty() || kinds.is_empty() {
        return Ok(Page::empty());
    }

    let mut clauses = vec![
        format!(
            "p.kind IN ({})",
            kinds.iter().map(|k| format!("'{k}'")).collect::<Vec<_>>().join(", ")
        ),
        format!("p.status IN {READABLE}"),
    ];
    let mut values: Vec<Value> = Vec::with_capacity(terms.len() + 2);
    for term in terms {
        values.push(Value::Text(format!("%{}%", escape_like(term))));
        let n = values.len();
        clauses.push(format!(
            "(p.title LIKE ?{n} ESCAPE '\\' OR p.content LIKE ?{n} ESCAPE '\\')"
        ));
    }
    let filter = clauses.join(" AND ");

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM posts p WHERE {filter}"),
        params_from_iter(values.iter()),
        |row| row.get(0),
    )?;

    values.push(Value::Integer(i64::from(query.window.limit)));
    let limit_n = values.len();
    values.push(Value::Integer(i64::from(query.window.offset)));
    let offset_n = values.len();

    let mut stmt = conn.prepare(&format!(
        "SELECT p.id, p.kind FROM posts p
         WHERE {filter}
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT ?{limit_n} OFFSET ?{offset_n}"
    ))?;

    let matches = stmt
        .query_map(params_from_iter(values.iter()), |row| {
            Ok((row.get::<_, PostId>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut items = Vec::with_capacity(matches.len());
    for (id, kind) in matches {
        let hit = match PostKind::parse(&kind) {
            Some(PostKind::Forum) => query_forum(conn, id)?.map(SearchHit::Forum),
            Some(PostKind::Topic) => query_topic(conn, id)?.map(SearchHit::Topic),
            _ => None,
        };
        if let Some(hit) = hit {
            items.push(hit);
        }
    }

    debug!("search {:?}: {} of {} matches", terms, items.len(), total);
    Ok(Page {
        items,
        total: total.max(0) as u64,
    })
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// -- Writes --

pub fn insert_topic(conn: &Connection, topic: &NewTopic) -> Result<PostId> {
    if query_post_kind(conn, topic.forum_id)? != Some(PostKind::Forum) {
        return Err(StoreError::NotFound("Forum").into());
    }

    conn.execute(
        "INSERT INTO posts (kind, parent_id, author_id, title, content, author_ip)
         VALUES ('topic', ?1, ?2, ?3, ?4, ?5)",
        params![topic.forum_id, topic.author_id, topic.title, topic.content, topic.author_ip],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_reply(conn: &Connection, reply: &NewReply) -> Result<PostId> {
    if query_post_kind(conn, reply.topic_id)? != Some(PostKind::Topic) {
        return Err(StoreError::NotFound("Topic").into());
    }

    if let Some(reply_to) = reply.reply_to {
        match query_reply(conn, reply_to)? {
            Some(parent) if parent.topic_id == reply.topic_id => {}
            _ => {
                return Err(StoreError::Rejected(
                    "The reply being answered is not part of this topic.".into(),
                )
                .into());
            }
        }
    }

    conn.execute(
        "INSERT INTO posts (kind, parent_id, author_id, reply_to, content, author_ip)
         VALUES ('reply', ?1, ?2, ?3, ?4, ?5)",
        params![reply.topic_id, reply.author_id, reply.reply_to, reply.content, reply.author_ip],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_topic(conn: &Connection, id: PostId, title: &str, content: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE posts SET title = ?2, content = ?3 WHERE id = ?1 AND kind = 'topic'",
        params![id, title, content],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound("Topic").into());
    }
    Ok(())
}

pub fn update_reply(conn: &Connection, id: PostId, content: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE posts SET content = ?2 WHERE id = ?1 AND kind = 'reply'",
        params![id, content],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound("Reply").into());
    }
    Ok(())
}

/// Topic replies go with their topic through the parent_id cascade.
pub fn delete_post(conn: &Connection, id: PostId) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM posts WHERE id = ?1 AND kind IN ('topic', 'reply')",
        [id],
    )?;
    Ok(removed > 0)
}

pub fn set_topic_tags(conn: &mut Connection, topic_id: PostId, tags: &[String]) -> Result<()> {
    if query_post_kind(conn, topic_id)? != Some(PostKind::Topic) {
        return Err(StoreError::NotFound("Topic").into());
    }

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM topic_tags WHERE topic_id = ?1", [topic_id])?;
    for (position, tag) in tags.iter().enumerate() {
        tx.execute(
            "INSERT OR IGNORE INTO topic_tags (topic_id, tag, position) VALUES (?1, ?2, ?3)",
            params![topic_id, tag, position as i64],
        )?;
    }
    tx.commit()?;
    Ok(())
}

// -- Users --

pub fn query_user_by_id(conn: &Connection, id: UserId) -> Result<Option<UserRecord>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

pub fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRecord>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            [username],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

/// The first account on a fresh site becomes its keymaster.
pub fn insert_user(conn: &mut Connection, username: &str, password_hash: &str) -> Result<UserRecord> {
    let tx = conn.transaction()?;

    let existing: i64 = tx.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    let role = if existing == 0 { Role::Keymaster } else { Role::Participant };

    let inserted = tx.execute(
        "INSERT INTO users (username, display_name, password, role) VALUES (?1, ?1, ?2, ?3)",
        params![username, password_hash, role.as_str()],
    );
    match inserted {
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            return Err(StoreError::Conflict("Username").into());
        }
        other => other?,
    };
    let id = tx.last_insert_rowid();
    let user = query_user_by_id(&tx, id)?.ok_or(StoreError::NotFound("User"))?;

    tx.commit()?;
    Ok(user)
}

pub fn query_user_post_count(conn: &Connection, id: UserId) -> Result<u64> {
    let count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM posts
             WHERE author_id = ?1 AND kind IN ('topic', 'reply') AND status IN {READABLE}"
        ),
        [id],
        |row| row.get(0),
    )?;
    Ok(count.max(0) as u64)
}

// -- Favorites --

pub fn is_favorite(conn: &Connection, user_id: UserId, topic_id: PostId) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM favorites WHERE user_id = ?1 AND topic_id = ?2",
            params![user_id, topic_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn add_favorite(conn: &Connection, user_id: UserId, topic_id: PostId) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO favorites (user_id, topic_id) VALUES (?1, ?2)",
        params![user_id, topic_id],
    )?;
    Ok(())
}

pub fn remove_favorite(conn: &Connection, user_id: UserId, topic_id: PostId) -> Result<()> {
    conn.execute(
        "DELETE FROM favorites WHERE user_id = ?1 AND topic_id = ?2",
        params![user_id, topic_id],
    )?;
    Ok(())
}

pub fn query_favorite_topic_ids(conn: &Connection, user_id: UserId) -> Result<Vec<PostId>> {
    let mut stmt = conn.prepare("SELECT topic_id FROM favorites WHERE user_id = ?1 ORDER BY topic_id ASC")?;
    let ids = stmt
        .query_map([user_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<PostId>, _>>()?;
    Ok(ids)
}

// -- Subscriptions --

pub fn is_subscribed(conn: &Connection, user_id: UserId, object_id: PostId) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM subscriptions WHERE user_id = ?1 AND object_id = ?2",
            params![user_id, object_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn add_subscription(conn: &Connection, user_id: UserId, object_id: PostId) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO subscriptions (user_id, object_id) VALUES (?1, ?2)",
        params![user_id, object_id],
    )?;
    Ok(())
}

pub fn remove_subscription(conn: &Connection, user_id: UserId, object_id: PostId) -> Result<()> {
    conn.execute(
        "DELETE FROM subscriptions WHERE user_id = ?1 AND object_id = ?2",
        params![user_id, object_id],
    )?;
    Ok(())
}

pub fn query_subscription_ids(conn: &Connection, user_id: UserId, kind: PostKind) -> Result<Vec<PostId>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT s.object_id FROM subscriptions s
         JOIN posts p ON p.id = s.object_id
         WHERE s.user_id = ?1 AND p.kind = ?2 AND p.status IN {READABLE}
         ORDER BY s.object_id ASC"
    ))?;
    let ids = stmt
        .query_map(params![user_id, kind.as_str()], |row| row.get(0))?
        .collect::<std::result::Result<Vec<PostId>, _>>()?;
    Ok(ids)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
