//! Column lists and row mappers. Rows map straight onto the store records of
//! `bbgraph-types`; freshness and tags are filled in by a second query.

use bbgraph_types::models::{
    ForumRecord, PostStatus, ReplyRecord, Role, TopicRecord, UserRecord,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use tracing::warn;

/// SQL list of statuses that listings and search may show.
pub const READABLE: &str = "('publish', 'closed')";

pub const FORUM_COLUMNS: &str = "
    f.id, f.parent_id, f.title, f.content, f.status, f.created_at,
    (SELECT COUNT(*) FROM posts t
        WHERE t.parent_id = f.id AND t.kind = 'topic' AND t.status IN ('publish', 'closed')),
    (SELECT COUNT(*) FROM posts r JOIN posts t ON r.parent_id = t.id
        WHERE t.parent_id = f.id AND t.kind = 'topic' AND r.kind = 'reply'
          AND t.status IN ('publish', 'closed') AND r.status IN ('publish', 'closed')),
    (SELECT COUNT(*) FROM posts s
        WHERE s.parent_id = f.id AND s.kind = 'forum' AND s.status IN ('publish', 'closed'))";

pub const TOPIC_COLUMNS: &str = "
    p.id, p.parent_id, COALESCE(p.author_id, 0), COALESCE(u.display_name, 'Anonymous'), u.role,
    p.author_ip, p.title, p.content, p.status, p.created_at,
    (SELECT COUNT(*) FROM posts r
        WHERE r.parent_id = p.id AND r.kind = 'reply' AND r.status IN ('publish', 'closed')),
    1 + (SELECT COUNT(DISTINCT r.author_id) FROM posts r
        WHERE r.parent_id = p.id AND r.kind = 'reply' AND r.status IN ('publish', 'closed')
          AND r.author_id != p.author_id)";

pub const REPLY_COLUMNS: &str = "
    p.id, p.parent_id, p.reply_to, COALESCE(p.author_id, 0), COALESCE(u.display_name, 'Anonymous'),
    u.role, p.author_ip, p.content, p.status, p.created_at";

pub const USER_COLUMNS: &str =
    "id, username, display_name, password, role, hide_total_counts, created_at";

pub fn forum_from_row(row: &Row<'_>) -> rusqlite::Result<ForumRecord> {
    Ok(ForumRecord {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        status: parse_status(&row.get::<_, String>(4)?),
        created_at: parse_timestamp(&row.get::<_, String>(5)?),
        topic_count: row.get::<_, i64>(6)?.max(0) as u64,
        reply_count: row.get::<_, i64>(7)?.max(0) as u64,
        subforum_count: row.get::<_, i64>(8)?.max(0) as u64,
        freshness: None,
    })
}

pub fn topic_from_row(row: &Row<'_>) -> rusqlite::Result<TopicRecord> {
    Ok(TopicRecord {
        id: row.get(0)?,
        forum_id: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
        author_id: row.get(2)?,
        author_name: row.get(3)?,
        author_role: parse_role(row.get(4)?),
        author_ip: row.get(5)?,
        title: row.get(6)?,
        content: row.get(7)?,
        status: parse_status(&row.get::<_, String>(8)?),
        created_at: parse_timestamp(&row.get::<_, String>(9)?),
        reply_count: row.get::<_, i64>(10)?.max(0) as u64,
        voice_count: row.get::<_, i64>(11)?.max(0) as u64,
        tags: Vec::new(),
        freshness: None,
    })
}

pub fn reply_from_row(row: &Row<'_>) -> rusqlite::Result<ReplyRecord> {
    Ok(ReplyRecord {
        id: row.get(0)?,
        topic_id: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
        reply_to: row.get(2)?,
        author_id: row.get(3)?,
        author_name: row.get(4)?,
        author_role: parse_role(row.get(5)?),
        author_ip: row.get(6)?,
        content: row.get(7)?,
        status: parse_status(&row.get::<_, String>(8)?),
        created_at: parse_timestamp(&row.get::<_, String>(9)?),
    })
}

pub fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        password_hash: row.get(3)?,
        role: parse_role(row.get(4)?),
        hide_total_counts: row.get(5)?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?),
    })
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS.SSS" without timezone.
/// Parse as naive UTC; RFC 3339 is accepted for rows written by other tools.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

/// Posts by deleted users have no role; treat them as plain participants.
fn parse_role(raw: Option<String>) -> Role {
    match raw {
        Some(raw) => Role::parse(&raw).unwrap_or_else(|| {
            warn!("Unknown role '{}', treating as participant", raw);
            Role::Participant
        }),
        None => Role::Participant,
    }
}

fn parse_status(raw: &str) -> PostStatus {
    PostStatus::parse(raw).unwrap_or_else(|| {
        warn!("Unknown post status '{}', treating as trash", raw);
        PostStatus::Trash
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_sqlite_timestamps_with_and_without_millis() {
        let with_millis = parse_timestamp("2024-03-01 10:20:30.456");
        assert_eq!(with_millis.day(), 1);
        assert_eq!(with_millis.second(), 30);

        let plain = parse_timestamp("2024-03-01 10:20:30");
        assert_eq!(plain.minute(), 20);
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        assert_eq!(parse_timestamp("yesterday"), DateTime::<Utc>::default());
    }
}
