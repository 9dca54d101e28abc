use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            username            TEXT NOT NULL UNIQUE,
            display_name        TEXT NOT NULL,
            password            TEXT NOT NULL,
            role                TEXT NOT NULL DEFAULT 'participant',
            hide_total_counts   INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
        );

        -- Forums, topics and replies share one id space, like the posts of a CMS.
        CREATE TABLE IF NOT EXISTS posts (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            kind        TEXT NOT NULL CHECK (kind IN ('forum', 'topic', 'reply')),
            parent_id   INTEGER REFERENCES posts(id) ON DELETE CASCADE,
            author_id   INTEGER REFERENCES users(id),
            reply_to    INTEGER REFERENCES posts(id) ON DELETE SET NULL,
            title       TEXT NOT NULL DEFAULT '',
            content     TEXT NOT NULL DEFAULT '',
            status      TEXT NOT NULL DEFAULT 'publish',
            author_ip   TEXT,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_parent
            ON posts(parent_id, kind, created_at);

        CREATE INDEX IF NOT EXISTS idx_posts_author
            ON posts(author_id, kind);

        CREATE TABLE IF NOT EXISTS topic_tags (
            topic_id    INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            tag         TEXT NOT NULL,
            position    INTEGER NOT NULL,
            PRIMARY KEY (topic_id, tag)
        );

        CREATE TABLE IF NOT EXISTS favorites (
            user_id     INTEGER NOT NULL REFERENCES users(id),
            topic_id    INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            PRIMARY KEY (user_id, topic_id)
        );

        CREATE TABLE IF NOT EXISTS subscriptions (
            user_id     INTEGER NOT NULL REFERENCES users(id),
            object_id   INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            PRIMARY KEY (user_id, object_id)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
