use bbgraph_db::Database;
use bbgraph_types::models::{
    NewReply, NewTopic, PageWindow, PostKind, PostStatus, Role, SearchHit, SearchQuery,
};
use bbgraph_types::store::{ContentStore, StoreError};

fn topic(forum_id: i64, author_id: i64, title: &str, content: &str) -> NewTopic {
    NewTopic {
        forum_id,
        author_id,
        title: title.into(),
        content: content.into(),
        author_ip: Some("127.0.0.1".into()),
    }
}

fn reply(topic_id: i64, author_id: i64, content: &str) -> NewReply {
    NewReply {
        topic_id,
        author_id,
        reply_to: None,
        content: content.into(),
        author_ip: None,
    }
}

#[test]
fn first_user_is_keymaster() {
    let db = Database::open_in_memory().unwrap();
    let first = db.create_user("alice", "hash").unwrap();
    let second = db.create_user("bob", "hash").unwrap();

    assert_eq!(first.role, Role::Keymaster);
    assert_eq!(second.role, Role::Participant);
    assert_eq!(second.display_name, "bob");
    assert!(db.user_by_username("bob").unwrap().is_some());
}

#[test]
fn duplicate_usernames_conflict() {
    let db = Database::open_in_memory().unwrap();
    db.create_user("alice", "hash").unwrap();

    let err = db.create_user("alice", "other").unwrap_err();
    assert!(matches!(err, StoreError::Conflict("Username")), "got {err:?}");
    assert_eq!(db.create_user("bob", "hash").unwrap().role, Role::Participant);
}

#[test]
fn forum_counts_and_freshness_follow_activity() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let bob = db.create_user("bob", "hash").unwrap().id;

    let forum = db.create_forum("General", "Talk", None).unwrap();
    let sub = db.create_forum("Off-topic", "", Some(forum)).unwrap();
    let t1 = db.insert_topic(topic(forum, alice, "Hello", "First post")).unwrap();
    db.insert_reply(reply(t1, bob, "Hi alice")).unwrap();
    let last = db.insert_reply(reply(t1, alice, "Hi bob")).unwrap();

    let record = db.forum(forum).unwrap().unwrap();
    assert_eq!(record.topic_count, 1);
    assert_eq!(record.reply_count, 2);
    assert_eq!(record.post_count(), 3);
    assert_eq!(record.subforum_count, 1);
    let freshness = record.freshness.unwrap();
    assert_eq!(freshness.post_id, last);
    assert_eq!(freshness.topic_id, t1);
    assert_eq!(freshness.author_name, "alice");

    let topic = db.topic(t1).unwrap().unwrap();
    assert_eq!(topic.reply_count, 2);
    assert_eq!(topic.voice_count, 2);
    assert_eq!(topic.author_ip.as_deref(), Some("127.0.0.1"));

    let subforums = db.subforums(forum).unwrap();
    assert_eq!(subforums.len(), 1);
    assert_eq!(subforums[0].id, sub);
    assert!(subforums[0].freshness.is_none());

    let top = db.top_level_forums().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, forum);
}

#[test]
fn forum_topics_reports_total_beyond_the_page() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("General", "", None).unwrap();
    let ids: Vec<i64> = (0..5)
        .map(|i| db.insert_topic(topic(forum, alice, &format!("T{i}"), "body")).unwrap())
        .collect();

    let page = db
        .forum_topics(forum, Some(PageWindow { offset: 1, limit: 2 }))
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    // newest first
    assert_eq!(page.items[0].id, ids[3]);
    assert_eq!(page.items[1].id, ids[2]);

    let all = db.forum_topics(forum, None).unwrap();
    assert_eq!(all.items.len(), 5);
}

#[test]
fn hidden_posts_are_not_listed() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("General", "", None).unwrap();
    let spam = db.insert_topic(topic(forum, alice, "Buy now", "cheap")).unwrap();
    db.set_post_status(spam, PostStatus::Spam).unwrap();

    assert!(db.topic(spam).unwrap().is_none());
    assert_eq!(db.forum(forum).unwrap().unwrap().topic_count, 0);
    assert_eq!(db.post_kind(spam).unwrap(), None);
}

#[test]
fn search_spans_forums_and_topics_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("Rust help", "Ask about rust", None).unwrap();
    let t1 = db.insert_topic(topic(forum, alice, "Borrow checker", "rust lifetimes")).unwrap();
    let t2 = db.insert_topic(topic(forum, alice, "Cargo", "unrelated")).unwrap();
    db.insert_reply(reply(t2, alice, "rust in a reply is not searched")).unwrap();

    let query = SearchQuery {
        terms: "RUST".into(),
        kinds: vec![PostKind::Forum, PostKind::Topic],
        window: PageWindow { offset: 0, limit: 10 },
    };
    let page = db.search(&query).unwrap();
    assert_eq!(page.total, 2);
    let kinds: Vec<PostKind> = page.items.iter().map(SearchHit::kind).collect();
    assert_eq!(kinds, vec![PostKind::Topic, PostKind::Forum]);
    match &page.items[0] {
        SearchHit::Topic(t) => assert_eq!(t.id, t1),
        other => panic!("unexpected hit {other:?}"),
    }

    let second = db
        .search(&SearchQuery {
            window: PageWindow { offset: 1, limit: 1 },
            ..query.clone()
        })
        .unwrap();
    assert_eq!(second.total, 2);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].kind(), PostKind::Forum);
}

#[test]
fn search_treats_like_wildcards_literally() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("General", "", None).unwrap();
    db.insert_topic(topic(forum, alice, "Sale", "50% off")).unwrap();
    db.insert_topic(topic(forum, alice, "Other", "500 things")).unwrap();

    let page = db
        .search(&SearchQuery {
            terms: "50%".into(),
            kinds: vec![PostKind::Topic],
            window: PageWindow { offset: 0, limit: 10 },
        })
        .unwrap();
    assert_eq!(page.total, 1);
}

#[test]
fn search_ignores_terms_past_the_eighth() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("General", "", None).unwrap();
    db.insert_topic(topic(forum, alice, "Words", "a b c d e f g h")).unwrap();

    let query = |terms: &str| SearchQuery {
        terms: terms.into(),
        kinds: vec![PostKind::Topic],
        window: PageWindow { offset: 0, limit: 10 },
    };
    // the ninth word appears nowhere but is never looked at
    assert_eq!(db.search(&query("a b c d e f g h zzz")).unwrap().total, 1);
    assert_eq!(db.search(&query("a b c d e f g zzz")).unwrap().total, 0);
}

#[test]
fn writes_against_missing_parents_are_rejected() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("General", "", None).unwrap();
    let t1 = db.insert_topic(topic(forum, alice, "A", "a")).unwrap();

    assert!(matches!(
        db.insert_topic(topic(9999, alice, "B", "b")),
        Err(StoreError::NotFound("Forum"))
    ));
    // a topic id is not a forum id
    assert!(matches!(
        db.insert_topic(topic(t1, alice, "B", "b")),
        Err(StoreError::NotFound("Forum"))
    ));
    assert!(matches!(
        db.insert_reply(reply(forum, alice, "x")),
        Err(StoreError::NotFound("Topic"))
    ));
    assert!(matches!(db.update_reply(t1, "x"), Err(StoreError::NotFound("Reply"))));
}

#[test]
fn reply_to_must_belong_to_the_same_topic() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("General", "", None).unwrap();
    let t1 = db.insert_topic(topic(forum, alice, "A", "a")).unwrap();
    let t2 = db.insert_topic(topic(forum, alice, "B", "b")).unwrap();
    let r1 = db.insert_reply(reply(t1, alice, "first")).unwrap();

    let threaded = NewReply { reply_to: Some(r1), ..reply(t1, alice, "second") };
    let r2 = db.insert_reply(threaded).unwrap();
    assert_eq!(db.reply(r2).unwrap().unwrap().reply_to, Some(r1));

    let crossed = NewReply { reply_to: Some(r1), ..reply(t2, alice, "elsewhere") };
    assert!(matches!(db.insert_reply(crossed), Err(StoreError::Rejected(_))));
}

#[test]
fn deleting_a_topic_removes_its_replies() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("General", "", None).unwrap();
    let t1 = db.insert_topic(topic(forum, alice, "A", "a")).unwrap();
    let r1 = db.insert_reply(reply(t1, alice, "r")).unwrap();
    db.add_favorite(alice, t1).unwrap();

    assert!(db.delete_post(t1).unwrap());
    assert!(db.reply(r1).unwrap().is_none());
    assert!(db.favorite_topic_ids(alice).unwrap().is_empty());
    assert!(!db.delete_post(t1).unwrap());
    // forums are not deletable through the resolver contract
    assert!(!db.delete_post(forum).unwrap());
}

#[test]
fn tags_replace_previous_set_in_order() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("General", "", None).unwrap();
    let t1 = db.insert_topic(topic(forum, alice, "A", "a")).unwrap();

    db.set_topic_tags(t1, &["b".into(), "a".into()]).unwrap();
    db.set_topic_tags(t1, &["c".into(), "a".into()]).unwrap();
    assert_eq!(db.topic(t1).unwrap().unwrap().tags, vec!["c", "a"]);
}

#[test]
fn subscriptions_are_filtered_by_kind() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("General", "", None).unwrap();
    let t1 = db.insert_topic(topic(forum, alice, "A", "a")).unwrap();

    db.add_subscription(alice, forum).unwrap();
    db.add_subscription(alice, t1).unwrap();
    db.add_subscription(alice, t1).unwrap();

    assert!(db.is_subscribed(alice, t1).unwrap());
    assert_eq!(db.subscription_ids(alice, PostKind::Topic).unwrap(), vec![t1]);
    assert_eq!(db.subscription_ids(alice, PostKind::Forum).unwrap(), vec![forum]);

    db.remove_subscription(alice, t1).unwrap();
    assert!(!db.is_subscribed(alice, t1).unwrap());
}

#[test]
fn user_post_count_includes_topics_and_replies() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice", "hash").unwrap().id;
    let forum = db.create_forum("General", "", None).unwrap();
    let t1 = db.insert_topic(topic(forum, alice, "A", "a")).unwrap();
    db.insert_reply(reply(t1, alice, "r1")).unwrap();
    db.insert_reply(reply(t1, alice, "r2")).unwrap();

    assert_eq!(db.user_post_count(alice).unwrap(), 3);
}

#[test]
fn on_disk_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forum.db");

    let forum = {
        let db = Database::open(&path).unwrap();
        db.create_forum("General", "", None).unwrap()
    };

    let db = Database::open(&path).unwrap();
    assert_eq!(db.forum(forum).unwrap().unwrap().title, "General");
    assert_eq!(db.forum_count().unwrap(), 1);
}
