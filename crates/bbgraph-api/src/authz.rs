use bbgraph_types::models::{
    Actor, Capability, ForumRecord, PostKind, PostStatus, ReplyRecord, Role, TopicRecord, UserId,
};

/// The part of a post that permission checks look at.
#[derive(Debug, Clone, Copy)]
pub struct ContentItem {
    pub kind: PostKind,
    pub author_id: UserId,
}

impl From<&TopicRecord> for ContentItem {
    fn from(topic: &TopicRecord) -> Self {
        Self { kind: PostKind::Topic, author_id: topic.author_id }
    }
}

impl From<&ReplyRecord> for ContentItem {
    fn from(reply: &ReplyRecord) -> Self {
        Self { kind: PostKind::Reply, author_id: reply.author_id }
    }
}

/// Capability checks, injected so hosts can plug in their own permission model.
pub trait Authorizer: Send + Sync {
    fn can_edit(&self, actor: &Actor, item: &ContentItem) -> bool;
    fn can_delete(&self, actor: &Actor, item: &ContentItem) -> bool;
    fn can_create_topic(&self, actor: &Actor, forum: &ForumRecord) -> bool;
    fn can_create_reply(&self, actor: &Actor, forum: &ForumRecord, topic: &TopicRecord) -> bool;
    fn can_edit_subscriptions(&self, actor: &Actor, user_id: UserId) -> bool;
    fn can_view_author_ip(&self, actor: &Actor) -> bool;
}

/// Role based rules: authors manage their own posts, keymasters and
/// moderators manage everything, closed forums and topics only take
/// moderator posts.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleAuthorizer;

impl RoleAuthorizer {
    fn owns(actor: &Actor, item: &ContentItem) -> bool {
        actor.user_id == Some(item.author_id) && actor.role.is_some_and(|r| r != Role::Blocked)
    }
}

impl Authorizer for RoleAuthorizer {
    fn can_edit(&self, actor: &Actor, item: &ContentItem) -> bool {
        let others = match item.kind {
            PostKind::Topic => Capability::EditOthersTopics,
            PostKind::Reply => Capability::EditOthersReplies,
            PostKind::Forum => Capability::Moderate,
        };
        Self::owns(actor, item) || actor.can(others)
    }

    fn can_delete(&self, actor: &Actor, item: &ContentItem) -> bool {
        let others = match item.kind {
            PostKind::Topic => Capability::DeleteOthersTopics,
            PostKind::Reply => Capability::DeleteOthersReplies,
            PostKind::Forum => Capability::Moderate,
        };
        Self::owns(actor, item) || actor.can(others)
    }

    fn can_create_topic(&self, actor: &Actor, forum: &ForumRecord) -> bool {
        actor.can(Capability::PublishTopics)
            && (forum.status == PostStatus::Publish || actor.can(Capability::Moderate))
    }

    fn can_create_reply(&self, actor: &Actor, forum: &ForumRecord, topic: &TopicRecord) -> bool {
        let open = forum.status == PostStatus::Publish && topic.status == PostStatus::Publish;
        actor.can(Capability::PublishReplies) && (open || actor.can(Capability::Moderate))
    }

    fn can_edit_subscriptions(&self, actor: &Actor, user_id: UserId) -> bool {
        (actor.user_id == Some(user_id) && actor.can(Capability::EditOwnProfile))
            || actor.can(Capability::Moderate)
    }

    fn can_view_author_ip(&self, actor: &Actor) -> bool {
        actor.can(Capability::Moderate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_by(author_id: UserId) -> ContentItem {
        ContentItem { kind: PostKind::Reply, author_id }
    }

    #[test]
    fn authors_edit_their_own_posts() {
        let author = Actor::user(1, Role::Participant);
        assert!(RoleAuthorizer.can_edit(&author, &reply_by(1)));
        assert!(RoleAuthorizer.can_delete(&author, &reply_by(1)));
    }

    #[test]
    fn participants_cannot_touch_other_posts() {
        let other = Actor::user(2, Role::Participant);
        assert!(!RoleAuthorizer.can_edit(&other, &reply_by(1)));
        assert!(!RoleAuthorizer.can_delete(&other, &reply_by(1)));
    }

    #[test]
    fn moderators_edit_everything() {
        let moderator = Actor::user(3, Role::Moderator);
        assert!(RoleAuthorizer.can_edit(&moderator, &reply_by(1)));
        assert!(RoleAuthorizer.can_delete(&moderator, &ContentItem { kind: PostKind::Topic, author_id: 1 }));
        assert!(RoleAuthorizer.can_view_author_ip(&moderator));
    }

    #[test]
    fn blocked_authors_lose_their_posts() {
        let blocked = Actor::user(1, Role::Blocked);
        assert!(!RoleAuthorizer.can_edit(&blocked, &reply_by(1)));
    }

    #[test]
    fn visitors_match_no_author() {
        // author id 0 marks posts without an account
        assert!(!RoleAuthorizer.can_edit(&Actor::anonymous(), &reply_by(0)));
    }

    #[test]
    fn subscriptions_are_edited_by_their_owner() {
        let user = Actor::user(5, Role::Spectator);
        assert!(RoleAuthorizer.can_edit_subscriptions(&user, 5));
        assert!(!RoleAuthorizer.can_edit_subscriptions(&user, 6));
        assert!(!RoleAuthorizer.can_edit_subscriptions(&Actor::user(5, Role::Blocked), 5));
    }
}
