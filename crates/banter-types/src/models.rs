use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Opaque hash produced by the auth service. Never sent to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub bio: String,
    pub language: String,
}

impl User {
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
            bio: String::new(),
            language: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(owner_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}

/// A chat message. `content` has already been through the content pipeline,
/// so it holds sanitized, auto-linked markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(conversation_id: Uuid, author_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            author_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    UserJoined,
    ConversationCreated,
    MessageSent,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserJoined => "user_joined",
            Self::ConversationCreated => "conversation_created",
            Self::MessageSent => "message_sent",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_joined" => Ok(Self::UserJoined),
            "conversation_created" => Ok(Self::ConversationCreated),
            "message_sent" => Ok(Self::MessageSent),
            other => Err(format!("unknown activity kind: {}", other)),
        }
    }
}

/// One entry of the activity feed, derived from a user, conversation or
/// message creation. `subject_id` points at the entity that was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub subject_id: Uuid,
    pub actor_id: Uuid,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn user_joined(user: &User) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ActivityKind::UserJoined,
            subject_id: user.id,
            actor_id: user.id,
            summary: format!("{} joined", user.name),
            created_at: user.created_at,
        }
    }

    pub fn conversation_created(conversation: &Conversation, owner: &User) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ActivityKind::ConversationCreated,
            subject_id: conversation.id,
            actor_id: owner.id,
            summary: format!("{} created conversation {}", owner.name, conversation.title),
            created_at: conversation.created_at,
        }
    }

    pub fn message_sent(message: &Message, author: &User, conversation: &Conversation) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ActivityKind::MessageSent,
            subject_id: message.id,
            actor_id: author.id,
            summary: format!("{} sent a message in {}", author.name, conversation.title),
            created_at: message.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_kind_parses_its_own_name() {
        for kind in [
            ActivityKind::UserJoined,
            ActivityKind::ConversationCreated,
            ActivityKind::MessageSent,
        ] {
            assert_eq!(kind.as_str().parse::<ActivityKind>().unwrap(), kind);
        }
        assert!("deleted".parse::<ActivityKind>().is_err());
    }

    #[test]
    fn message_activity_points_at_message() {
        let author = User::new("alice", "hash");
        let conversation = Conversation::new(author.id, "general");
        let message = Message::new(conversation.id, author.id, "hi");

        let activity = Activity::message_sent(&message, &author, &conversation);
        assert_eq!(activity.kind, ActivityKind::MessageSent);
        assert_eq!(activity.subject_id, message.id);
        assert_eq!(activity.actor_id, author.id);
        assert_eq!(activity.summary, "alice sent a message in general");
        assert_eq!(activity.created_at, message.created_at);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User::new("alice", "$argon2id$secret");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password_hash"));
    }
}
