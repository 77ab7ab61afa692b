//! Database row types. These map directly to SQLite rows.
//! Ids are text UUIDs and timestamps RFC 3339 text; conversion to the
//! banter-types models validates both.
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use banter_types::models::{Activity, ActivityKind, Conversation, Message, User};

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: String,
    pub bio: String,
    pub language: String,
}

pub struct ConversationRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
}

pub struct ActivityRow {
    pub id: String,
    pub kind: String,
    pub subject_id: String,
    pub actor_id: String,
    pub summary: String,
    pub created_at: String,
}

fn parse_id(value: &str, field: &str) -> Result<Uuid> {
    value
        .parse()
        .with_context(|| format!("Corrupt {} '{}'", field, value))
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("Corrupt timestamp '{}'", value))
}

pub fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339()
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&row.id, "user id")?,
            name: row.name,
            password_hash: row.password_hash,
            created_at: parse_time(&row.created_at)?,
            bio: row.bio,
            language: row.language,
        })
    }
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = anyhow::Error;

    fn try_from(row: ConversationRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&row.id, "conversation id")?,
            owner_id: parse_id(&row.owner_id, "owner_id")?,
            title: row.title,
            created_at: parse_time(&row.created_at)?,
        })
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = anyhow::Error;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&row.id, "message id")?,
            conversation_id: parse_id(&row.conversation_id, "conversation_id")?,
            author_id: parse_id(&row.author_id, "author_id")?,
            content: row.content,
            created_at: parse_time(&row.created_at)?,
        })
    }
}

impl TryFrom<ActivityRow> for Activity {
    type Error = anyhow::Error;

    fn try_from(row: ActivityRow) -> Result<Self> {
        let kind: ActivityKind = row.kind.parse().map_err(|e: String| anyhow!(e))?;
        Ok(Self {
            id: parse_id(&row.id, "activity id")?,
            kind,
            subject_id: parse_id(&row.subject_id, "subject_id")?,
            actor_id: parse_id(&row.actor_id, "actor_id")?,
            summary: row.summary,
            created_at: parse_time(&row.created_at)?,
        })
    }
}
