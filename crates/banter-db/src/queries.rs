use anyhow::Result;
use rusqlite::{Connection, params};

use banter_store::PersistencePort;
use banter_types::models::{Activity, Conversation, Message, User};

use crate::Database;
use crate::models::{ActivityRow, ConversationRow, MessageRow, UserRow, format_time};

// Rows come back in rowid order, which is write order. Upserts keep the
// original rowid, so a profile edit does not move a user.

impl PersistencePort<User> for Database {
    fn load_all(&self) -> Result<Vec<User>> {
        self.with_conn(query_users)?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    fn write_through(&self, user: &User) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, password_hash, created_at, bio, language)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    password_hash = excluded.password_hash,
                    bio = excluded.bio,
                    language = excluded.language",
                params![
                    user.id.to_string(),
                    user.name,
                    user.password_hash,
                    format_time(&user.created_at),
                    user.bio,
                    user.language,
                ],
            )?;
            Ok(())
        })
    }
}

impl PersistencePort<Conversation> for Database {
    fn load_all(&self) -> Result<Vec<Conversation>> {
        self.with_conn(query_conversations)?
            .into_iter()
            .map(Conversation::try_from)
            .collect()
    }

    fn write_through(&self, conversation: &Conversation) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, owner_id, title, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    conversation.id.to_string(),
                    conversation.owner_id.to_string(),
                    conversation.title,
                    format_time(&conversation.created_at),
                ],
            )?;
            Ok(())
        })
    }
}

impl PersistencePort<Message> for Database {
    fn load_all(&self) -> Result<Vec<Message>> {
        self.with_conn(query_messages)?
            .into_iter()
            .map(Message::try_from)
            .collect()
    }

    fn write_through(&self, message: &Message) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, author_id, content, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    message.id.to_string(),
                    message.conversation_id.to_string(),
                    message.author_id.to_string(),
                    message.content,
                    format_time(&message.created_at),
                ],
            )?;
            Ok(())
        })
    }
}

impl PersistencePort<Activity> for Database {
    fn load_all(&self) -> Result<Vec<Activity>> {
        self.with_conn(query_activities)?
            .into_iter()
            .map(Activity::try_from)
            .collect()
    }

    fn write_through(&self, activity: &Activity) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO activities (id, kind, subject_id, actor_id, summary, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    activity.id.to_string(),
                    activity.kind.as_str(),
                    activity.subject_id.to_string(),
                    activity.actor_id.to_string(),
                    activity.summary,
                    format_time(&activity.created_at),
                ],
            )?;
            Ok(())
        })
    }
}

fn query_users(conn: &Connection) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, password_hash, created_at, bio, language FROM users ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
                bio: row.get(4)?,
                language: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_conversations(conn: &Connection) -> Result<Vec<ConversationRow>> {
    let mut stmt =
        conn.prepare("SELECT id, owner_id, title, created_at FROM conversations ORDER BY rowid")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(ConversationRow {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                title: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_messages(conn: &Connection) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, conversation_id, author_id, content, created_at FROM messages ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                conversation_id: row.get(1)?,
                author_id: row.get(2)?,
                content: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_activities(conn: &Connection) -> Result<Vec<ActivityRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, subject_id, actor_id, summary, created_at FROM activities ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(ActivityRow {
                id: row.get(0)?,
                kind: row.get(1)?,
                subject_id: row.get(2)?,
                actor_id: row.get(3)?,
                summary: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn users_come_back_in_write_order() {
        let db = db();
        let a = User::new("alice", "h1");
        let b = User::new("bob", "h2");
        PersistencePort::<User>::write_through(&db, &a).unwrap();
        PersistencePort::<User>::write_through(&db, &b).unwrap();

        let loaded: Vec<User> = db.load_all().unwrap();
        assert_eq!(loaded, vec![a, b]);
    }

    #[test]
    fn user_upsert_keeps_position() {
        let db = db();
        let mut a = User::new("alice", "h1");
        let b = User::new("bob", "h2");
        PersistencePort::<User>::write_through(&db, &a).unwrap();
        PersistencePort::<User>::write_through(&db, &b).unwrap();

        a.bio = "edited".into();
        PersistencePort::<User>::write_through(&db, &a).unwrap();

        let loaded: Vec<User> = db.load_all().unwrap();
        assert_eq!(loaded, vec![a, b]);
    }

    #[test]
    fn duplicate_user_name_is_rejected() {
        let db = db();
        PersistencePort::<User>::write_through(&db, &User::new("alice", "h")).unwrap();
        assert!(PersistencePort::<User>::write_through(&db, &User::new("alice", "h")).is_err());
    }

    #[test]
    fn message_requires_known_conversation() {
        let db = db();
        let author = User::new("alice", "h");
        PersistencePort::<User>::write_through(&db, &author).unwrap();

        let orphan = Message::new(uuid::Uuid::new_v4(), author.id, "lost");
        assert!(PersistencePort::<Message>::write_through(&db, &orphan).is_err());
    }

    #[test]
    fn full_graph_round_trips() {
        let db = db();
        let author = User::new("alice", "h");
        let conversation = Conversation::new(author.id, "general");
        let message = Message::new(conversation.id, author.id, "<b>hi</b>");
        let activity = Activity::message_sent(&message, &author, &conversation);

        PersistencePort::<User>::write_through(&db, &author).unwrap();
        PersistencePort::<Conversation>::write_through(&db, &conversation).unwrap();
        PersistencePort::<Message>::write_through(&db, &message).unwrap();
        PersistencePort::<Activity>::write_through(&db, &activity).unwrap();

        let conversations: Vec<Conversation> = db.load_all().unwrap();
        let messages: Vec<Message> = db.load_all().unwrap();
        let activities: Vec<Activity> = db.load_all().unwrap();
        assert_eq!(conversations, vec![conversation]);
        assert_eq!(messages, vec![message]);
        assert_eq!(activities, vec![activity]);
    }
}
