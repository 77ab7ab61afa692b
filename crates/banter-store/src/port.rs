use anyhow::Result;
use uuid::Uuid;

use banter_types::models::{Activity, Conversation, Message, User};

/// Something a [`Store`](crate::store::Store) can hold.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Used in log lines and error messages.
    const KIND: &'static str;

    fn id(&self) -> Uuid;

    /// Secondary unique key (user name, conversation title), if the kind has one.
    fn key(&self) -> Option<&str> {
        None
    }
}

/// Backing storage for one entity kind.
///
/// `load_all` returns entities in the order they were written.
/// `write_through` must not return until the entity is durable; a write of an
/// entity whose id already exists replaces it.
pub trait PersistencePort<E>: Send + Sync {
    fn load_all(&self) -> Result<Vec<E>>;
    fn write_through(&self, entity: &E) -> Result<()>;
}

impl Entity for User {
    const KIND: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }

    fn key(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl Entity for Conversation {
    const KIND: &'static str = "conversation";

    fn id(&self) -> Uuid {
        self.id
    }

    fn key(&self) -> Option<&str> {
        Some(&self.title)
    }
}

impl Entity for Message {
    const KIND: &'static str = "message";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Activity {
    const KIND: &'static str = "activity";

    fn id(&self) -> Uuid {
        self.id
    }
}
