//! In-memory entity stores with synchronous write-through persistence.

pub mod activity;
pub mod conversations;
pub mod error;
pub mod memory;
pub mod messages;
pub mod port;
pub mod store;
pub mod users;

use std::sync::Arc;

use tracing::info;

use banter_types::models::{Activity, Conversation, Message, User};

pub use activity::ActivityFeedStore;
pub use conversations::ConversationStore;
pub use error::StoreError;
pub use memory::MemoryPort;
pub use messages::MessageStore;
pub use port::{Entity, PersistencePort};
pub use users::UserStore;

/// The four stores of a running server. Built once at startup, loaded
/// eagerly, then shared by reference with everything that reads or writes.
pub struct Stores {
    pub users: UserStore,
    pub conversations: ConversationStore,
    pub messages: MessageStore,
    pub activity: ActivityFeedStore,
}

impl Stores {
    /// Stores that all persist through one backend.
    pub fn new<P>(backend: Arc<P>) -> Self
    where
        P: PersistencePort<User>
            + PersistencePort<Conversation>
            + PersistencePort<Message>
            + PersistencePort<Activity>
            + 'static,
    {
        Self::with_ports(backend.clone(), backend.clone(), backend.clone(), backend)
    }

    pub fn with_ports(
        users: Arc<dyn PersistencePort<User>>,
        conversations: Arc<dyn PersistencePort<Conversation>>,
        messages: Arc<dyn PersistencePort<Message>>,
        activity: Arc<dyn PersistencePort<Activity>>,
    ) -> Self {
        Self {
            users: UserStore::new(users),
            conversations: ConversationStore::new(conversations),
            messages: MessageStore::new(messages),
            activity: ActivityFeedStore::new(activity),
        }
    }

    /// Load every store. Any failure is fatal: the server must not start with
    /// a store that silently came up empty.
    pub fn load(&self) -> Result<(), StoreError> {
        let users = self.users.load()?;
        let conversations = self.conversations.load()?;
        let messages = self.messages.load()?;
        let activities = self.activity.load()?;
        info!(
            "Stores loaded: {} users, {} conversations, {} messages, {} activities",
            users, conversations, messages, activities
        );
        Ok(())
    }

    /// Add a user and record that they joined.
    pub fn register_user(&self, user: User) -> Result<Activity, StoreError> {
        self.users.add_user(user.clone())?;
        self.activity.record_user_joined(&user)
    }

    /// Add a conversation owned by `owner` and record its creation.
    pub fn create_conversation(
        &self,
        conversation: Conversation,
        owner: &User,
    ) -> Result<Activity, StoreError> {
        self.conversations.add_conversation(conversation.clone())?;
        self.activity.record_conversation_created(&conversation, owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_types::models::ActivityKind;

    fn memory_stores() -> Stores {
        let stores = Stores::with_ports(
            Arc::new(MemoryPort::<User>::new()),
            Arc::new(MemoryPort::<Conversation>::new()),
            Arc::new(MemoryPort::<Message>::new()),
            Arc::new(MemoryPort::<Activity>::new()),
        );
        stores.load().unwrap();
        stores
    }

    #[test]
    fn register_user_records_activity() {
        let stores = memory_stores();
        let user = User::new("alice", "h");

        let activity = stores.register_user(user.clone()).unwrap();

        assert_eq!(activity.kind, ActivityKind::UserJoined);
        assert_eq!(stores.users.get_user("alice"), Some(user));
        assert_eq!(stores.activity.get_feed(), vec![activity]);
    }

    #[test]
    fn duplicate_user_records_nothing() {
        let stores = memory_stores();
        stores.register_user(User::new("alice", "h")).unwrap();

        assert!(stores.register_user(User::new("alice", "h2")).is_err());
        assert_eq!(stores.users.user_count(), 1);
        assert_eq!(stores.activity.activity_count(), 1);
    }

    #[test]
    fn create_conversation_records_activity() {
        let stores = memory_stores();
        let owner = User::new("alice", "h");
        stores.register_user(owner.clone()).unwrap();

        let conversation = Conversation::new(owner.id, "general");
        let activity = stores.create_conversation(conversation.clone(), &owner).unwrap();

        assert_eq!(activity.subject_id, conversation.id);
        assert_eq!(activity.summary, "alice created conversation general");
        assert_eq!(stores.activity.activity_count(), 2);
    }

    #[test]
    fn load_failure_stops_startup() {
        let users = Arc::new(MemoryPort::<User>::new());
        users.fail_loads(true);
        let stores = Stores::with_ports(
            users,
            Arc::new(MemoryPort::<Conversation>::new()),
            Arc::new(MemoryPort::<Message>::new()),
            Arc::new(MemoryPort::<Activity>::new()),
        );

        let err = stores.load().unwrap_err();
        assert!(matches!(err, StoreError::Load { kind: "user", .. }));
    }
}
