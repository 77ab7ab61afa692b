use std::sync::Arc;

use banter_types::models::{Activity, Conversation, Message, User};

use crate::error::StoreError;
use crate::port::PersistencePort;
use crate::store::Store;

/// Append-only activity feed. Feed order is insertion order, which is
/// chronological because every event is recorded as its source is accepted.
pub struct ActivityFeedStore {
    store: Store<Activity>,
}

impl ActivityFeedStore {
    pub fn new(port: Arc<dyn PersistencePort<Activity>>) -> Self {
        Self {
            store: Store::new(port),
        }
    }

    pub fn load(&self) -> Result<usize, StoreError> {
        self.store.load()
    }

    pub fn add_activity(&self, activity: Activity) -> Result<(), StoreError> {
        self.store.add(activity)
    }

    pub fn record_user_joined(&self, user: &User) -> Result<Activity, StoreError> {
        self.record(Activity::user_joined(user))
    }

    pub fn record_conversation_created(
        &self,
        conversation: &Conversation,
        owner: &User,
    ) -> Result<Activity, StoreError> {
        self.record(Activity::conversation_created(conversation, owner))
    }

    pub fn record_message_sent(
        &self,
        message: &Message,
        author: &User,
        conversation: &Conversation,
    ) -> Result<Activity, StoreError> {
        self.record(Activity::message_sent(message, author, conversation))
    }

    fn record(&self, activity: Activity) -> Result<Activity, StoreError> {
        self.add_activity(activity.clone())?;
        Ok(activity)
    }

    /// The feed, oldest first.
    pub fn get_feed(&self) -> Vec<Activity> {
        self.store.get_all()
    }

    pub fn activity_count(&self) -> usize {
        self.store.len()
    }
}
