use std::sync::Arc;

use uuid::Uuid;

use banter_types::models::Message;

use crate::error::StoreError;
use crate::port::PersistencePort;
use crate::store::Store;

/// All chat messages in insertion order. Messages are immutable once added.
pub struct MessageStore {
    store: Store<Message>,
}

impl MessageStore {
    pub fn new(port: Arc<dyn PersistencePort<Message>>) -> Self {
        Self {
            store: Store::new(port),
        }
    }

    pub fn load(&self) -> Result<usize, StoreError> {
        self.store.load()
    }

    pub fn add_message(&self, message: Message) -> Result<(), StoreError> {
        self.store.add(message)
    }

    pub fn get_message(&self, id: Uuid) -> Option<Message> {
        self.store.get_by_id(id)
    }

    pub fn get_messages_in_conversation(&self, conversation_id: Uuid) -> Vec<Message> {
        self.store.filter(|m| m.conversation_id == conversation_id)
    }

    pub fn get_messages_by_author(&self, author_id: Uuid) -> Vec<Message> {
        self.store.filter(|m| m.author_id == author_id)
    }

    pub fn get_all_messages(&self) -> Vec<Message> {
        self.store.get_all()
    }

    pub fn message_count(&self) -> usize {
        self.store.len()
    }
}
