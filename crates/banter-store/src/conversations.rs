use std::sync::Arc;

use uuid::Uuid;

use banter_types::models::Conversation;

use crate::error::StoreError;
use crate::port::PersistencePort;
use crate::store::Store;

/// Conversations, keyed by id and by title.
pub struct ConversationStore {
    store: Store<Conversation>,
}

impl ConversationStore {
    pub fn new(port: Arc<dyn PersistencePort<Conversation>>) -> Self {
        Self {
            store: Store::new(port),
        }
    }

    pub fn load(&self) -> Result<usize, StoreError> {
        self.store.load()
    }

    pub fn add_conversation(&self, conversation: Conversation) -> Result<(), StoreError> {
        self.store.add(conversation)
    }

    pub fn get_conversation(&self, id: Uuid) -> Option<Conversation> {
        self.store.get_by_id(id)
    }

    pub fn get_conversation_with_title(&self, title: &str) -> Option<Conversation> {
        self.store.get_by_key(title)
    }

    pub fn is_title_taken(&self, title: &str) -> bool {
        self.store.contains_key(title)
    }

    pub fn get_all_conversations(&self) -> Vec<Conversation> {
        self.store.get_all()
    }

    pub fn conversation_count(&self) -> usize {
        self.store.len()
    }
}
