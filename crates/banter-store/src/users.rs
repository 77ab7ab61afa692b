use std::sync::Arc;

use uuid::Uuid;

use banter_types::models::User;

use crate::error::StoreError;
use crate::port::PersistencePort;
use crate::store::Store;

/// Registered users, keyed by id and by name.
pub struct UserStore {
    store: Store<User>,
}

impl UserStore {
    pub fn new(port: Arc<dyn PersistencePort<User>>) -> Self {
        Self {
            store: Store::new(port),
        }
    }

    pub fn load(&self) -> Result<usize, StoreError> {
        self.store.load()
    }

    /// Add a new user. Fails with `DuplicateKey` if the name is taken.
    pub fn add_user(&self, user: User) -> Result<(), StoreError> {
        self.store.add(user)
    }

    /// Persist changes to an existing user (profile edits).
    pub fn update_user(&self, user: User) -> Result<(), StoreError> {
        self.store.update(user)
    }

    pub fn get_user(&self, name: &str) -> Option<User> {
        self.store.get_by_key(name)
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Option<User> {
        self.store.get_by_id(id)
    }

    pub fn is_user_registered(&self, name: &str) -> bool {
        self.store.contains_key(name)
    }

    pub fn get_all_users(&self) -> Vec<User> {
        self.store.get_all()
    }

    pub fn user_count(&self) -> usize {
        self.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPort;

    #[test]
    fn lookup_by_name_and_id() {
        let store = UserStore::new(Arc::new(MemoryPort::<User>::new()));
        store.load().unwrap();
        let user = User::new("alice", "h");
        store.add_user(user.clone()).unwrap();

        assert_eq!(store.get_user("alice"), Some(user.clone()));
        assert_eq!(store.get_user_by_id(user.id), Some(user));
        assert!(store.is_user_registered("alice"));
        assert!(!store.is_user_registered("Alice"));
        assert_eq!(store.get_user("bob"), None);
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn profile_update_is_visible() {
        let port = Arc::new(MemoryPort::<User>::new());
        let store = UserStore::new(port.clone());
        store.load().unwrap();
        let mut user = User::new("alice", "h");
        store.add_user(user.clone()).unwrap();

        user.bio = "likes rust".into();
        user.language = "English".into();
        store.update_user(user.clone()).unwrap();

        assert_eq!(store.get_user("alice").unwrap().bio, "likes rust");
        assert_eq!(port.load_all().unwrap(), vec![user]);
    }

    #[test]
    fn all_users_in_registration_order() {
        let store = UserStore::new(Arc::new(MemoryPort::<User>::new()));
        store.load().unwrap();
        let alice = User::new("alice", "h");
        let bob = User::new("bob", "h");
        store.add_user(alice.clone()).unwrap();
        store.add_user(bob.clone()).unwrap();

        assert_eq!(store.get_all_users(), vec![alice, bob]);
    }
}
