use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::port::{Entity, PersistencePort};

/// In-memory, write-through collection of one entity kind.
///
/// Lifecycle: constructed empty, filled once by [`Store::load`], then only
/// grown by [`Store::add`] or changed by [`Store::update`]. Both hold the write
/// lock across the port write, so in-memory order always matches persisted
/// order and memory is only touched after the port succeeded.
pub struct Store<E: Entity> {
    port: Arc<dyn PersistencePort<E>>,
    state: RwLock<State<E>>,
}

struct State<E> {
    loaded: bool,
    entities: Vec<E>,
    by_id: HashMap<Uuid, usize>,
    by_key: HashMap<String, usize>,
}

impl<E: Entity> State<E> {
    fn push(&mut self, entity: E) {
        let idx = self.entities.len();
        self.by_id.insert(entity.id(), idx);
        if let Some(key) = entity.key() {
            self.by_key.insert(key.to_string(), idx);
        }
        self.entities.push(entity);
    }
}

impl<E: Entity> Store<E> {
    pub fn new(port: Arc<dyn PersistencePort<E>>) -> Self {
        Self {
            port,
            state: RwLock::new(State {
                loaded: false,
                entities: Vec::new(),
                by_id: HashMap::new(),
                by_key: HashMap::new(),
            }),
        }
    }

    // State is only mutated after the port write succeeds, so a panic while
    // the lock is held cannot leave it half-updated.
    fn read(&self) -> RwLockReadGuard<'_, State<E>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State<E>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Populate the store from the port. Call once, before any other traffic.
    pub fn load(&self) -> Result<usize, StoreError> {
        let mut state = self.write();
        if state.loaded {
            return Err(StoreError::AlreadyLoaded { kind: E::KIND });
        }

        let entities = self.port.load_all().map_err(|e| StoreError::Load {
            kind: E::KIND,
            source: e.into(),
        })?;

        let mut ids = HashSet::with_capacity(entities.len());
        let mut keys = HashSet::with_capacity(entities.len());
        for entity in &entities {
            if !ids.insert(entity.id()) {
                return Err(StoreError::Load {
                    kind: E::KIND,
                    source: format!("duplicate id {}", entity.id()).into(),
                });
            }
            if let Some(key) = entity.key() {
                if !keys.insert(key) {
                    return Err(StoreError::Load {
                        kind: E::KIND,
                        source: format!("duplicate key '{}'", key).into(),
                    });
                }
            }
        }

        for entity in entities {
            state.push(entity);
        }
        state.loaded = true;

        info!("Loaded {} {} entities", state.entities.len(), E::KIND);
        Ok(state.entities.len())
    }

    pub fn add(&self, entity: E) -> Result<(), StoreError> {
        let mut state = self.write();
        if !state.loaded {
            return Err(StoreError::NotLoaded { kind: E::KIND });
        }
        if state.by_id.contains_key(&entity.id()) {
            return Err(StoreError::DuplicateId {
                kind: E::KIND,
                id: entity.id(),
            });
        }
        if let Some(key) = entity.key() {
            if state.by_key.contains_key(key) {
                return Err(StoreError::DuplicateKey {
                    kind: E::KIND,
                    key: key.to_string(),
                });
            }
        }

        self.write_through(&entity)?;
        state.push(entity);
        Ok(())
    }

    /// Replace an existing entity, matched by id.
    pub fn update(&self, entity: E) -> Result<(), StoreError> {
        let mut state = self.write();
        if !state.loaded {
            return Err(StoreError::NotLoaded { kind: E::KIND });
        }
        let idx = *state.by_id.get(&entity.id()).ok_or(StoreError::NotFound {
            kind: E::KIND,
            id: entity.id(),
        })?;

        let old_key = state.entities[idx].key().map(str::to_string);
        let new_key = entity.key().map(str::to_string);
        if new_key != old_key {
            if let Some(key) = &new_key {
                if state.by_key.contains_key(key) {
                    return Err(StoreError::DuplicateKey {
                        kind: E::KIND,
                        key: key.clone(),
                    });
                }
            }
        }

        self.write_through(&entity)?;

        if new_key != old_key {
            if let Some(key) = old_key {
                state.by_key.remove(&key);
            }
            if let Some(key) = new_key {
                state.by_key.insert(key, idx);
            }
        }
        state.entities[idx] = entity;
        Ok(())
    }

    fn write_through(&self, entity: &E) -> Result<(), StoreError> {
        self.port.write_through(entity).map_err(|e| {
            warn!("Write-through of {} {} failed: {:#}", E::KIND, entity.id(), e);
            StoreError::WriteThrough {
                kind: E::KIND,
                id: entity.id(),
                source: e.into(),
            }
        })
    }

    /// All entities in insertion order.
    pub fn get_all(&self) -> Vec<E> {
        self.read().entities.clone()
    }

    pub fn get_by_id(&self, id: Uuid) -> Option<E> {
        let state = self.read();
        state.by_id.get(&id).map(|&idx| state.entities[idx].clone())
    }

    pub fn get_by_key(&self, key: &str) -> Option<E> {
        let state = self.read();
        state.by_key.get(key).map(|&idx| state.entities[idx].clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().by_key.contains_key(key)
    }

    /// Matching entities in insertion order.
    pub fn filter<F>(&self, pred: F) -> Vec<E>
    where
        F: Fn(&E) -> bool,
    {
        self.read()
            .entities
            .iter()
            .filter(|e| pred(e))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
