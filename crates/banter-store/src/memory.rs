use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow};

use crate::port::{Entity, PersistencePort};

/// Volatile [`PersistencePort`] backed by a `Vec`. Used by tests and for
/// running without a database; failures can be switched on to exercise the
/// write-through error paths.
pub struct MemoryPort<E> {
    entities: Mutex<Vec<E>>,
    fail_loads: AtomicBool,
    fail_writes: AtomicBool,
}

impl<E: Entity> MemoryPort<E> {
    pub fn new() -> Self {
        Self::with_entities(Vec::new())
    }

    pub fn with_entities(entities: Vec<E>) -> Self {
        Self {
            entities: Mutex::new(entities),
            fail_loads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl<E: Entity> Default for MemoryPort<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> PersistencePort<E> for MemoryPort<E> {
    fn load_all(&self) -> Result<Vec<E>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(anyhow!("{} storage unreachable", E::KIND));
        }
        let entities = self
            .entities
            .lock()
            .map_err(|e| anyhow!("Memory port lock poisoned: {}", e))?;
        Ok(entities.clone())
    }

    fn write_through(&self, entity: &E) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("{} storage rejected write of {}", E::KIND, entity.id()));
        }
        let mut entities = self
            .entities
            .lock()
            .map_err(|e| anyhow!("Memory port lock poisoned: {}", e))?;
        match entities.iter_mut().find(|e| e.id() == entity.id()) {
            Some(existing) => *existing = entity.clone(),
            None => entities.push(entity.clone()),
        }
        Ok(())
    }
}
