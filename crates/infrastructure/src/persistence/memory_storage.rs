//! In-memory durable storage with change notifications between handles.
//!
//! Sibling handles share one set of entries, the way several windows of an
//! application share one profile. A write through one handle is announced
//! to every other handle, never to the writer itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use petmanager_application::ports::{DurableStorage, StorageError, StorageEvent};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct Shared {
    entries: Mutex<HashMap<String, String>>,
    handles: Mutex<Vec<(u64, broadcast::Sender<StorageEvent>)>>,
    next_id: AtomicU64,
}

impl Shared {
    fn register(self: &Arc<Self>) -> MemoryStorage {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        self.handles.lock().push((id, events.clone()));
        MemoryStorage {
            shared: Arc::clone(self),
            id,
            events,
        }
    }

    fn announce(&self, from: u64, event: &StorageEvent) {
        for (id, sender) in self.handles.lock().iter() {
            if *id != from {
                // Handles nobody listens to are fine.
                let _ = sender.send(event.clone());
            }
        }
    }
}

/// Durable storage kept in memory and shared between sibling handles.
#[derive(Debug)]
pub struct MemoryStorage {
    shared: Arc<Shared>,
    id: u64,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStorage {
    /// Creates an empty store with a single handle.
    #[must_use]
    pub fn new() -> Self {
        Arc::new(Shared::default()).register()
    }

    /// Creates another handle onto the same entries.
    #[must_use]
    pub fn sibling(&self) -> Self {
        self.shared.register()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryStorage {
    fn drop(&mut self) {
        self.shared.handles.lock().retain(|(id, _)| *id != self.id);
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.shared.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self
            .shared
            .entries
            .lock()
            .insert(key.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            self.shared.announce(
                self.id,
                &StorageEvent {
                    key: key.to_string(),
                    new_value: Some(value.to_string()),
                },
            );
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = self.shared.entries.lock().remove(key);
        if removed.is_some() {
            self.shared.announce(
                self.id,
                &StorageEvent {
                    key: key.to_string(),
                    new_value: None,
                },
            );
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StorageEvent>> {
        Some(self.events.subscribe())
    }
}
