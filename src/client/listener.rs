use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::client::transport::ChannelFrame;
use crate::error::SessionError;
use crate::types::ServerEvent;

/// Application callbacks. All methods have empty defaults; implement only what
/// you need. Callbacks may run on any runtime thread and must not block.
pub trait SessionListener: Send + Sync {
    fn on_connecting(&self) {}

    /// The server acknowledged the session with `session.created`.
    fn on_connected(&self) {}

    /// `error` is set when the session ended because something failed.
    fn on_disconnected(&self, _error: Option<&SessionError>) {}

    fn on_error(&self, _error: &SessionError) {}

    /// The server closed the session at its lifetime cap. `error` is always
    /// [`SessionError::SessionExpired`]; reconnecting starts a fresh session.
    fn on_session_expired(&self, _error: &SessionError) {}

    fn on_server_event(&self, _event: &ServerEvent) {}

    /// Sees every frame before decoding. Returning `true` consumes the frame.
    fn on_raw_frame(&self, _frame: &ChannelFrame) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn SessionListener>)>>,
}

impl ListenerRegistry {
    pub fn add(&self, listener: Arc<dyn SessionListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(other, _)| *other != id);
        listeners.len() != before
    }

    /// Listeners are copied out first, so a callback may register or remove
    /// listeners without deadlocking. Changes apply from the next dispatch.
    pub fn snapshot(&self) -> Vec<Arc<dyn SessionListener>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    pub fn notify(&self, f: impl Fn(&dyn SessionListener)) {
        for listener in self.snapshot() {
            f(listener.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Counter {
        hits: Mutex<u32>,
    }

    impl SessionListener for Counter {
        fn on_connected(&self) {
            *self.hits.lock().unwrap() += 1;
        }
    }

    struct SelfRemoving {
        registry: Arc<ListenerRegistry>,
        id: Mutex<Option<ListenerId>>,
        late: Arc<Counter>,
    }

    impl SessionListener for SelfRemoving {
        fn on_connected(&self) {
            if let Some(id) = self.id.lock().unwrap().take() {
                self.registry.remove(id);
            }
            self.registry.add(self.late.clone());
        }
    }

    #[test]
    fn registration_during_dispatch_applies_next_time() {
        let registry = Arc::new(ListenerRegistry::default());
        let late = Arc::new(Counter::default());
        let remover = Arc::new(SelfRemoving {
            registry: registry.clone(),
            id: Mutex::new(None),
            late: late.clone(),
        });
        let id = registry.add(remover.clone());
        *remover.id.lock().unwrap() = Some(id);

        registry.notify(|l| l.on_connected());
        assert_eq!(*late.hits.lock().unwrap(), 0);

        registry.notify(|l| l.on_connected());
        assert_eq!(*late.hits.lock().unwrap(), 1);
        assert!(!registry.remove(id));
    }
}
