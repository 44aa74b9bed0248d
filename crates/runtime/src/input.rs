//! Global keyboard listeners with scoped lifetimes.
//!
//! A [`KeyboardHub`] plays the role of the window: anything may register a
//! listener, and every dispatched key reaches every registered listener.
//! Registration hands back a [`ListenerGuard`]; dropping the guard removes the
//! listener, so detachment happens on every exit path.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Char(char),
    Function(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        meta: false,
        alt: false,
        shift: false,
    };

    pub fn any(&self) -> bool {
        self.ctrl || self.meta || self.alt || self.shift
    }

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

type Listener = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

#[derive(Clone, Default)]
pub struct KeyboardHub {
    inner: Arc<Mutex<HubInner>>,
}

impl std::fmt::Debug for KeyboardHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the listener is removed as soon as the guard is dropped"]
    pub fn add_listener<F>(&self, listener: F) -> ListenerGuard
    where
        F: Fn(&KeyEvent) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, Arc::new(listener));
        ListenerGuard {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// Listeners run outside the hub lock, so they may add or remove
    /// listeners themselves. Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &KeyEvent) -> usize {
        let listeners: Vec<Listener> = self.inner.lock().listeners.values().cloned().collect();
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }
}

/// Removes its listener from the hub when dropped.
pub struct ListenerGuard {
    id: u64,
    hub: Weak<Mutex<HubInner>>,
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.lock().listeners.remove(&self.id);
        }
    }
}

/// A listener that is re-registered only when its captured dependencies change.
///
/// `sync` is meant to be called on every render with the values the handler
/// closes over. When they compare equal to the previous call nothing happens;
/// otherwise the old listener is detached before the new one is attached, so
/// at most one listener from this scope is ever registered.
pub struct ScopedListener<D> {
    hub: KeyboardHub,
    current: Option<(D, ListenerGuard)>,
    registrations: u64,
}

impl<D: PartialEq + std::fmt::Debug> ScopedListener<D> {
    pub fn new(hub: KeyboardHub) -> Self {
        Self {
            hub,
            current: None,
            registrations: 0,
        }
    }

    /// Returns `true` if a (re)registration happened.
    pub fn sync<F, H>(&mut self, deps: D, make_handler: F) -> bool
    where
        F: FnOnce(&D) -> H,
        H: Fn(&KeyEvent) + Send + Sync + 'static,
    {
        if let Some((current, _)) = &self.current
            && *current == deps
        {
            return false;
        }

        self.current = None;
        let handler = make_handler(&deps);
        debug!(?deps, "keyboard listener attached");
        let guard = self.hub.add_listener(handler);
        self.current = Some((deps, guard));
        self.registrations += 1;
        true
    }

    pub fn detach(&mut self) {
        if self.current.take().is_some() {
            debug!("keyboard listener detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.current.is_some()
    }

    /// Total number of registrations made through this scope.
    pub fn registrations(&self) -> u64 {
        self.registrations
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, KeyEvent, KeyboardHub, ScopedListener};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn guard_drop_removes_listener() {
        let hub = KeyboardHub::new();
        let hits = Arc::new(AtomicU32::new(0));
        let h = hits.clone();
        let guard = hub.add_listener(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(hub.dispatch(&KeyEvent::plain(Key::Escape)), 1);
        drop(guard);
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.dispatch(&KeyEvent::plain(Key::Escape)), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scoped_listener_reattaches_only_on_dependency_change() {
        let hub = KeyboardHub::new();
        let mut scope = ScopedListener::new(hub.clone());

        assert!(scope.sync(Some("JP"), |_| |_: &KeyEvent| {}));
        assert!(!scope.sync(Some("JP"), |_| |_: &KeyEvent| {}));
        assert_eq!(hub.listener_count(), 1);

        assert!(scope.sync(None, |_| |_: &KeyEvent| {}));
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(scope.registrations(), 2);

        scope.detach();
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn handler_sees_the_captured_dependencies() {
        let hub = KeyboardHub::new();
        let seen = Arc::new(AtomicU32::new(0));
        let mut scope = ScopedListener::new(hub.clone());

        let s = seen.clone();
        scope.sync(7u32, move |deps| {
            let captured = *deps;
            move |_: &KeyEvent| {
                s.store(captured, Ordering::SeqCst);
            }
        });
        hub.dispatch(&KeyEvent::plain(Key::Char('r')));
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn dropping_the_scope_detaches() {
        let hub = KeyboardHub::new();
        {
            let mut scope = ScopedListener::new(hub.clone());
            scope.sync((), |_| |_: &KeyEvent| {});
            assert_eq!(hub.listener_count(), 1);
        }
        assert_eq!(hub.listener_count(), 0);
    }
}
