use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        alt: false,
        meta: false,
    };
}

/// A key press as delivered by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: char,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: char, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// Key plus an exact modifier set. Letter keys match regardless of case,
/// since holding Shift reports an uppercase key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    key: char,
    modifiers: Modifiers,
}

impl KeyChord {
    pub const fn new(key: char, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub const fn ctrl_shift(key: char) -> Self {
        Self::new(key, Modifiers::CTRL_SHIFT)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.modifiers == event.modifiers && self.key.eq_ignore_ascii_case(&event.key)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        for (on, label) in [
            (m.ctrl, "Ctrl+"),
            (m.alt, "Alt+"),
            (m.shift, "Shift+"),
            (m.meta, "Meta+"),
        ] {
            if on {
                f.write_str(label)?;
            }
        }
        write!(f, "{}", self.key.to_ascii_uppercase())
    }
}

type Handler = Rc<RefCell<dyn FnMut(&KeyEvent)>>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, KeyChord, Handler)>,
}

/// Process-wide keyboard listener list.
///
/// Listeners are only added through [`ShortcutRegistry::subscribe`], whose
/// guard removes them again, so a view that mounts and unmounts repeatedly
/// never leaves stale handlers behind.
#[derive(Clone, Default)]
pub struct ShortcutRegistry {
    inner: Rc<RefCell<Listeners>>,
}

impl fmt::Debug for ShortcutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutRegistry")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the listener is removed as soon as the subscription is dropped"]
    pub fn subscribe(
        &self,
        chord: KeyChord,
        handler: impl FnMut(&KeyEvent) + 'static,
    ) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let handler: Handler = Rc::new(RefCell::new(handler));
        inner.entries.push((id, chord, handler));
        tracing::trace!(id, %chord, "keyboard listener installed");
        Subscription {
            id,
            listeners: Rc::downgrade(&self.inner),
        }
    }

    /// Runs every handler bound to a chord matching `event`; returns how many ran.
    pub fn dispatch(&self, event: &KeyEvent) -> usize {
        // Snapshot first so handlers may subscribe or unsubscribe while running.
        let matching: Vec<Handler> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|(_, chord, _)| chord.matches(event))
            .map(|(_, _, h)| h.clone())
            .collect();
        for handler in &matching {
            (&mut *handler.borrow_mut())(event);
        }
        matching.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

/// Guard for an installed listener.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .borrow_mut()
                .entries
                .retain(|(id, _, _)| *id != self.id);
            tracing::trace!(id = self.id, "keyboard listener removed");
        }
    }
}
