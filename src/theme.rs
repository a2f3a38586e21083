use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::{DocumentMarker, RootElement, THEME_ATTRIBUTE};
use crate::error::PrefsError;
use crate::shortcut::{KeyChord, ShortcutRegistry, Subscription};
use crate::storage::Persistence;

/// Storage key for the selected theme. The value is the bare identifier.
pub const THEME_STORAGE_KEY: &str = "siteTheme";

/// Chord that advances to the next theme.
pub const THEME_CYCLE_CHORD: KeyChord = KeyChord::ctrl_shift('t');

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Default,
    BlueTrust,
    BlueGulf,
    BlueClassic,
    BlueCoastal,
}

impl ThemeName {
    /// Every theme, in cycle order.
    pub const ALL: [ThemeName; 5] = [
        ThemeName::Default,
        ThemeName::BlueTrust,
        ThemeName::BlueGulf,
        ThemeName::BlueClassic,
        ThemeName::BlueCoastal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Default => "default",
            ThemeName::BlueTrust => "blue-trust",
            ThemeName::BlueGulf => "blue-gulf",
            ThemeName::BlueClassic => "blue-classic",
            ThemeName::BlueCoastal => "blue-coastal",
        }
    }

    pub fn next(self) -> ThemeName {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn descriptor(self) -> &'static ThemeDescriptor {
        &DESCRIPTORS[self as usize]
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Exact match on the identifier; surrounding whitespace is not stripped.
impl FromStr for ThemeName {
    type Err = PrefsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| PrefsError::UnknownTheme(s.to_string()))
    }
}

/// Three color roles, each `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub cta: &'static str,
    pub accent: &'static str,
}

impl Palette {
    /// `(role, color)` pairs in declaration order.
    pub fn roles(&self) -> [(&'static str, &'static str); 3] {
        [
            ("primary", self.primary),
            ("cta", self.cta),
            ("accent", self.accent),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeDescriptor {
    pub name: ThemeName,
    pub label: &'static str,
    pub description: &'static str,
    pub palette: Palette,
}

// Indexed by `ThemeName as usize`.
static DESCRIPTORS: [ThemeDescriptor; 5] = [
    ThemeDescriptor {
        name: ThemeName::Default,
        label: "Default",
        description: "Original brand colors: deep slate with a warm orange call to action.",
        palette: Palette {
            primary: "#1F2937",
            cta: "#EA580C",
            accent: "#F59E0B",
        },
    },
    ThemeDescriptor {
        name: ThemeName::BlueTrust,
        label: "Blue Trust",
        description: "Navy primary with amber buttons; reads as established and dependable.",
        palette: Palette {
            primary: "#1E3A8A",
            cta: "#F59E0B",
            accent: "#3B82F6",
        },
    },
    ThemeDescriptor {
        name: ThemeName::BlueGulf,
        label: "Blue Gulf",
        description: "Gulf water blue with coral buttons for a relaxed coastal feel.",
        palette: Palette {
            primary: "#0E4C92",
            cta: "#FF7F50",
            accent: "#5BC0EB",
        },
    },
    ThemeDescriptor {
        name: ThemeName::BlueClassic,
        label: "Blue Classic",
        description: "Traditional dark blue and red, the look of a long-running dealership.",
        palette: Palette {
            primary: "#003366",
            cta: "#CC0000",
            accent: "#6699CC",
        },
    },
    ThemeDescriptor {
        name: ThemeName::BlueCoastal,
        label: "Blue Coastal",
        description: "Muted harbor blue with teal accents and an orange call to action.",
        palette: Palette {
            primary: "#1B4F72",
            cta: "#E67E22",
            accent: "#48C9B0",
        },
    },
];

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("static regex"));

pub(crate) fn is_hex_color(s: &str) -> bool {
    HEX_COLOR.is_match(s)
}

/// Holds the selected theme, persists it, and mirrors it onto the document root.
pub struct ThemeStore<D = RootElement> {
    current: ThemeName,
    persistence: Persistence,
    document: D,
}

impl<D: fmt::Debug> fmt::Debug for ThemeStore<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("current", &self.current)
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl<D: DocumentMarker> ThemeStore<D> {
    /// Reads the persisted theme (falling back to `default`) and applies the marker.
    pub fn load(persistence: Persistence, document: D) -> Self {
        let current = match persistence.read(THEME_STORAGE_KEY) {
            None => ThemeName::Default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(theme = %raw, "unrecognized persisted theme; using default");
                ThemeName::Default
            }),
        };
        let mut store = Self {
            current,
            persistence,
            document,
        };
        store.apply_marker();
        store
    }

    pub fn get(&self) -> ThemeName {
        self.current
    }

    pub fn descriptor(&self) -> &'static ThemeDescriptor {
        self.current.descriptor()
    }

    pub fn set(&mut self, name: ThemeName) {
        self.current = name;
        self.persistence.write(THEME_STORAGE_KEY, name.as_str());
        self.apply_marker();
        tracing::debug!(theme = %name, "theme selected");
    }

    /// Like [`ThemeStore::set`] for untyped input. Unknown identifiers leave the
    /// store untouched.
    pub fn set_by_name(&mut self, raw: &str) -> Result<ThemeName, PrefsError> {
        match raw.parse::<ThemeName>() {
            Ok(name) => {
                self.set(name);
                Ok(name)
            }
            Err(err) => {
                tracing::warn!(theme = raw, "ignoring unknown theme");
                Err(err)
            }
        }
    }

    pub fn cycle(&mut self) -> ThemeName {
        let next = self.current.next();
        self.set(next);
        next
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    fn apply_marker(&mut self) {
        match self.current {
            ThemeName::Default => self.document.remove_attribute(THEME_ATTRIBUTE),
            other => self.document.set_attribute(THEME_ATTRIBUTE, other.as_str()),
        }
    }
}

/// Binds [`THEME_CYCLE_CHORD`] to `cycle()` on a shared store.
///
/// The listener holds a weak reference; it stops acting once the store is gone
/// and is removed when the returned guard drops.
pub fn install_cycle_shortcut<D: DocumentMarker + 'static>(
    store: &Rc<RefCell<ThemeStore<D>>>,
    registry: &ShortcutRegistry,
) -> Subscription {
    let store = Rc::downgrade(store);
    registry.subscribe(THEME_CYCLE_CHORD, move |_event| {
        let Some(store) = store.upgrade() else {
            return;
        };
        match store.try_borrow_mut() {
            Ok(mut store) => {
                let next = store.cycle();
                tracing::info!(theme = %next, "theme cycled from keyboard");
            }
            Err(_) => tracing::warn!("theme store busy; shortcut ignored"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::{KeyEvent, Modifiers};
    use crate::storage::tests::BrokenStore;

    fn store() -> (ThemeStore, Persistence) {
        let p = Persistence::in_memory();
        (ThemeStore::load(p.clone(), RootElement::new()), p)
    }

    #[test]
    fn set_then_get_for_every_theme() {
        let (mut store, p) = store();
        for t in ThemeName::ALL {
            store.set(t);
            assert_eq!(store.get(), t);
            assert_eq!(p.read(THEME_STORAGE_KEY).as_deref(), Some(t.as_str()));
        }
    }

    #[test]
    fn cycle_wraps_after_every_theme() {
        let (mut store, _p) = store();
        let seen: Vec<_> = (0..5).map(|_| store.cycle()).collect();
        assert_eq!(
            seen,
            vec![
                ThemeName::BlueTrust,
                ThemeName::BlueGulf,
                ThemeName::BlueClassic,
                ThemeName::BlueCoastal,
                ThemeName::Default,
            ]
        );
        assert_eq!(store.get(), ThemeName::Default);
    }

    #[test]
    fn unknown_name_is_a_no_op() {
        let (mut store, p) = store();
        store.set(ThemeName::BlueGulf);
        assert_eq!(
            store.set_by_name("not-a-real-theme"),
            Err(PrefsError::UnknownTheme("not-a-real-theme".to_string()))
        );
        assert_eq!(store.get(), ThemeName::BlueGulf);
        assert_eq!(p.read(THEME_STORAGE_KEY).as_deref(), Some("blue-gulf"));
    }

    #[test]
    fn marker_removed_for_default() {
        let (mut store, _p) = store();
        assert_eq!(store.document().attribute(THEME_ATTRIBUTE), None);
        store.set(ThemeName::BlueClassic);
        assert_eq!(
            store.document().attribute(THEME_ATTRIBUTE),
            Some("blue-classic")
        );
        store.set(ThemeName::Default);
        assert_eq!(store.document().attribute(THEME_ATTRIBUTE), None);
    }

    #[test]
    fn load_restores_persisted_theme_and_marker() {
        let p = Persistence::in_memory();
        p.write(THEME_STORAGE_KEY, "blue-coastal");
        let store = ThemeStore::load(p, RootElement::new());
        assert_eq!(store.get(), ThemeName::BlueCoastal);
        assert_eq!(
            store.document().attribute(THEME_ATTRIBUTE),
            Some("blue-coastal")
        );
    }

    #[test]
    fn corrupt_persisted_theme_falls_back_to_default() {
        let p = Persistence::in_memory();
        p.write(THEME_STORAGE_KEY, "\"blue-gulf\"");
        let store = ThemeStore::load(p, RootElement::new());
        assert_eq!(store.get(), ThemeName::Default);
    }

    #[test]
    fn padded_persisted_theme_falls_back_to_default() {
        let p = Persistence::in_memory();
        p.write(THEME_STORAGE_KEY, " blue-gulf\n");
        let store = ThemeStore::load(p, RootElement::new());
        assert_eq!(store.get(), ThemeName::Default);
        assert_eq!(store.document().attribute(THEME_ATTRIBUTE), None);
    }

    #[test]
    fn padded_name_is_rejected() {
        let (mut store, _p) = store();
        assert_eq!(
            store.set_by_name("  blue-trust  "),
            Err(PrefsError::UnknownTheme("  blue-trust  ".to_string()))
        );
        assert_eq!(store.get(), ThemeName::Default);
    }

    #[test]
    fn identifiers_match_serde_names() {
        for t in ThemeName::ALL {
            assert_eq!(serde_json::to_value(t).unwrap(), t.as_str());
            assert_eq!(t.as_str().parse::<ThemeName>().unwrap(), t);
        }
    }

    #[test]
    fn broken_storage_still_switches_themes() {
        let mut store = ThemeStore::load(Persistence::new(BrokenStore), RootElement::new());
        assert_eq!(store.get(), ThemeName::Default);
        store.cycle();
        assert_eq!(store.get(), ThemeName::BlueTrust);
    }

    #[test]
    fn palettes_are_hex_colors() {
        for t in ThemeName::ALL {
            let d = t.descriptor();
            assert_eq!(d.name, t);
            for (role, color) in d.palette.roles() {
                assert!(is_hex_color(color), "{t} {role} = {color}");
            }
        }
    }

    #[test]
    fn shortcut_cycles_until_guard_drops() {
        let registry = ShortcutRegistry::new();
        let store = Rc::new(RefCell::new(ThemeStore::load(
            Persistence::in_memory(),
            RootElement::new(),
        )));
        let press = KeyEvent::new('T', Modifiers::CTRL_SHIFT);

        let guard = install_cycle_shortcut(&store, &registry);
        registry.dispatch(&press);
        assert_eq!(store.borrow().get(), ThemeName::BlueTrust);

        drop(guard);
        registry.dispatch(&press);
        assert_eq!(store.borrow().get(), ThemeName::BlueTrust);
    }
}
