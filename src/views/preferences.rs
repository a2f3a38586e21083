use maud::{Markup, html};

use crate::consent::{ConsentCategory, ConsentRecord, ConsentStore};
use crate::site::SiteConfig;

/// "Manage preferences" dialog.
///
/// Toggles only change the working copy; [`PreferencesModal::save`] and
/// [`PreferencesModal::accept_all`] are the only paths into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferencesModal {
    working: ConsentRecord,
}

impl PreferencesModal {
    /// Seeds the toggles from the current decision, all off when undecided.
    pub fn open(store: &ConsentStore) -> Self {
        Self {
            working: store.record().unwrap_or(ConsentRecord::NONE),
        }
    }

    pub fn working(&self) -> ConsentRecord {
        self.working
    }

    pub fn is_enabled(&self, category: ConsentCategory) -> bool {
        self.working.get(category)
    }

    /// Flips one category and returns its new state. Essential stays on.
    pub fn toggle(&mut self, category: ConsentCategory) -> bool {
        if category.is_required() {
            tracing::debug!(%category, "required category cannot be toggled");
            return true;
        }
        let next = !self.working.get(category);
        self.working.set(category, next);
        next
    }

    pub fn save(self, store: &mut ConsentStore) -> ConsentRecord {
        store.save_preferences(self.working);
        self.working
    }

    pub fn accept_all(self, store: &mut ConsentStore) -> ConsentRecord {
        store.accept_all();
        ConsentRecord::ALL
    }

    /// Discards the working copy.
    pub fn close(self) {}

    pub fn render(&self, site: &SiteConfig, open: bool) -> Markup {
        html! {
            div id="consent-preferences" class="hp-modal" role="dialog" aria-modal="true"
                aria-labelledby="consent-preferences-title" hidden[!open] {
                div class="hp-modal-panel" {
                    h2 id="consent-preferences-title" { "Cookie preferences" }
                    p class="hp-modal-intro" {
                        "Choose which optional cookies " (site.brand) " may use. "
                        "You can change this at any time."
                    }
                    form class="hp-consent-form" {
                        @for category in ConsentCategory::ALL {
                            (self.render_category(category))
                        }
                    }
                    div class="hp-modal-actions" {
                        button type="button" class="hp-btn hp-btn-ghost" data-consent-action="close" {
                            "Cancel"
                        }
                        button type="button" class="hp-btn" data-consent-action="save" {
                            "Save preferences"
                        }
                        button type="button" class="hp-btn hp-btn-cta" data-consent-action="accept-all" {
                            "Accept all"
                        }
                    }
                }
            }
        }
    }

    fn render_category(&self, category: ConsentCategory) -> Markup {
        let id = format!("consent-{}", category.as_str());
        html! {
            div class="hp-consent-category" {
                label class="hp-switch" for=(id) {
                    input type="checkbox" id=(id) name=(category.as_str())
                        checked[self.is_enabled(category)] disabled[category.is_required()];
                    span class="hp-switch-label" { (category.label()) }
                }
                p class="hp-consent-category-desc" { (category.description()) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Persistence;

    #[test]
    fn unsaved_toggles_are_discarded() {
        let p = Persistence::in_memory();
        let mut store = ConsentStore::new(p.clone());

        let mut modal = PreferencesModal::open(&store);
        assert!(modal.toggle(ConsentCategory::Analytics));
        modal.close();

        assert_eq!(store.reload(), None);
        assert_eq!(ConsentStore::new(p).record(), None);
    }

    #[test]
    fn reopening_starts_from_saved_record() {
        let mut store = ConsentStore::new(Persistence::in_memory());
        store.save_preferences(ConsentRecord {
            analytics: true,
            marketing: false,
            functional: true,
        });

        let mut modal = PreferencesModal::open(&store);
        assert!(modal.is_enabled(ConsentCategory::Analytics));
        assert!(!modal.is_enabled(ConsentCategory::Marketing));

        assert!(!modal.toggle(ConsentCategory::Functional));
        assert_eq!(store.record().map(|r| r.functional), Some(true));

        let saved = modal.save(&mut store);
        assert_eq!(
            saved,
            ConsentRecord {
                analytics: true,
                marketing: false,
                functional: false,
            }
        );
        assert_eq!(store.load().record(), Some(saved));
    }

    #[test]
    fn essential_cannot_be_disabled() {
        let store = ConsentStore::new(Persistence::in_memory());
        let mut modal = PreferencesModal::open(&store);
        assert!(modal.toggle(ConsentCategory::Essential));
        assert!(modal.is_enabled(ConsentCategory::Essential));
        assert_eq!(modal.working(), ConsentRecord::NONE);
    }

    #[test]
    fn accept_all_overrides_working_copy() {
        let mut store = ConsentStore::new(Persistence::in_memory());
        let mut modal = PreferencesModal::open(&store);
        modal.toggle(ConsentCategory::Marketing);
        modal.accept_all(&mut store);
        assert_eq!(store.record(), Some(ConsentRecord::ALL));
    }

    #[test]
    fn render_reflects_working_state() {
        let store = ConsentStore::new(Persistence::in_memory());
        let mut modal = PreferencesModal::open(&store);
        modal.toggle(ConsentCategory::Marketing);
        let html = modal.render(&SiteConfig::default(), true).into_string();

        assert!(html.contains(r#"id="consent-marketing" name="marketing" checked"#));
        assert!(html.contains(r#"id="consent-essential" name="essential" checked disabled"#));
        assert!(!html.contains(r#"name="analytics" checked"#));
    }
}
