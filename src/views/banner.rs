use maud::{Markup, html};

use crate::consent::ConsentStore;
use crate::site::SiteConfig;
use crate::views::PreferencesModal;

/// The consent prompt. Shown iff no decision exists when the page mounts;
/// hidden by the first decision and never shown again in that page view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsentBanner {
    visible: bool,
}

impl ConsentBanner {
    pub fn mount(store: &ConsentStore) -> Self {
        Self {
            visible: !store.is_decided(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn accept_all(&mut self, store: &mut ConsentStore) {
        store.accept_all();
        self.visible = false;
    }

    pub fn dismiss(&mut self, store: &mut ConsentStore) {
        store.dismiss_minimal();
        self.visible = false;
    }

    /// Opening preferences is not a decision; the banner stays up.
    pub fn open_preferences(&self, store: &ConsentStore) -> PreferencesModal {
        PreferencesModal::open(store)
    }

    /// Re-checks the store after the preferences modal closes.
    pub fn sync(&mut self, store: &ConsentStore) {
        if store.is_decided() {
            self.visible = false;
        }
    }

    pub fn render(&self, site: &SiteConfig) -> Markup {
        html! {
            section id="consent-banner" class="hp-consent-banner" role="region"
                aria-label="Cookie consent" hidden[!self.visible] {
                p class="hp-consent-text" {
                    (site.brand) " uses cookies to run this site and, with your permission, "
                    "to measure traffic and show you relevant homes elsewhere. "
                    a href=(site.privacy_href) { "Privacy Policy" }
                }
                div class="hp-consent-actions" {
                    button type="button" class="hp-btn hp-btn-ghost" data-consent-action="preferences" {
                        "Manage preferences"
                    }
                    button type="button" class="hp-btn hp-btn-ghost" data-consent-action="dismiss" {
                        "Essential only"
                    }
                    button type="button" class="hp-btn hp-btn-cta" data-consent-action="accept-all" {
                        "Accept all"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::{ConsentCategory, ConsentRecord};
    use crate::storage::Persistence;

    #[test]
    fn shown_only_when_undecided_at_mount() {
        let p = Persistence::in_memory();
        let mut store = ConsentStore::new(p.clone());
        assert!(ConsentBanner::mount(&store).is_visible());

        store.dismiss_minimal();
        assert!(!ConsentBanner::mount(&ConsentStore::new(p)).is_visible());
    }

    #[test]
    fn decisive_actions_hide_it() {
        let mut store = ConsentStore::new(Persistence::in_memory());
        let mut banner = ConsentBanner::mount(&store);
        banner.accept_all(&mut store);
        assert!(!banner.is_visible());
        assert_eq!(store.record(), Some(ConsentRecord::ALL));

        let mut store = ConsentStore::new(Persistence::in_memory());
        let mut banner = ConsentBanner::mount(&store);
        banner.dismiss(&mut store);
        assert!(!banner.is_visible());
        assert_eq!(store.record(), Some(ConsentRecord::NONE));
    }

    #[test]
    fn preferences_keep_banner_until_saved() {
        let mut store = ConsentStore::new(Persistence::in_memory());
        let mut banner = ConsentBanner::mount(&store);

        let mut modal = banner.open_preferences(&store);
        assert!(banner.is_visible());
        modal.toggle(ConsentCategory::Analytics);
        modal.close();
        banner.sync(&store);
        assert!(banner.is_visible());
        assert!(!store.is_decided());

        let mut modal = banner.open_preferences(&store);
        modal.toggle(ConsentCategory::Functional);
        modal.save(&mut store);
        banner.sync(&store);
        assert!(!banner.is_visible());
    }

    #[test]
    fn render_marks_hidden_banner() {
        let site = SiteConfig::default();
        let mut store = ConsentStore::new(Persistence::in_memory());
        let banner = ConsentBanner::mount(&store);
        let html = banner.render(&site).into_string();
        assert!(html.contains(r#"id="consent-banner""#));
        assert!(!html.contains("hidden"));
        assert!(html.contains(r#"data-consent-action="accept-all""#));

        store.accept_all();
        let html = ConsentBanner::mount(&store).render(&site).into_string();
        assert!(html.contains("hidden"));
    }
}
