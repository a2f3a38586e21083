use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use crate::consent::ConsentStore;
use crate::document::RootElement;
use crate::error::PrefsError;
use crate::shortcut::{ShortcutRegistry, Subscription};
use crate::storage::Persistence;
use crate::theme::{ThemeStore, install_cycle_shortcut};

/// Owner of both preference stores for one page lifetime.
///
/// Built once at startup and handed to views by reference. Until `mount`
/// runs, every accessor fails with [`PrefsError::NotMounted`] instead of
/// handing out a default store.
#[derive(Debug, Default)]
pub struct SiteContext {
    theme: Option<Rc<RefCell<ThemeStore>>>,
    consent: Option<ConsentStore>,
    persistence: Option<Persistence>,
    shortcut: Option<Subscription>,
}

impl SiteContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted(persistence: Persistence, shortcuts: &ShortcutRegistry) -> Self {
        let mut ctx = Self::new();
        ctx.mount(persistence, shortcuts);
        ctx
    }

    /// Loads both stores and installs the theme shortcut. Mounting again
    /// releases the previous listener first.
    pub fn mount(&mut self, persistence: Persistence, shortcuts: &ShortcutRegistry) {
        self.unmount();

        let theme = Rc::new(RefCell::new(ThemeStore::load(
            persistence.clone(),
            RootElement::new(),
        )));
        self.shortcut = Some(install_cycle_shortcut(&theme, shortcuts));
        self.theme = Some(theme);
        self.consent = Some(ConsentStore::new(persistence.clone()));
        self.persistence = Some(persistence);
        tracing::debug!("site context mounted");
    }

    pub fn unmount(&mut self) {
        let was_mounted = self.is_mounted();
        self.shortcut = None;
        self.theme = None;
        self.consent = None;
        self.persistence = None;
        if was_mounted {
            tracing::debug!("site context unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.theme.is_some()
    }

    pub fn theme(&self) -> Result<RefMut<'_, ThemeStore>, PrefsError> {
        self.theme
            .as_ref()
            .ok_or(PrefsError::NotMounted("theme"))?
            .try_borrow_mut()
            .map_err(|_| PrefsError::Busy("theme"))
    }

    pub fn consent(&self) -> Result<&ConsentStore, PrefsError> {
        self.consent.as_ref().ok_or(PrefsError::NotMounted("consent"))
    }

    pub fn consent_mut(&mut self) -> Result<&mut ConsentStore, PrefsError> {
        self.consent.as_mut().ok_or(PrefsError::NotMounted("consent"))
    }

    /// True when a write failed and preferences will not survive a reload.
    pub fn is_degraded(&self) -> bool {
        self.persistence
            .as_ref()
            .is_some_and(Persistence::is_degraded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::{KeyEvent, Modifiers};
    use crate::storage::tests::BrokenStore;
    use crate::theme::ThemeName;

    #[test]
    fn access_before_mount_fails_fast() {
        let mut ctx = SiteContext::new();
        assert_eq!(ctx.theme().err(), Some(PrefsError::NotMounted("theme")));
        assert_eq!(ctx.consent().err(), Some(PrefsError::NotMounted("consent")));
        assert!(ctx.consent_mut().is_err());
    }

    #[test]
    fn remount_keeps_a_single_listener() {
        let shortcuts = ShortcutRegistry::new();
        let persistence = Persistence::in_memory();
        let mut ctx = SiteContext::new();

        ctx.mount(persistence.clone(), &shortcuts);
        ctx.mount(persistence.clone(), &shortcuts);
        assert_eq!(shortcuts.listener_count(), 1);

        let press = KeyEvent::new('T', Modifiers::CTRL_SHIFT);
        assert_eq!(shortcuts.dispatch(&press), 1);
        assert_eq!(ctx.theme().unwrap().get(), ThemeName::BlueTrust);

        ctx.unmount();
        assert_eq!(shortcuts.listener_count(), 0);
        assert!(ctx.theme().is_err());
    }

    #[test]
    fn dropping_context_releases_listener() {
        let shortcuts = ShortcutRegistry::new();
        {
            let _ctx = SiteContext::mounted(Persistence::in_memory(), &shortcuts);
            assert_eq!(shortcuts.listener_count(), 1);
        }
        assert_eq!(shortcuts.listener_count(), 0);
    }

    #[test]
    fn stores_share_one_persistence() {
        let shortcuts = ShortcutRegistry::new();
        let persistence = Persistence::in_memory();
        let mut ctx = SiteContext::mounted(persistence.clone(), &shortcuts);

        ctx.theme().unwrap().set(ThemeName::BlueGulf);
        ctx.consent_mut().unwrap().accept_all();

        let reloaded = SiteContext::mounted(persistence, &shortcuts);
        assert_eq!(reloaded.theme().unwrap().get(), ThemeName::BlueGulf);
        assert!(reloaded.consent().unwrap().is_decided());
    }

    #[test]
    fn reports_degraded_storage() {
        let shortcuts = ShortcutRegistry::new();
        let mut ctx = SiteContext::mounted(Persistence::new(BrokenStore), &shortcuts);
        assert!(!ctx.is_degraded());
        ctx.consent_mut().unwrap().dismiss_minimal();
        assert!(ctx.is_degraded());
    }
}
