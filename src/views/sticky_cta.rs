use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use maud::{Markup, html};
use tokio::task::JoinHandle;

use crate::site::SiteConfig;

/// How long a dismissed bar stays hidden.
pub const REAPPEAR_DELAY: Duration = Duration::from_secs(30);

/// Mobile call/CTA bar pinned to the bottom of the viewport.
///
/// Dismissing hides it and schedules it to come back after `delay`. The timer
/// is owned by the view: a second dismiss restarts it and dropping the view
/// aborts it.
#[derive(Debug)]
pub struct StickyCta {
    visible: Arc<AtomicBool>,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Default for StickyCta {
    fn default() -> Self {
        Self::new()
    }
}

impl StickyCta {
    pub fn new() -> Self {
        Self::with_delay(REAPPEAR_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            visible: Arc::new(AtomicBool::new(true)),
            delay,
            pending: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn dismiss(&mut self) {
        self.visible.store(false, Ordering::Relaxed);
        self.cancel_pending();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime; sticky CTA stays hidden");
            return;
        };
        let visible = self.visible.clone();
        let delay = self.delay;
        self.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            visible.store(true, Ordering::Relaxed);
            tracing::debug!("sticky CTA restored");
        }));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn render(&self, site: &SiteConfig) -> Markup {
        html! {
            div id="sticky-cta" class="hp-sticky-cta" data-reappear-ms=(self.delay.as_millis())
                hidden[!self.is_visible()] {
                a class="hp-btn hp-btn-ghost" href=(site.tel_href()) { "Call " (site.phone) }
                a class="hp-btn hp-btn-cta" href=(site.cta_href) { (site.cta_label) }
                button type="button" class="hp-sticky-close" data-sticky-action="dismiss"
                    aria-label="Dismiss" { "×" }
            }
        }
    }
}

impl Drop for StickyCta {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reappears_after_delay() {
        let mut cta = StickyCta::new();
        assert!(cta.is_visible());

        cta.dismiss();
        assert!(!cta.is_visible());

        tokio::time::sleep(REAPPEAR_DELAY - Duration::from_secs(1)).await;
        assert!(!cta.is_visible());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(cta.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn second_dismiss_restarts_the_delay() {
        let mut cta = StickyCta::with_delay(Duration::from_secs(10));
        cta.dismiss();
        tokio::time::sleep(Duration::from_secs(8)).await;
        cta.dismiss();

        tokio::time::sleep(Duration::from_secs(8)).await;
        assert!(!cta.is_visible());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(cta.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels_reappearance() {
        let mut cta = StickyCta::new();
        cta.dismiss();
        let visible = cta.visible.clone();
        drop(cta);

        tokio::time::sleep(REAPPEAR_DELAY * 2).await;
        assert!(!visible.load(Ordering::Relaxed));
    }

    #[test]
    fn dismiss_without_runtime_stays_hidden() {
        let mut cta = StickyCta::new();
        cta.dismiss();
        assert!(!cta.is_visible());
    }

    #[test]
    fn render_links_phone_and_cta() {
        let site = SiteConfig::default();
        let html = StickyCta::new().render(&site).into_string();
        assert!(html.contains(r#"href="tel:5550104663""#));
        assert!(html.contains(r#"data-reappear-ms="30000""#));
        assert!(html.contains(&site.cta_label));
    }
}
