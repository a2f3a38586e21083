use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::assets::AssetRef;
use crate::consent::ConsentRecord;
use crate::context::SiteContext;
use crate::document::THEME_ATTRIBUTE;
use crate::site::{SiteConfig, ThirdPartyScript};
use crate::views::{ConsentBanner, PreferencesModal, StickyCta, sms, theme_picker};

/// Renders the site shell from the mounted stores.
///
/// The root marker, banner visibility, modal toggles and script gating all
/// reflect the stores at render time; the client runtime takes over from there.
pub fn build_page(
    ctx: &SiteContext,
    site: &SiteConfig,
    sticky: &StickyCta,
    css: &AssetRef,
    js: &AssetRef,
) -> anyhow::Result<String> {
    let (current, marker) = {
        let theme = ctx.theme()?;
        let marker = theme
            .document()
            .attribute(THEME_ATTRIBUTE)
            .map(str::to_string);
        (theme.get(), marker)
    };
    let consent = ctx.consent()?;
    let record = consent.record();
    let banner = ConsentBanner::mount(consent);
    let modal = PreferencesModal::open(consent);

    let markup: Markup = html! {
        (DOCTYPE)
        html lang="en" data-theme=[marker.as_deref()] {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (site.brand) }
                @if let Some(base) = &site.base_url {
                    link rel="canonical" href=(base.as_str());
                }
                @match css {
                    AssetRef::Linked(href) => { link rel="stylesheet" href=(href); }
                    AssetRef::Inline(text) => { style { (PreEscaped(text)) } }
                }
            }
            body class="hp" {
                header class="hp-header" {
                    div class="hp-container hp-header-inner" {
                        p class="hp-brand" { (site.brand) }
                        (theme_picker::render(current))
                    }
                }
                main class="hp-container hp-main" {
                    h1 { "Find your new home" }
                    p {
                        "Talk to a home specialist at "
                        a href=(site.tel_href()) { (site.phone) }
                        " or send us your number and we will reach out."
                    }
                    form class="hp-contact" action=(site.cta_href) method="get" {
                        label {
                            "Mobile number "
                            input type="tel" name="phone" autocomplete="tel";
                        }
                        (sms::render(site))
                        button type="submit" class="hp-btn hp-btn-cta" { (site.cta_label) }
                    }
                }
                (banner.render(site))
                (modal.render(site, false))
                (sticky.render(site))
                @for script in &site.scripts {
                    (render_gated_script(script, record.as_ref()))
                }
                @match js {
                    AssetRef::Linked(src) => { script src=(src) {} }
                    AssetRef::Inline(text) => { script { (PreEscaped(text)) } }
                }
            }
        }
    };
    Ok(markup.into_string())
}

/// Authorized scripts load normally; the rest stay inert until consent.
fn render_gated_script(script: &ThirdPartyScript, record: Option<&ConsentRecord>) -> Markup {
    let category = script.category.as_str();
    if script.category.allowed_by(record) {
        html! {
            script src=(script.src) async[true] data-name=(script.name)
                data-consent-category=(category) {}
        }
    } else {
        html! {
            script type="text/plain" data-src=(script.src) data-name=(script.name)
                data-consent-category=(category) {}
        }
    }
}
