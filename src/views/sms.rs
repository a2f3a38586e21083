use maud::{Markup, html};

use crate::site::SiteConfig;

/// Form field name of the opt-in checkbox.
pub const SMS_OPT_IN_FIELD: &str = "sms_opt_in";

/// Opt-in checkbox plus the carrier-required disclosure. The box is never
/// pre-checked.
pub fn render(site: &SiteConfig) -> Markup {
    html! {
        div class="hp-sms-optin" {
            label class="hp-sms-consent" {
                input type="checkbox" name=(SMS_OPT_IN_FIELD) value="yes"
                    aria-describedby="sms-disclosure";
                span { "Text me about homes, financing and appointment updates." }
            }
            p id="sms-disclosure" class="hp-sms-disclosure" {
                "By checking this box you agree to receive recurring automated marketing and "
                "informational text messages from " (site.brand) " at the number you provide. "
                "Consent is not a condition of purchase. Message frequency varies. "
                "Message and data rates may apply. Reply STOP to opt out or HELP for help. "
                "Questions? Call "
                a href=(site.tel_href()) { (site.phone) }
                ". See our "
                a href=(site.privacy_href) { "Privacy Policy" }
                "."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disclosure_names_brand_and_opt_out() {
        let site = SiteConfig::default();
        let html = render(&site).into_string();
        assert!(html.contains(&site.brand));
        assert!(html.contains("Reply STOP to opt out"));
        assert!(html.contains("Consent is not a condition of purchase"));
        assert!(html.contains(&format!(r#"href="{}""#, site.tel_href())));
        assert!(!html.contains("checked"));
    }
}
