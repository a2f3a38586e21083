use kuchiki::traits::TendrilSink as _;
use url::Url;

use crate::consent::{ConsentCategory, ConsentRecord};

/// Attribute naming the consent category of a gated script.
pub const CATEGORY_ATTRIBUTE: &str = "data-consent-category";

/// Fails if the page would auto-load a script the consent state does not allow.
///
/// A `script[src]` passes when its category is allowed, or when it carries no
/// category and is first-party (relative, or on `base_url`'s origin). Inert
/// placeholders must be `type="text/plain"` so the browser never runs them.
pub fn assert_consent_gated(
    html: &str,
    consent: Option<&ConsentRecord>,
    base_url: Option<&Url>,
) -> anyhow::Result<()> {
    let doc = kuchiki::parse_html().one(html);

    if let Ok(nodes) = doc.select("script[src]") {
        for node in nodes {
            let attrs = node.attributes.borrow();
            let src = attrs.get("src").unwrap_or("");
            match attrs.get(CATEGORY_ATTRIBUTE) {
                Some(raw) => {
                    let category = parse_category(raw)?;
                    if !category.allowed_by(consent) {
                        anyhow::bail!(
                            "consent check failed: <script src=\"{}\"> needs {} consent",
                            src,
                            category
                        );
                    }
                }
                None if is_third_party(src, base_url) => {
                    anyhow::bail!(
                        "consent check failed: third-party <script src=\"{}\"> has no consent category",
                        src
                    );
                }
                None => {}
            }
        }
    }

    if let Ok(nodes) = doc.select("script[data-src]") {
        for node in nodes {
            let attrs = node.attributes.borrow();
            if attrs.get("type") != Some("text/plain") {
                anyhow::bail!(
                    "consent check failed: placeholder for {} is executable",
                    attrs.get("data-src").unwrap_or("")
                );
            }
            if let Some(raw) = attrs.get(CATEGORY_ATTRIBUTE) {
                parse_category(raw)?;
            }
        }
    }

    Ok(())
}

fn parse_category(raw: &str) -> anyhow::Result<ConsentCategory> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| anyhow::anyhow!("consent check failed: unknown category {:?}", raw))
}

fn is_third_party(src: &str, base_url: Option<&Url>) -> bool {
    let s = src.trim();
    let lowered = s.to_ascii_lowercase();
    let absolute = lowered.starts_with("http://")
        || lowered.starts_with("https://")
        || lowered.starts_with("//");
    if !absolute {
        return false;
    }
    let Some(base) = base_url else {
        return true;
    };
    let parsed = if s.starts_with("//") {
        Url::parse(&format!("{}:{}", base.scheme(), s))
    } else {
        Url::parse(s)
    };
    match parsed {
        Ok(url) => url.origin() != base.origin(),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_category_is_rejected() {
        let html = r#"<script src="https://a.example/x.js" data-consent-category="analytics"></script>"#;
        assert!(assert_consent_gated(html, None, None).is_err());
        assert!(assert_consent_gated(html, Some(&ConsentRecord::NONE), None).is_err());
        assert!(assert_consent_gated(html, Some(&ConsentRecord::ALL), None).is_ok());
    }

    #[test]
    fn inert_placeholders_pass() {
        let html = r#"<script type="text/plain" data-src="https://a.example/x.js" data-consent-category="marketing"></script>"#;
        assert!(assert_consent_gated(html, None, None).is_ok());

        let executable = r#"<script data-src="https://a.example/x.js" data-consent-category="marketing"></script>"#;
        assert!(assert_consent_gated(executable, None, None).is_err());
    }

    #[test]
    fn uncategorized_scripts_must_be_first_party() {
        let base = Url::parse("https://homes.example/").unwrap();
        assert!(assert_consent_gated(r#"<script src="assets/js/prefs.js"></script>"#, None, None).is_ok());
        assert!(
            assert_consent_gated(
                r#"<script src="https://homes.example/app.js"></script>"#,
                None,
                Some(&base)
            )
            .is_ok()
        );
        assert!(
            assert_consent_gated(r#"<script src="//cdn.example/app.js"></script>"#, None, Some(&base))
                .is_err()
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let html = r#"<script src="https://a.example/x.js" data-consent-category="everything"></script>"#;
        assert!(assert_consent_gated(html, Some(&ConsentRecord::ALL), None).is_err());
    }
}
