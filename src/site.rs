use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::consent::ConsentCategory;

/// A script the site loads only once its category is consented to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThirdPartyScript {
    pub name: String,
    pub src: String,
    pub category: ConsentCategory,
}

/// Site-level copy and links the views render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SiteConfig {
    pub brand: String,
    /// Canonical origin; scripts served from it are first-party.
    pub base_url: Option<Url>,
    pub phone: String,
    pub cta_label: String,
    pub cta_href: String,
    pub privacy_href: String,
    pub scripts: Vec<ThirdPartyScript>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            brand: "Bayou Country Homes".to_string(),
            base_url: None,
            phone: "(555) 010-4663".to_string(),
            cta_label: "Get Pre-Qualified".to_string(),
            cta_href: "/pre-qualify".to_string(),
            privacy_href: "/privacy-policy".to_string(),
            scripts: vec![
                ThirdPartyScript {
                    name: "google-analytics".to_string(),
                    src: "https://www.googletagmanager.com/gtag/js?id=G-0000000000".to_string(),
                    category: ConsentCategory::Analytics,
                },
                ThirdPartyScript {
                    name: "meta-pixel".to_string(),
                    src: "https://connect.facebook.net/en_US/fbevents.js".to_string(),
                    category: ConsentCategory::Marketing,
                },
                ThirdPartyScript {
                    name: "live-chat".to_string(),
                    src: "https://widget.chat.example/loader.js".to_string(),
                    category: ConsentCategory::Functional,
                },
            ],
        }
    }
}

static NON_DIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9+]").expect("static regex"));

impl SiteConfig {
    /// Loads a JSON config, or the built-in one when `path` is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let config: SiteConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse site config {}", path.display()))?;
        if config.phone_digits().is_empty() {
            anyhow::bail!("site config {}: phone has no digits", path.display());
        }
        Ok(config)
    }

    pub fn phone_digits(&self) -> String {
        NON_DIAL.replace_all(&self.phone, "").into_owned()
    }

    pub fn tel_href(&self) -> String {
        format!("tel:{}", self.phone_digits())
    }
}
