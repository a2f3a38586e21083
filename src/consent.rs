use std::fmt;

use serde::{Deserialize, Serialize};

use crate::site::ThirdPartyScript;
use crate::storage::Persistence;

/// Storage key for the consent record (JSON object).
pub const CONSENT_STORAGE_KEY: &str = "cookieConsent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentCategory {
    /// Always on; never stored.
    Essential,
    Analytics,
    Marketing,
    Functional,
}

impl ConsentCategory {
    pub const ALL: [ConsentCategory; 4] = [
        ConsentCategory::Essential,
        ConsentCategory::Analytics,
        ConsentCategory::Marketing,
        ConsentCategory::Functional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConsentCategory::Essential => "essential",
            ConsentCategory::Analytics => "analytics",
            ConsentCategory::Marketing => "marketing",
            ConsentCategory::Functional => "functional",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConsentCategory::Essential => "Essential",
            ConsentCategory::Analytics => "Analytics",
            ConsentCategory::Marketing => "Marketing",
            ConsentCategory::Functional => "Functional",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ConsentCategory::Essential => {
                "Required for the site to work, such as remembering these choices. Always on."
            }
            ConsentCategory::Analytics => {
                "Helps us understand which homes and pages visitors look at so we can improve the site."
            }
            ConsentCategory::Marketing => {
                "Lets advertising partners show you relevant home listings on other sites."
            }
            ConsentCategory::Functional => {
                "Enables extras like live chat, saved searches and embedded virtual tours."
            }
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, ConsentCategory::Essential)
    }

    /// Whether this category may run under `record` (`None` = undecided).
    pub fn allowed_by(self, record: Option<&ConsentRecord>) -> bool {
        match (self, record) {
            (ConsentCategory::Essential, _) => true,
            (_, None) => false,
            (category, Some(record)) => record.get(category),
        }
    }
}

impl fmt::Display for ConsentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's choice for each optional tracking category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub analytics: bool,
    pub marketing: bool,
    pub functional: bool,
}

impl ConsentRecord {
    pub const ALL: ConsentRecord = ConsentRecord {
        analytics: true,
        marketing: true,
        functional: true,
    };
    pub const NONE: ConsentRecord = ConsentRecord {
        analytics: false,
        marketing: false,
        functional: false,
    };

    pub fn get(&self, category: ConsentCategory) -> bool {
        match category {
            ConsentCategory::Essential => true,
            ConsentCategory::Analytics => self.analytics,
            ConsentCategory::Marketing => self.marketing,
            ConsentCategory::Functional => self.functional,
        }
    }

    /// Sets one optional category. Essential is fixed and ignored here.
    pub fn set(&mut self, category: ConsentCategory, enabled: bool) {
        match category {
            ConsentCategory::Essential => {}
            ConsentCategory::Analytics => self.analytics = enabled,
            ConsentCategory::Marketing => self.marketing = enabled,
            ConsentCategory::Functional => self.functional = enabled,
        }
    }
}

/// Outcome of reading the persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentLoad {
    Decided(ConsentRecord),
    Absent,
    /// A payload exists but is not a record; treated as undecided.
    Malformed,
}

impl ConsentLoad {
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return ConsentLoad::Absent;
        };
        match serde_json::from_str::<ConsentRecord>(raw) {
            Ok(record) => ConsentLoad::Decided(record),
            Err(err) => {
                tracing::debug!(error = %err, "malformed consent payload; treating as undecided");
                ConsentLoad::Malformed
            }
        }
    }

    pub fn record(self) -> Option<ConsentRecord> {
        match self {
            ConsentLoad::Decided(record) => Some(record),
            ConsentLoad::Absent | ConsentLoad::Malformed => None,
        }
    }
}

/// Holds the consent decision, if any, and writes every decision through.
#[derive(Debug)]
pub struct ConsentStore {
    record: Option<ConsentRecord>,
    persistence: Persistence,
}

impl ConsentStore {
    pub fn new(persistence: Persistence) -> Self {
        let mut store = Self {
            record: None,
            persistence,
        };
        store.reload();
        store
    }

    /// Reads the persisted record without touching the cached state.
    pub fn load(&self) -> ConsentLoad {
        ConsentLoad::decode(self.persistence.read(CONSENT_STORAGE_KEY).as_deref())
    }

    /// Replaces the cached state with whatever is persisted now.
    pub fn reload(&mut self) -> Option<ConsentRecord> {
        self.record = self.load().record();
        self.record
    }

    pub fn accept_all(&mut self) {
        self.save_preferences(ConsentRecord::ALL);
    }

    pub fn dismiss_minimal(&mut self) {
        self.save_preferences(ConsentRecord::NONE);
    }

    /// Persists `record` verbatim, replacing any earlier decision.
    pub fn save_preferences(&mut self, record: ConsentRecord) {
        match serde_json::to_string(&record) {
            Ok(json) => self.persistence.write(CONSENT_STORAGE_KEY, &json),
            Err(err) => tracing::error!(error = %err, "failed to encode consent record"),
        }
        self.record = Some(record);
        tracing::info!(
            analytics = record.analytics,
            marketing = record.marketing,
            functional = record.functional,
            "consent saved"
        );
    }

    pub fn is_decided(&self) -> bool {
        self.record.is_some()
    }

    pub fn record(&self) -> Option<ConsentRecord> {
        self.record
    }

    pub fn allows(&self, category: ConsentCategory) -> bool {
        category.allowed_by(self.record.as_ref())
    }

    pub fn authorized_scripts<'a>(
        &self,
        scripts: &'a [ThirdPartyScript],
    ) -> impl Iterator<Item = &'a ThirdPartyScript> {
        let record = self.record;
        scripts
            .iter()
            .filter(move |s| s.category.allowed_by(record.as_ref()))
    }
}
