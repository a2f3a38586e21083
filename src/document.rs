use std::collections::BTreeMap;

/// Attribute on the root element that carries the selected theme.
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// Document-level side effects a store may apply to the page root.
pub trait DocumentMarker {
    fn set_attribute(&mut self, name: &str, value: &str);
    fn remove_attribute(&mut self, name: &str);
}

/// In-memory stand-in for `<html>`; the page renderer reads it back when
/// emitting the root element.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RootElement {
    attributes: BTreeMap<String, String>,
}

impl RootElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl DocumentMarker for RootElement {
    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }
}
