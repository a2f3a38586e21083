use crate::consent::{CONSENT_STORAGE_KEY, ConsentCategory};
use crate::document::THEME_ATTRIBUTE;
use crate::theme::{THEME_STORAGE_KEY, ThemeName};

pub const BUILTIN_CSS: &str = include_str!("builtin.css");

// Placeholders (`__NAME__`) are filled by `prefs_runtime_js` so the browser
// side shares keys, theme order and categories with the Rust stores.
const PREFS_RUNTIME_TEMPLATE: &str = r#"(function () {
  if (window.__homesitePrefs) return;
  window.__homesitePrefs = true;

  var THEME_KEY = __THEME_KEY__;
  var CONSENT_KEY = __CONSENT_KEY__;
  var THEME_ATTR = __THEME_ATTR__;
  var THEMES = __THEMES__;
  var OPTIONAL = __OPTIONAL__;
  var root = document.documentElement;

  var memory = {};
  var storageOk = true;

  function storeGet(key) {
    if (Object.prototype.hasOwnProperty.call(memory, key)) return memory[key];
    try {
      return localStorage.getItem(key);
    } catch (_) {
      return null;
    }
  }

  function storeSet(key, value) {
    if (storageOk) {
      try {
        localStorage.setItem(key, value);
        return;
      } catch (err) {
        storageOk = false;
        console.warn("storage unavailable; preferences kept for this page only", err);
      }
    }
    memory[key] = value;
  }

  // Theme

  var current = storeGet(THEME_KEY);
  if (THEMES.indexOf(current) < 0) current = "default";

  function applyTheme() {
    if (current === "default") {
      root.removeAttribute(THEME_ATTR);
    } else {
      root.setAttribute(THEME_ATTR, current);
    }
    var picker = document.getElementById("theme-picker");
    if (picker) picker.value = current;
  }

  function setTheme(name) {
    if (THEMES.indexOf(name) < 0) {
      console.warn("ignoring unknown theme", name);
      return;
    }
    current = name;
    storeSet(THEME_KEY, name);
    applyTheme();
  }

  function cycleTheme() {
    setTheme(THEMES[(THEMES.indexOf(current) + 1) % THEMES.length]);
  }

  applyTheme();

  document.addEventListener("keydown", function (e) {
    if (e.ctrlKey && e.shiftKey && !e.altKey && !e.metaKey && (e.key === "T" || e.key === "t")) {
      e.preventDefault();
      cycleTheme();
    }
  });

  // Consent

  function readConsent() {
    var raw = storeGet(CONSENT_KEY);
    if (raw === null) return null;
    try {
      var parsed = JSON.parse(raw);
      if (!parsed || typeof parsed !== "object") return null;
      for (var i = 0; i < OPTIONAL.length; i++) {
        if (typeof parsed[OPTIONAL[i]] !== "boolean") return null;
      }
      return parsed;
    } catch (_) {
      return null;
    }
  }

  function allowed(record, category) {
    if (category === "essential") return true;
    return !!record && record[category] === true;
  }

  function activateScripts(record) {
    var inert = document.querySelectorAll('script[type="text/plain"][data-consent-category]');
    for (var i = 0; i < inert.length; i++) {
      var node = inert[i];
      if (!allowed(record, node.getAttribute("data-consent-category"))) continue;
      var live = document.createElement("script");
      live.src = node.getAttribute("data-src");
      live.async = true;
      node.parentNode.replaceChild(live, node);
    }
  }

  function saveConsent(record) {
    var clean = {};
    for (var i = 0; i < OPTIONAL.length; i++) clean[OPTIONAL[i]] = !!record[OPTIONAL[i]];
    storeSet(CONSENT_KEY, JSON.stringify(clean));
    hide("consent-banner");
    hide("consent-preferences");
    activateScripts(clean);
  }

  function all(value) {
    var record = {};
    for (var i = 0; i < OPTIONAL.length; i++) record[OPTIONAL[i]] = value;
    return record;
  }

  function show(id) {
    var el = document.getElementById(id);
    if (el) el.hidden = false;
  }

  function hide(id) {
    var el = document.getElementById(id);
    if (el) el.hidden = true;
  }

  function openPreferences() {
    var record = readConsent() || all(false);
    for (var i = 0; i < OPTIONAL.length; i++) {
      var box = document.getElementById("consent-" + OPTIONAL[i]);
      if (box) box.checked = record[OPTIONAL[i]];
    }
    show("consent-preferences");
  }

  function workingRecord() {
    var record = {};
    for (var i = 0; i < OPTIONAL.length; i++) {
      var box = document.getElementById("consent-" + OPTIONAL[i]);
      record[OPTIONAL[i]] = !!(box && box.checked);
    }
    return record;
  }

  var actions = {
    "accept-all": function () { saveConsent(all(true)); },
    "dismiss": function () { saveConsent(all(false)); },
    "preferences": openPreferences,
    "save": function () { saveConsent(workingRecord()); },
    "close": function () { hide("consent-preferences"); }
  };

  // Sticky CTA

  var reappearTimer = null;

  function dismissSticky() {
    var bar = document.getElementById("sticky-cta");
    if (!bar) return;
    bar.hidden = true;
    if (reappearTimer !== null) clearTimeout(reappearTimer);
    var delay = parseInt(bar.getAttribute("data-reappear-ms"), 10) || 30000;
    reappearTimer = setTimeout(function () {
      reappearTimer = null;
      bar.hidden = false;
    }, delay);
  }

  function init() {
    var record = readConsent();
    if (record === null) {
      show("consent-banner");
    } else {
      hide("consent-banner");
      activateScripts(record);
    }

    document.addEventListener("click", function (e) {
      var target = e.target.closest("[data-consent-action],[data-sticky-action]");
      if (!target) return;
      var action = target.getAttribute("data-consent-action");
      if (action && actions[action]) {
        actions[action]();
      } else if (target.getAttribute("data-sticky-action") === "dismiss") {
        dismissSticky();
      }
    });

    var picker = document.getElementById("theme-picker");
    if (picker) {
      picker.value = current;
      picker.addEventListener("change", function () { setTheme(picker.value); });
    }
  }

  if (document.readyState === "loading") {
    document.addEventListener("DOMContentLoaded", init);
  } else {
    init();
  }
})();"#;

/// Client runtime implementing the store contracts in the browser.
pub fn prefs_runtime_js() -> String {
    let themes: Vec<&str> = ThemeName::ALL.iter().map(|t| t.as_str()).collect();
    let optional: Vec<&str> = ConsentCategory::ALL
        .iter()
        .filter(|c| !c.is_required())
        .map(|c| c.as_str())
        .collect();

    PREFS_RUNTIME_TEMPLATE
        .replace("__THEME_KEY__", &js_literal(&THEME_STORAGE_KEY))
        .replace("__CONSENT_KEY__", &js_literal(&CONSENT_STORAGE_KEY))
        .replace("__THEME_ATTR__", &js_literal(&THEME_ATTRIBUTE))
        .replace("__THEMES__", &js_literal(&themes))
        .replace("__OPTIONAL__", &js_literal(&optional))
}

fn js_literal<T: serde::Serialize + ?Sized>(value: &T) -> String {
    // Serializing a &str or Vec<&str> cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}
