//! Consuming views over the preference stores. Each view keeps only its own
//! presentation state and renders a `maud` fragment for the page shell.

pub mod banner;
pub mod preferences;
pub mod sms;
pub mod sticky_cta;
pub mod theme_picker;

pub use banner::ConsentBanner;
pub use preferences::PreferencesModal;
pub use sticky_cta::StickyCta;
