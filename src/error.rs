/// Errors surfaced by the preference stores and the site context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefsError {
    #[error("unknown theme `{0}`")]
    UnknownTheme(String),
    #[error("{0} store accessed before the site context was mounted")]
    NotMounted(&'static str),
    #[error("{0} store is already borrowed")]
    Busy(&'static str),
}
