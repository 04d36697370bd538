use weft_core::GrammarDefError;

/// Authoring errors reported while building a grammar.
///
/// `path` locates the offending item in the definition, e.g.
/// `repository.paren.end[0]`.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error(transparent)]
    Definition(#[from] GrammarDefError),

    #[error("{path}: invalid pattern: {message}")]
    Regex { path: String, message: String },

    #[error("{path}: unknown include `#{name}`")]
    UnknownInclude { path: String, name: String },

    #[error("{path}: include cycle through `#{name}`")]
    IncludeCycle { path: String, name: String },

    #[error("{path}: unknown variable `{name}`")]
    UnknownVariable { path: String, name: String },

    #[error("{path}: context variable `{name}` is not declared")]
    UndeclaredContext { path: String, name: String },

    #[error("{path}: capture {index} is out of range, pattern has {groups} groups")]
    CaptureIndex {
        path: String,
        index: u32,
        groups: usize,
    },

    #[error("{path}: captures need a `match` pattern")]
    CapturesWithoutRegex { path: String },

    #[error("{path}: capture function `{name}` is not registered")]
    UnknownCaptureFunction { path: String, name: String },

    #[error("{path}: {role} must resolve to rules, found a region")]
    ExpectedRule { path: String, role: &'static str },

    #[error("{path}: `begin` must resolve to exactly one rule")]
    AmbiguousBegin { path: String },

    #[error("{path}: empty rule list")]
    EmptyRules { path: String },
}

pub type Result<T> = std::result::Result<T, GrammarError>;
