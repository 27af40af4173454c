use thiserror::Error;

use crate::vcs::Side;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to parse {path} as {format}")]
    Content {
        path: String,
        format: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Could not find file {0}")]
    NotFound(String),

    #[error("{path} has no content on the {side} side of the change")]
    MissingRevision { path: String, side: Side },

    #[error("{kind} lines do not have a line number on the {side} side of the change")]
    NoLineNumber { kind: &'static str, side: Side },

    #[error("Version control error: {0}")]
    Vcs(String),

    #[error("Version control state unavailable: {0}")]
    EnvironmentUnavailable(String),

    #[error("{0} is not implemented")]
    Unsupported(&'static str),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Failures while turning a message template into a comment body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Rule has no message with id `{0}`")]
    UnknownMessage(String),

    #[error("Malformed message at offset {offset}: {reason}")]
    Parse { offset: usize, reason: String },

    #[error("Unsupported argument type `{kind}` for `{name}`")]
    UnsupportedArgument { name: String, kind: String },

    #[error("No value provided for placeholder `{0}`")]
    MissingValue(String),

    #[error("Markup tag <{0}> is not allowed in messages")]
    DisallowedTag(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn content(
        path: &str,
        format: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Content {
            path: path.to_string(),
            format,
            source: Box::new(source),
        }
    }
}
