use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Discord(#[from] serenity::Error),

    /// An id string that is not a non-zero Discord snowflake.
    #[error("invalid discord {kind} id: {value:?}")]
    InvalidId { kind: &'static str, value: String },
}

impl Error {
    #[must_use]
    pub fn invalid_id(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidId {
            kind,
            value: value.into(),
        }
    }
}

impl From<Error> for cartlist_checklist::Error {
    fn from(err: Error) -> Self {
        Self::surface("discord", err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
