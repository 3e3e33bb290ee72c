//! Classification of failures that escape request handling.
//!
//! A [`Failure`] carries its [`FailureKind`] explicitly. [`resolve`] logs the full
//! cause once and maps the kind to a status; the client only ever sees the
//! canonical reason phrase.

use std::fmt;

use tracing::error;

use crate::{HttpOutcome, SayanError, http_response};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A record looked up by key does not exist.
    NotFound,
    /// A record violated a schema or constraint when persisted.
    Invalid,
    Unclassified,
}

impl FailureKind {
    pub fn status(self) -> u16 {
        match self {
            FailureKind::NotFound => 404,
            FailureKind::Invalid => 400,
            FailureKind::Unclassified => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NotFound => "not_found",
            FailureKind::Invalid => "invalid",
            FailureKind::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error tagged with the kind used to pick its HTTP status.
#[derive(Debug)]
pub struct Failure {
    kind: FailureKind,
    cause: anyhow::Error,
}

impl Failure {
    pub fn new(kind: FailureKind, cause: impl Into<anyhow::Error>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }

    pub fn not_found(cause: impl Into<anyhow::Error>) -> Self {
        Self::new(FailureKind::NotFound, cause)
    }

    pub fn invalid(cause: impl Into<anyhow::Error>) -> Self {
        Self::new(FailureKind::Invalid, cause)
    }

    pub fn unclassified(cause: impl Into<anyhow::Error>) -> Self {
        Self::new(FailureKind::Unclassified, cause)
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.kind, self.cause)
    }
}

impl From<sqlx::Error> for Failure {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::RowNotFound => FailureKind::NotFound,
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => FailureKind::Invalid,
                _ => FailureKind::Unclassified,
            },
            _ => FailureKind::Unclassified,
        };
        Self::new(kind, err)
    }
}

impl From<SayanError> for Failure {
    fn from(err: SayanError) -> Self {
        match err {
            SayanError::Database(db) => Self::from(db),
            other => Self::unclassified(other),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::unclassified(err)
    }
}

/// Map an escaped failure to its response, logging the full detail exactly once.
pub fn resolve(failure: &Failure) -> HttpOutcome {
    error!(
        kind = %failure.kind,
        error = ?failure.cause,
        "unhandled failure: {:#}",
        failure.cause
    );
    http_response(failure.kind.status())
}
