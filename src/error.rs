use thiserror::Error;

use crate::models::RowError;

#[derive(Error, Debug)]
pub enum FuelbookError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FuelbookError>;

/// Why an import was refused. Any variant means nothing was persisted.
#[derive(Error, Debug)]
pub enum ImportFailure {
    /// The file could not be tokenized as CSV, or its shape does not fit the vendor layout.
    #[error("{0}")]
    Parse(String),

    /// The importing user's fleet or profile could not be loaded.
    #[error("{0}")]
    Lookup(FuelbookError),

    /// One or more rows failed validation; ordered by row number.
    #[error("{} invalid row entries", .0.len())]
    Rows(Vec<RowError>),

    /// Beginning, inserting into, or committing the transaction failed.
    #[error("{0}")]
    Persistence(WriteError),
}

/// A failure inside the transactional write, by the step that failed.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("{0}")]
    Begin(FuelbookError),

    #[error("{0}")]
    Fillups(FuelbookError),

    #[error("{0}")]
    Expenses(FuelbookError),

    /// Whether the data reached storage is unknown.
    #[error("Commit failed, the import may not have been saved: {0}")]
    Commit(FuelbookError),
}

impl ImportFailure {
    /// Error strings in the order they should be shown to the user.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Rows(errors) => errors.iter().map(|e| e.to_string()).collect(),
            other => vec![other.to_string()],
        }
    }
}
