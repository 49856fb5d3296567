use thiserror::Error;

use crate::deck::Symbol;

/// Configuration errors detected while building a deck.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("symbol set is empty")]
    Empty,

    #[error("symbol {0} appears more than once")]
    DuplicateSymbol(Symbol),
}

/// Failures of the best-time / history storage. Never fatal to a game.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid timestamp in history: {0}")]
    Timestamp(String),
}
