use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Invalid table card count: {count} (expected 0, 3, 4 or 5)")]
    InvalidTableCardCount { count: usize },
    #[error("Invalid card: {0:?}")]
    InvalidCard(String),
}
