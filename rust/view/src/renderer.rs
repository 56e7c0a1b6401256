use pokerbot_engine::cards::Card;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Draws the card table as a PNG.
///
/// Implementations must be deterministic for a given card sequence and
/// free of side effects; the view may call them from any thread.
pub trait TableRenderer: Send + Sync {
    fn render_table(&self, cards: &[Card]) -> Result<Vec<u8>, RenderError>;
}

impl<F> TableRenderer for F
where
    F: Fn(&[Card]) -> Result<Vec<u8>, RenderError> + Send + Sync,
{
    fn render_table(&self, cards: &[Card]) -> Result<Vec<u8>, RenderError> {
        self(cards)
    }
}
