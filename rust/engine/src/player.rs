use serde::{Deserialize, Serialize};

/// Chip amount. Unsigned, so it can never go negative.
pub type Money = u32;

/// One participant's state at a decision point.
///
/// `mention_handle` is the pre-formatted chat reference for the player
/// (for Telegram, something like `[Alice](tg://user?id=42)`). The engine
/// passes it through untouched; the view validates it before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Amount committed in the current betting round
    round_rate: Money,
    /// Chat reference used to address the player
    mention_handle: String,
}

impl Player {
    pub fn new(mention_handle: impl Into<String>, round_rate: Money) -> Self {
        Self {
            round_rate,
            mention_handle: mention_handle.into(),
        }
    }

    pub fn round_rate(&self) -> Money {
        self.round_rate
    }

    pub fn mention_handle(&self) -> &str {
        &self.mention_handle
    }
}
