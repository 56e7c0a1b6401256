use crate::cards::Card;
use crate::errors::SnapshotError;
use crate::player::Money;
use serde::{Deserialize, Serialize};

/// Represents a betting street in Texas Hold'em poker.
/// Derived from how many community cards are on the table.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    /// No community cards yet
    Preflop,
    /// 3 community cards
    Flop,
    /// 4th community card
    Turn,
    /// 5th community card
    River,
}

/// Shared table state at the moment a player has to decide.
///
/// A `Game` is an immutable snapshot handed out by the engine. The table
/// card count is checked on construction, so every `Game` a consumer sees
/// holds 0, 3, 4 or 5 community cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    /// Community cards in the order they were dealt
    table_cards: Vec<Card>,
    /// Highest amount any player has committed in the current betting round
    max_round_rate: Money,
}

impl Game {
    pub fn new(table_cards: Vec<Card>, max_round_rate: Money) -> Result<Self, SnapshotError> {
        Self::street_for(table_cards.len())?;
        Ok(Self {
            table_cards,
            max_round_rate,
        })
    }

    pub fn table_cards(&self) -> &[Card] {
        &self.table_cards
    }

    pub fn max_round_rate(&self) -> Money {
        self.max_round_rate
    }

    pub fn street(&self) -> Street {
        // count validated in `new`
        Self::street_for(self.table_cards.len()).unwrap_or(Street::Preflop)
    }

    fn street_for(count: usize) -> Result<Street, SnapshotError> {
        match count {
            0 => Ok(Street::Preflop),
            3 => Ok(Street::Flop),
            4 => Ok(Street::Turn),
            5 => Ok(Street::River),
            count => Err(SnapshotError::InvalidTableCardCount { count }),
        }
    }
}
