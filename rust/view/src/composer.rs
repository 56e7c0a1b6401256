use crate::errors::ViewError;
use crate::markup::{Mention, RichText};
use pokerbot_engine::cards::Card;
use pokerbot_engine::game::Game;
use pokerbot_engine::player::{Money, Player};

/// Shown instead of the board before the flop.
pub const EMPTY_TABLE_PLACEHOLDER: &str = "no cards";

/// Assembles the human-readable status messages of a game.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    currency_marker: String,
}

impl Default for MessageComposer {
    fn default() -> Self {
        Self::new("$")
    }
}

impl MessageComposer {
    pub fn new(currency_marker: impl Into<String>) -> Self {
        Self {
            currency_marker: currency_marker.into(),
        }
    }

    pub fn format_amount(&self, amount: Money) -> String {
        format!("{amount}{}", self.currency_marker)
    }

    /// Turn prompt: greeting, board, the player's money and the round's
    /// highest stake, one per line.
    pub fn compose_turn_prompt(
        &self,
        game: &Game,
        player: &Player,
        money: Money,
    ) -> Result<RichText, ViewError> {
        let mention = Mention::parse(player.mention_handle())?;
        Ok(RichText::new()
            .mention(mention)
            .plain(", it is your turn")
            .line_break()
            .plain("Cards on the table: ")
            .line_break()
            .plain(format_table_cards(game.table_cards()))
            .line_break()
            .plain("Your money: ")
            .bold(self.format_amount(money))
            .line_break()
            .plain("Max round rate: ")
            .bold(self.format_amount(game.max_round_rate())))
    }

    pub fn compose_cards_reveal_notice(&self, mention_handle: &str) -> Result<RichText, ViewError> {
        let mention = Mention::parse(mention_handle)?;
        Ok(RichText::new().plain("Showing cards to ").mention(mention))
    }
}

/// Space-joined cards in table order, or the placeholder for an empty board.
pub fn format_table_cards(cards: &[Card]) -> String {
    if cards.is_empty() {
        return EMPTY_TABLE_PLACEHOLDER.to_string();
    }
    cards
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
