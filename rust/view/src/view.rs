use crate::composer::MessageComposer;
use crate::errors::ViewError;
use crate::markup::RichText;
use crate::menu::{MenuBuilder, MenuLayout};
use crate::messenger::{ChatId, DeliveryHandle, MessageId, Messenger, OutgoingPhoto, OutgoingText};
use crate::renderer::TableRenderer;
use crate::resolver::resolve_contextual_action;
use crate::settings::{SettingsError, ViewSettings};
use pokerbot_engine::cards::Card;
use pokerbot_engine::game::Game;
use pokerbot_engine::player::{Money, Player};
use std::sync::Arc;

/// Turns game snapshots into chat messages.
///
/// Holds no game state: every method builds its whole payload first and
/// only then hands it to the messenger, once. A call that fails while
/// building sends nothing.
#[derive(Clone)]
pub struct PokerBotView {
    messenger: Arc<dyn Messenger>,
    renderer: Arc<dyn TableRenderer>,
    composer: MessageComposer,
    menus: MenuBuilder,
}

impl std::fmt::Debug for PokerBotView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokerBotView")
            .field("composer", &self.composer)
            .field("menus", &self.menus)
            .finish_non_exhaustive()
    }
}

impl PokerBotView {
    pub fn new(messenger: Arc<dyn Messenger>, renderer: Arc<dyn TableRenderer>) -> Self {
        let defaults = ViewSettings::default();
        Self::build(messenger, renderer, &defaults)
    }

    pub fn with_settings(
        messenger: Arc<dyn Messenger>,
        renderer: Arc<dyn TableRenderer>,
        settings: &ViewSettings,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::build(messenger, renderer, settings))
    }

    fn build(
        messenger: Arc<dyn Messenger>,
        renderer: Arc<dyn TableRenderer>,
        settings: &ViewSettings,
    ) -> Self {
        Self {
            messenger,
            renderer,
            composer: MessageComposer::new(settings.currency_marker.clone()),
            menus: MenuBuilder::new(settings.raise, settings.currency_marker.clone()),
        }
    }

    pub fn composer(&self) -> &MessageComposer {
        &self.composer
    }

    pub fn menus(&self) -> &MenuBuilder {
        &self.menus
    }

    pub fn send_message(&self, chat_id: ChatId, text: RichText) -> DeliveryHandle {
        self.deliver_text(chat_id, text, None, None)
    }

    pub fn send_message_reply(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
        text: RichText,
    ) -> DeliveryHandle {
        self.deliver_text(chat_id, text, None, Some(reply_to))
    }

    /// Prompts `player` to act, with the fold/all-in/call-or-check row and
    /// the quick-raise row attached.
    pub fn send_turn_prompt(
        &self,
        chat_id: ChatId,
        game: &Game,
        player: &Player,
        money: Money,
    ) -> Result<DeliveryHandle, ViewError> {
        let (text, menu) = self
            .turn_prompt(game, player, money)
            .inspect_err(|e| e.log("send_turn_prompt"))?;
        tracing::debug!(
            chat_id = %chat_id,
            street = ?game.street(),
            max_round_rate = game.max_round_rate(),
            round_rate = player.round_rate(),
            contextual = %menu.rows[0][2].label,
            "sending turn prompt"
        );
        Ok(self.deliver_text(chat_id, text, Some(menu), None))
    }

    fn turn_prompt(
        &self,
        game: &Game,
        player: &Player,
        money: Money,
    ) -> Result<(RichText, MenuLayout), ViewError> {
        let text = self.composer.compose_turn_prompt(game, player, money)?;
        let action = resolve_contextual_action(game, player)?;
        let menu = self.menus.build_turn_menu(action)?;
        Ok((text, menu))
    }

    /// Posts a picture of `cards` with an arbitrary caption.
    pub fn send_table_image(
        &self,
        chat_id: ChatId,
        cards: &[Card],
        caption: RichText,
    ) -> Result<DeliveryHandle, ViewError> {
        let image = self
            .renderer
            .render_table(cards)
            .map_err(ViewError::from)
            .inspect_err(|e| e.log("send_table_image"))?;
        tracing::debug!(
            chat_id = %chat_id,
            cards = cards.len(),
            bytes = image.len(),
            "sending table image"
        );
        Ok(self.messenger.send_photo(OutgoingPhoto {
            chat_id,
            image,
            caption,
        }))
    }

    /// Posts a picture of `cards` captioned with who they are shown to.
    pub fn send_cards_reveal(
        &self,
        chat_id: ChatId,
        cards: &[Card],
        mention_handle: &str,
    ) -> Result<DeliveryHandle, ViewError> {
        let caption = self
            .composer
            .compose_cards_reveal_notice(mention_handle)
            .inspect_err(|e| e.log("send_cards_reveal"))?;
        self.send_table_image(chat_id, cards, caption)
    }

    /// Shows `cards` on a keyboard visible only to the mentioned player.
    pub fn reveal_cards_to_player(
        &self,
        chat_id: ChatId,
        cards: &[Card],
        mention_handle: &str,
    ) -> Result<DeliveryHandle, ViewError> {
        let (text, menu) = self
            .card_keyboard(cards, mention_handle)
            .inspect_err(|e| e.log("reveal_cards_to_player"))?;
        tracing::debug!(chat_id = %chat_id, cards = cards.len(), "revealing cards to player");
        Ok(self.deliver_text(chat_id, text, Some(menu), None))
    }

    fn card_keyboard(
        &self,
        cards: &[Card],
        mention_handle: &str,
    ) -> Result<(RichText, MenuLayout), ViewError> {
        let text = self.composer.compose_cards_reveal_notice(mention_handle)?;
        let menu = self.menus.build_card_selection_menu(cards)?;
        Ok((text, menu))
    }

    /// Removes the controls under a sent message. Clearing a message that
    /// has none left resolves as [`crate::messenger::Delivery::Unchanged`].
    pub fn clear_controls(&self, chat_id: ChatId, message_id: MessageId) -> DeliveryHandle {
        tracing::debug!(chat_id = %chat_id, message_id = %message_id, "clearing controls");
        self.messenger
            .clear_markup(chat_id, message_id)
            .tolerate_unchanged()
    }

    fn deliver_text(
        &self,
        chat_id: ChatId,
        text: RichText,
        menu: Option<MenuLayout>,
        reply_to: Option<MessageId>,
    ) -> DeliveryHandle {
        self.messenger.send_text(OutgoingText {
            chat_id,
            text,
            menu,
            reply_to,
        })
    }
}
