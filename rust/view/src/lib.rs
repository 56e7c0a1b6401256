//! Chat presentation for a poker bot.
//!
//! [`PokerBotView`] turns read-only game snapshots from `pokerbot_engine`
//! into outgoing chat messages: turn prompts with action controls, table
//! images, private card keyboards and control removal. Delivery goes
//! through a [`Messenger`]; [`TelegramMessenger`] talks to the Telegram
//! Bot API and [`InMemoryMessenger`] records everything for tests.

pub mod actions;
pub mod composer;
pub mod errors;
pub mod logging;
pub mod markup;
pub mod menu;
pub mod messenger;
pub mod renderer;
pub mod resolver;
pub mod settings;
pub mod telegram;
pub mod view;

pub use actions::{CallbackData, PlayerAction, RaiseSchedule, RaiseTier};
pub use composer::{format_table_cards, MessageComposer, EMPTY_TABLE_PLACEHOLDER};
pub use errors::{ErrorSeverity, ViewError};
pub use logging::{
    capture_logs, init_logging, init_test_logging, LogEntry, LogFormat, TestLogSubscriber,
    TestLoggingUnavailable,
};
pub use markup::{escape_markdown_v2, Mention, RichText, Segment};
pub use menu::{Control, KeyboardHints, MenuBuilder, MenuLayout, MenuStyle};
pub use messenger::{
    ChatId, Delivery, DeliveryError, DeliveryHandle, DeliveryResult, InMemoryMessenger, MessageId,
    Messenger, OutgoingPhoto, OutgoingText, Recorded,
};
pub use renderer::{RenderError, TableRenderer};
pub use resolver::resolve_contextual_action;
pub use settings::{SettingsError, TelegramConfig, ViewSettings};
pub use telegram::{TelegramError, TelegramMessenger};
pub use view::PokerBotView;
