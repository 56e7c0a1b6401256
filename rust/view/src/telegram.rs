//! [`Messenger`] over the Telegram Bot API.
//!
//! Each call turns its payload into a Bot API request and spawns it on the
//! tokio runtime captured at construction. The caller gets the
//! [`DeliveryHandle`] back immediately.

use crate::menu::{MenuLayout, MenuStyle};
use crate::messenger::{
    ChatId, Delivery, DeliveryError, DeliveryHandle, DeliveryResult, MessageId, Messenger,
    OutgoingPhoto, OutgoingText,
};
use crate::settings::{SettingsError, TelegramConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::Handle;

const PARSE_MODE: &str = "MarkdownV2";
const PHOTO_FILE_NAME: &str = "desk.png";
const NOT_MODIFIED_MARKER: &str = "message is not modified";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("invalid telegram configuration: {0}")]
    Config(#[from] SettingsError),
    #[error("no tokio runtime available to run telegram requests")]
    NoRuntime,
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct InlineButton<'a> {
    text: &'a str,
    callback_data: &'a str,
}

#[derive(Debug, Serialize)]
struct KeyboardButton<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ReplyMarkup<'a> {
    Inline {
        inline_keyboard: Vec<Vec<InlineButton<'a>>>,
    },
    Keyboard {
        keyboard: Vec<Vec<KeyboardButton<'a>>>,
        selective: bool,
        resize_keyboard: bool,
        one_time_keyboard: bool,
    },
}

impl<'a> From<&'a MenuLayout> for ReplyMarkup<'a> {
    fn from(menu: &'a MenuLayout) -> Self {
        match menu.style {
            MenuStyle::Inline => ReplyMarkup::Inline {
                inline_keyboard: menu
                    .rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|c| InlineButton {
                                text: &c.label,
                                callback_data: &c.callback_token,
                            })
                            .collect()
                    })
                    .collect(),
            },
            MenuStyle::Keyboard(hints) => ReplyMarkup::Keyboard {
                keyboard: menu
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|c| KeyboardButton { text: &c.label }).collect())
                    .collect(),
                selective: hints.selective,
                resize_keyboard: hints.resize,
                one_time_keyboard: hints.one_time,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ReplyParameters {
    message_id: MessageId,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: String,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_parameters: Option<ReplyParameters>,
}

#[derive(Debug, Serialize)]
struct EditMessageReplyMarkup {
    chat_id: ChatId,
    message_id: MessageId,
}

/// Bot API `sendMessage` body for `message`.
pub fn send_message_body(message: &OutgoingText) -> Result<serde_json::Value, DeliveryError> {
    request_body(SendMessage {
        chat_id: message.chat_id,
        text: message.text.to_markdown_v2(),
        parse_mode: PARSE_MODE,
        reply_markup: message.menu.as_ref().map(ReplyMarkup::from),
        reply_parameters: message
            .reply_to
            .map(|message_id| ReplyParameters { message_id }),
    })
}

/// Bot API `editMessageReplyMarkup` body that strips a message's markup.
pub fn clear_markup_body(
    chat_id: ChatId,
    message_id: MessageId,
) -> Result<serde_json::Value, DeliveryError> {
    request_body(EditMessageReplyMarkup {
        chat_id,
        message_id,
    })
}

fn request_body(body: impl Serialize) -> Result<serde_json::Value, DeliveryError> {
    serde_json::to_value(body)
        .map_err(|e| DeliveryError::Transport(format!("unencodable request body: {e}")))
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

#[derive(Debug, Clone, Copy)]
enum RequestKind {
    Send,
    Edit(MessageId),
}

fn interpret(kind: RequestKind, status: u16, response: ApiResponse) -> DeliveryResult {
    if !response.ok {
        let description = response.description.unwrap_or_default();
        if description.contains(NOT_MODIFIED_MARKER) {
            return Err(DeliveryError::NotModified);
        }
        return Err(DeliveryError::Api {
            code: response.error_code.unwrap_or(status),
            description,
        });
    }
    match kind {
        RequestKind::Edit(message_id) => Ok(Delivery::Edited(message_id)),
        RequestKind::Send => response
            .result
            .as_ref()
            .and_then(|r| r.get("message_id"))
            .and_then(serde_json::Value::as_i64)
            .and_then(|id| i32::try_from(id).ok())
            .map(|id| Delivery::Sent(MessageId(id)))
            .ok_or_else(|| DeliveryError::Api {
                code: status,
                description: "response carries no message_id".to_string(),
            }),
    }
}

async fn execute(kind: RequestKind, request: reqwest::RequestBuilder) -> DeliveryResult {
    let response = request
        .send()
        .await
        .map_err(|e| DeliveryError::Transport(e.without_url().to_string()))?;
    let status = response.status().as_u16();
    let body: ApiResponse = response.json().await.map_err(|e| {
        DeliveryError::Transport(format!(
            "unreadable response (status {status}): {}",
            e.without_url()
        ))
    })?;
    interpret(kind, status, body)
}

/// Delivers messages through the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramMessenger {
    client: reqwest::Client,
    config: TelegramConfig,
    runtime: Handle,
}

impl TelegramMessenger {
    /// Must be called from within a tokio runtime; requests run on it.
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        let runtime = Handle::try_current().map_err(|_| TelegramError::NoRuntime)?;
        Self::with_runtime(config, runtime)
    }

    pub fn with_runtime(config: TelegramConfig, runtime: Handle) -> Result<Self, TelegramError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    fn dispatch(
        &self,
        method: &'static str,
        chat_id: ChatId,
        kind: RequestKind,
        request: reqwest::RequestBuilder,
    ) -> DeliveryHandle {
        tracing::debug!(method, chat_id = %chat_id, "telegram request queued");
        let (reporter, handle) = DeliveryHandle::pending();
        self.runtime.spawn(async move {
            let result = execute(kind, request).await;
            match &result {
                Ok(delivery) => {
                    tracing::debug!(method, chat_id = %chat_id, ?delivery, "telegram request done")
                }
                Err(DeliveryError::NotModified) => {
                    tracing::debug!(method, chat_id = %chat_id, "telegram reported no change")
                }
                Err(error) => {
                    tracing::warn!(method, chat_id = %chat_id, error = %error, "telegram request failed")
                }
            }
            reporter.report(result);
        });
        handle
    }

    fn photo_form(photo: OutgoingPhoto) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let part = reqwest::multipart::Part::bytes(photo.image)
            .file_name(PHOTO_FILE_NAME)
            .mime_str("image/png")?;
        Ok(reqwest::multipart::Form::new()
            .text("chat_id", photo.chat_id.to_string())
            .text("caption", photo.caption.to_markdown_v2())
            .text("parse_mode", PARSE_MODE)
            .part("photo", part))
    }
}

impl Messenger for TelegramMessenger {
    fn send_text(&self, message: OutgoingText) -> DeliveryHandle {
        let body = match send_message_body(&message) {
            Ok(body) => body,
            Err(e) => return DeliveryHandle::failed(e),
        };
        let request = self
            .client
            .post(self.config.method_url("sendMessage"))
            .json(&body);
        self.dispatch("sendMessage", message.chat_id, RequestKind::Send, request)
    }

    fn send_photo(&self, photo: OutgoingPhoto) -> DeliveryHandle {
        let chat_id = photo.chat_id;
        let form = match Self::photo_form(photo) {
            Ok(form) => form,
            Err(e) => return DeliveryHandle::failed(DeliveryError::Transport(e.to_string())),
        };
        let request = self
            .client
            .post(self.config.method_url("sendPhoto"))
            .multipart(form);
        self.dispatch("sendPhoto", chat_id, RequestKind::Send, request)
    }

    fn clear_markup(&self, chat_id: ChatId, message_id: MessageId) -> DeliveryHandle {
        let body = match clear_markup_body(chat_id, message_id) {
            Ok(body) => body,
            Err(e) => return DeliveryHandle::failed(e),
        };
        let request = self
            .client
            .post(self.config.method_url("editMessageReplyMarkup"))
            .json(&body);
        self.dispatch(
            "editMessageReplyMarkup",
            chat_id,
            RequestKind::Edit(message_id),
            request,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::PlayerAction;
    use crate::markup::RichText;
    use crate::menu::MenuBuilder;
    use pokerbot_engine::cards::parse_cards;
    use serde_json::json;

    fn response(raw: serde_json::Value) -> ApiResponse {
        serde_json::from_value(raw).expect("response")
    }

    #[test]
    fn inline_menu_serializes_as_inline_keyboard() {
        let menu = MenuBuilder::default()
            .build_turn_menu(PlayerAction::Check)
            .expect("menu");
        let body = send_message_body(&OutgoingText {
            chat_id: ChatId(-100),
            text: RichText::from("Pot: 1.5k!"),
            menu: Some(menu),
            reply_to: None,
        })
        .expect("body");
        assert_eq!(body["chat_id"], -100);
        assert_eq!(body["text"], "Pot: 1\\.5k\\!");
        assert_eq!(body["parse_mode"], "MarkdownV2");
        assert_eq!(
            body["reply_markup"]["inline_keyboard"][0][2],
            json!({"text": "check", "callback_data": "check"})
        );
        assert_eq!(
            body["reply_markup"]["inline_keyboard"][1][1],
            json!({"text": "25$", "callback_data": "raise:25"})
        );
        assert!(body.get("reply_parameters").is_none());
    }

    #[test]
    fn keyboard_menu_carries_hints() {
        let cards = parse_cards("AS KD").expect("cards");
        let menu = MenuBuilder::default()
            .build_card_selection_menu(&cards)
            .expect("menu");
        let body = send_message_body(&OutgoingText {
            chat_id: ChatId(1),
            text: RichText::from("cards"),
            menu: Some(menu),
            reply_to: Some(MessageId(9)),
        })
        .expect("body");
        assert_eq!(
            body["reply_markup"],
            json!({
                "keyboard": [[{"text": "AS"}, {"text": "KD"}]],
                "selective": true,
                "resize_keyboard": true,
                "one_time_keyboard": true
            })
        );
        assert_eq!(body["reply_parameters"]["message_id"], 9);
    }

    #[test]
    fn clear_body_has_no_markup() {
        let body = clear_markup_body(ChatId(5), MessageId(6)).expect("body");
        assert_eq!(body, json!({"chat_id": 5, "message_id": 6}));
    }

    #[test]
    fn unencodable_body_is_a_transport_error() {
        // JSON objects need string keys
        let mut bad = std::collections::HashMap::new();
        bad.insert((1, 2), "x");
        match request_body(&bad) {
            Err(DeliveryError::Transport(reason)) => {
                assert!(reason.starts_with("unencodable request body"), "{reason}")
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn interprets_sent_messages() {
        let ok = response(json!({"ok": true, "result": {"message_id": 77, "chat": {"id": 1}}}));
        assert_eq!(
            interpret(RequestKind::Send, 200, ok),
            Ok(Delivery::Sent(MessageId(77)))
        );
        let missing = response(json!({"ok": true, "result": true}));
        assert!(matches!(
            interpret(RequestKind::Send, 200, missing),
            Err(DeliveryError::Api { code: 200, .. })
        ));
    }

    #[test]
    fn interprets_not_modified_edits() {
        let not_modified = response(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: message is not modified: specified new message content and reply markup are exactly the same"
        }));
        assert_eq!(
            interpret(RequestKind::Edit(MessageId(3)), 400, not_modified),
            Err(DeliveryError::NotModified)
        );
        let ok = response(json!({"ok": true, "result": true}));
        assert_eq!(
            interpret(RequestKind::Edit(MessageId(3)), 200, ok),
            Ok(Delivery::Edited(MessageId(3)))
        );
    }

    #[test]
    fn interprets_api_errors() {
        let limited = response(json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 5"
        }));
        assert_eq!(
            interpret(RequestKind::Send, 429, limited),
            Err(DeliveryError::Api {
                code: 429,
                description: "Too Many Requests: retry after 5".to_string()
            })
        );
        let bare = response(json!({"ok": false}));
        assert!(matches!(
            interpret(RequestKind::Send, 502, bare),
            Err(DeliveryError::Api { code: 502, .. })
        ));
    }

    #[test]
    fn construction_requires_a_runtime() {
        let result = TelegramMessenger::new(TelegramConfig::new("123:abc"));
        assert!(matches!(result, Err(TelegramError::NoRuntime)));
    }
}
