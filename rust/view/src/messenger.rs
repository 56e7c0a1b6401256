//! The chat-transport boundary.
//!
//! A [`Messenger`] accepts fully built payloads and answers with a
//! [`DeliveryHandle`] right away; the transport work happens elsewhere and
//! its outcome arrives through the handle.

use crate::markup::RichText;
use crate::menu::MenuLayout;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;

/// Transport address of a chat. Opaque to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Transport address of a message within a chat. Opaque to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i32);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// A new message was posted
    Sent(MessageId),
    /// An existing message was edited
    Edited(MessageId),
    /// The request asked for a state the message was already in
    Unchanged,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The transport refused an edit that would not change the message
    #[error("message is not modified")]
    NotModified,
    #[error("transport API error {code}: {description}")]
    Api { code: u16, description: String },
    #[error("transport unreachable: {0}")]
    Transport(String),
    /// The messenger went away without reporting an outcome
    #[error("delivery abandoned before completion")]
    Abandoned,
}

pub type DeliveryResult = Result<Delivery, DeliveryError>;

enum HandleState {
    Ready(DeliveryResult),
    Pending(oneshot::Receiver<DeliveryResult>),
}

/// Promise-like result of a messenger call.
pub struct DeliveryHandle {
    state: HandleState,
    unchanged_is_success: bool,
}

impl DeliveryHandle {
    pub fn ready(result: DeliveryResult) -> Self {
        Self {
            state: HandleState::Ready(result),
            unchanged_is_success: false,
        }
    }

    pub fn failed(error: DeliveryError) -> Self {
        Self::ready(Err(error))
    }

    /// A handle whose outcome is reported later through the returned reporter.
    pub fn pending() -> (DeliveryReporter, Self) {
        let (tx, rx) = oneshot::channel();
        (
            DeliveryReporter { tx },
            Self {
                state: HandleState::Pending(rx),
                unchanged_is_success: false,
            },
        )
    }

    /// Treats [`DeliveryError::NotModified`] as [`Delivery::Unchanged`].
    pub fn tolerate_unchanged(mut self) -> Self {
        self.unchanged_is_success = true;
        self
    }

    /// Waits for the transport to finish.
    pub async fn outcome(self) -> DeliveryResult {
        let result = match self.state {
            HandleState::Ready(result) => result,
            HandleState::Pending(rx) => rx.await.unwrap_or(Err(DeliveryError::Abandoned)),
        };
        match result {
            Err(DeliveryError::NotModified) if self.unchanged_is_success => {
                Ok(Delivery::Unchanged)
            }
            other => other,
        }
    }
}

impl fmt::Debug for DeliveryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            HandleState::Ready(result) => format!("Ready({result:?})"),
            HandleState::Pending(_) => "Pending".to_string(),
        };
        f.debug_struct("DeliveryHandle")
            .field("state", &state)
            .field("unchanged_is_success", &self.unchanged_is_success)
            .finish()
    }
}

/// Sending half of a pending [`DeliveryHandle`].
#[derive(Debug)]
pub struct DeliveryReporter {
    tx: oneshot::Sender<DeliveryResult>,
}

impl DeliveryReporter {
    pub fn report(self, result: DeliveryResult) {
        // the caller may have dropped its handle; nobody is left to tell
        let _ = self.tx.send(result);
    }
}

/// A text message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingText {
    pub chat_id: ChatId,
    pub text: RichText,
    pub menu: Option<MenuLayout>,
    pub reply_to: Option<MessageId>,
}

/// A photo message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingPhoto {
    pub chat_id: ChatId,
    /// PNG bytes
    pub image: Vec<u8>,
    pub caption: RichText,
}

/// Delivers view payloads to a chat transport.
///
/// Implementations must send text and menus exactly as given and report
/// failures through the handle. They never retry on the view's behalf.
pub trait Messenger: Send + Sync {
    fn send_text(&self, message: OutgoingText) -> DeliveryHandle;
    fn send_photo(&self, photo: OutgoingPhoto) -> DeliveryHandle;
    fn clear_markup(&self, chat_id: ChatId, message_id: MessageId) -> DeliveryHandle;
}

/// Everything an [`InMemoryMessenger`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Text(MessageId, OutgoingText),
    Photo(MessageId, OutgoingPhoto),
    ClearMarkup(ChatId, MessageId),
}

#[derive(Debug, Default)]
struct InMemoryState {
    next_id: i32,
    log: Vec<Recorded>,
    with_markup: HashMap<(ChatId, MessageId), bool>,
    failures: VecDeque<DeliveryError>,
}

impl InMemoryState {
    fn next_message_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId(self.next_id)
    }
}

/// A messenger that keeps everything in memory.
///
/// Message ids are assigned sequentially from 1. Clearing the markup of a
/// message that has none fails with [`DeliveryError::NotModified`] and
/// clearing an unknown message fails with an API error, mirroring Telegram.
#[derive(Debug, Default)]
pub struct InMemoryMessenger {
    state: Mutex<InMemoryState>,
}

impl InMemoryMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next delivery fail with `error` (queued, first in first out).
    pub fn fail_next(&self, error: DeliveryError) {
        self.lock().failures.push_back(error);
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.lock().log.clone()
    }

    pub fn texts(&self) -> Vec<OutgoingText> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Text(_, text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn photos(&self) -> Vec<OutgoingPhoto> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Photo(_, photo) => Some(photo),
                _ => None,
            })
            .collect()
    }

    pub fn has_markup(&self, chat_id: ChatId, message_id: MessageId) -> bool {
        self.lock()
            .with_markup
            .get(&(chat_id, message_id))
            .copied()
            .unwrap_or(false)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryState> {
        // recording only; a panic elsewhere leaves the log consistent
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Messenger for InMemoryMessenger {
    fn send_text(&self, message: OutgoingText) -> DeliveryHandle {
        let mut state = self.lock();
        if let Some(error) = state.failures.pop_front() {
            return DeliveryHandle::failed(error);
        }
        let id = state.next_message_id();
        state
            .with_markup
            .insert((message.chat_id, id), message.menu.is_some());
        state.log.push(Recorded::Text(id, message));
        DeliveryHandle::ready(Ok(Delivery::Sent(id)))
    }

    fn send_photo(&self, photo: OutgoingPhoto) -> DeliveryHandle {
        let mut state = self.lock();
        if let Some(error) = state.failures.pop_front() {
            return DeliveryHandle::failed(error);
        }
        let id = state.next_message_id();
        state.with_markup.insert((photo.chat_id, id), false);
        state.log.push(Recorded::Photo(id, photo));
        DeliveryHandle::ready(Ok(Delivery::Sent(id)))
    }

    fn clear_markup(&self, chat_id: ChatId, message_id: MessageId) -> DeliveryHandle {
        let mut state = self.lock();
        if let Some(error) = state.failures.pop_front() {
            return DeliveryHandle::failed(error);
        }
        state.log.push(Recorded::ClearMarkup(chat_id, message_id));
        match state.with_markup.get_mut(&(chat_id, message_id)) {
            Some(has_markup) if *has_markup => {
                *has_markup = false;
                DeliveryHandle::ready(Ok(Delivery::Edited(message_id)))
            }
            Some(_) => DeliveryHandle::failed(DeliveryError::NotModified),
            None => DeliveryHandle::failed(DeliveryError::Api {
                code: 400,
                description: "Bad Request: message to edit not found".to_string(),
            }),
        }
    }
}
