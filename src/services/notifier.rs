#[cfg(any(test, feature = "test-util"))]
use std::collections::HashSet;
#[cfg(any(test, feature = "test-util"))]
use std::sync::Mutex;

use async_trait::async_trait;
use teloxide::{prelude::*, types::ParseMode};

use crate::errors::BotError;
use crate::handlers::menu;

/// A single outbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub markdown: bool,
    pub with_menu: bool,
}

impl OutgoingMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
            with_menu: false,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            markdown: true,
            ..Self::plain(text)
        }
    }

    /// Attaches the two-button main menu keyboard.
    pub fn with_menu(mut self) -> Self {
        self.with_menu = true;
        self
    }
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), BotError>;
}

#[async_trait]
impl Messenger for Bot {
    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), BotError> {
        let mut request = self.send_message(ChatId(chat_id), message.text);
        if message.markdown {
            request = request.parse_mode(legacy_markdown());
        }
        if message.with_menu {
            request = request.reply_markup(menu::main_menu());
        }
        request.await?;
        Ok(())
    }
}

// The shop texts are written for legacy Markdown, not MarkdownV2.
#[allow(deprecated)]
fn legacy_markdown() -> ParseMode {
    ParseMode::Markdown
}

/// Keeps every message instead of sending it. Used by the test suites.
#[cfg(any(test, feature = "test-util"))]
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(i64, OutgoingMessage)>>,
    failing_chats: Mutex<HashSet<i64>>,
}

#[cfg(any(test, feature = "test-util"))]
impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later send to `chat_id` fails with a delivery error.
    pub fn fail_for(&self, chat_id: i64) {
        if let Ok(mut failing) = self.failing_chats.lock() {
            failing.insert(chat_id);
        }
    }

    pub fn sent(&self) -> Vec<(i64, OutgoingMessage)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<OutgoingMessage> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| *to == chat_id)
            .map(|(_, message)| message)
            .collect()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), BotError> {
        let failing = self
            .failing_chats
            .lock()
            .map(|failing| failing.contains(&chat_id))
            .unwrap_or(false);
        if failing {
            return Err(BotError::Delivery {
                chat_id,
                reason: "chat not reachable".to_string(),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((chat_id, message));
        }
        Ok(())
    }
}
