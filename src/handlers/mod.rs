pub mod command_handler;
pub mod menu;
pub mod message_handler;

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;

use crate::config::STEP_TTL_FACTOR;
use crate::services::notifier::Messenger;
use crate::services::state_store::StateStore;

/// What the dispatcher did with one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Ignored,
    Greeted,
    CatalogSent,
    OrderStarted,
    OrderDetailsRejected,
    PhoneRequested,
    PhoneRejected,
    OrderCompleted,
    OrderLost,
    StoreUnavailable,
    MenuHint,
}

/// The shop bot service: owns the messenger and the conversation state store.
pub struct OrderBot {
    messenger: Arc<dyn Messenger>,
    store: Arc<dyn StateStore>,
    admin_chat_id: i64,
    bot_username: String,
    order_ttl: Duration,
    step_ttl: Duration,
    hour_of_day: fn() -> u32,
}

impl OrderBot {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        store: Arc<dyn StateStore>,
        admin_chat_id: i64,
        order_ttl: Duration,
    ) -> Self {
        Self {
            messenger,
            store,
            admin_chat_id,
            bot_username: String::new(),
            order_ttl,
            step_ttl: order_ttl.saturating_mul(STEP_TTL_FACTOR),
            hour_of_day: local_hour,
        }
    }

    /// Username used to accept `/start@<username>`.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = username.into();
        self
    }

    /// How long a chat remembers it is waiting for a phone. Outlives the order
    /// text so a late phone is answered with "order lost" rather than the menu hint.
    pub fn with_step_ttl(mut self, step_ttl: Duration) -> Self {
        self.step_ttl = step_ttl.max(self.order_ttl);
        self
    }

    /// Replaces the wall clock used for the greeting.
    pub fn with_hour_source(mut self, hour_of_day: fn() -> u32) -> Self {
        self.hour_of_day = hour_of_day;
        self
    }
}

fn local_hour() -> u32 {
    chrono::Local::now().hour()
}
