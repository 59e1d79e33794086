use teloxide::types::Update;

use crate::{
    commands::Command,
    errors::BotError,
    handlers::{menu, Action, OrderBot},
    models::{ConversationState, IncomingMessage, OrderTicket},
    services::notifier::OutgoingMessage,
};

impl OrderBot {
    pub async fn handle_update(&self, update: &Update) -> Result<Action, BotError> {
        match IncomingMessage::from_update(update) {
            Some(msg) => self.handle_message(&msg).await,
            None => {
                log::debug!("Skipping update {} without a message", update.id.0);
                Ok(Action::Ignored)
            }
        }
    }

    /// Routes one message. `/start` always wins; otherwise a pending order step
    /// takes precedence over the menu buttons.
    pub async fn handle_message(&self, msg: &IncomingMessage) -> Result<Action, BotError> {
        let chat_id = msg.chat_id;
        let text = msg.text();
        let command = Command::from_text(text, &self.bot_username);

        if command == Some(Command::Start) {
            return self.handle_start(msg).await;
        }

        let wants_catalog = command == Some(Command::Catalog) || text == menu::CATALOG_BUTTON;
        let wants_order = command == Some(Command::Order) || text == menu::ORDER_BUTTON;

        let state = match self.store.get_step(chat_id).await {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                log::error!("❌ Could not read state of chat {}: {}", chat_id, e);
                // without the step this text may be an order detail or a phone
                if !(wants_catalog || wants_order) {
                    return self.report_store_failure(chat_id).await;
                }
                ConversationState::Idle
            }
        };

        match state {
            ConversationState::AwaitingOrderDetails => self.handle_order_details(msg).await,
            ConversationState::AwaitingPhone => self.handle_phone(msg).await,
            ConversationState::Idle if wants_catalog => self.handle_catalog(chat_id).await,
            ConversationState::Idle if wants_order => self.handle_make_order(chat_id).await,
            ConversationState::Idle => {
                self.messenger
                    .send(chat_id, OutgoingMessage::plain(menu::USE_MENU).with_menu())
                    .await?;
                Ok(Action::MenuHint)
            }
        }
    }

    async fn handle_order_details(&self, msg: &IncomingMessage) -> Result<Action, BotError> {
        let chat_id = msg.chat_id;
        let order = msg.text().trim();

        if order.is_empty() {
            self.messenger
                .send(chat_id, OutgoingMessage::plain(menu::ORDER_EMPTY))
                .await?;
            return Ok(Action::OrderDetailsRejected);
        }

        let saved = match self.store.set_order(chat_id, order, self.order_ttl).await {
            Ok(()) => {
                self.store
                    .set_step(chat_id, &ConversationState::AwaitingPhone, self.step_ttl)
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = saved {
            log::error!("❌ Could not save order details of {}: {}", chat_id, e);
            return self.report_store_failure(chat_id).await;
        }

        log::info!("🧾 Order details received from {}", chat_id);
        self.messenger
            .send(chat_id, OutgoingMessage::plain(menu::PHONE_PROMPT))
            .await?;
        Ok(Action::PhoneRequested)
    }

    async fn handle_phone(&self, msg: &IncomingMessage) -> Result<Action, BotError> {
        let chat_id = msg.chat_id;
        let phone = msg.text().trim();

        if !menu::is_valid_phone(phone) {
            self.messenger
                .send(chat_id, OutgoingMessage::plain(menu::PHONE_INVALID))
                .await?;
            return Ok(Action::PhoneRejected);
        }

        let taken = self.store.take_order(chat_id).await;
        // the chat is idle after this step whatever happened to the order
        if let Err(e) = self.store.clear(chat_id).await {
            log::warn!("⚠️ Could not reset state of chat {}: {}", chat_id, e);
        }

        let order = match taken {
            Ok(Some(order)) => order,
            Ok(None) => {
                // expired, or consumed by a concurrent delivery for the same chat
                log::warn!("⏰ Pending order of {} is gone", chat_id);
                self.messenger
                    .send(chat_id, OutgoingMessage::plain(menu::ORDER_LOST).with_menu())
                    .await?;
                return Ok(Action::OrderLost);
            }
            Err(e) => {
                log::error!("❌ Could not load pending order of {}: {}", chat_id, e);
                return self.report_store_failure(chat_id).await;
            }
        };

        let ticket = OrderTicket::new(order, phone.to_string(), msg);

        self.messenger
            .send(chat_id, OutgoingMessage::plain(menu::ORDER_CONFIRMED).with_menu())
            .await?;
        log::info!("✅ Order from {} confirmed", chat_id);

        self.notify_admin(&ticket).await;
        Ok(Action::OrderCompleted)
    }

    /// Forwards the order to the administrator. Failures are logged, never returned.
    async fn notify_admin(&self, ticket: &OrderTicket) {
        let message = OutgoingMessage::markdown(menu::admin_notification(ticket));
        match self.messenger.send(self.admin_chat_id, message).await {
            Ok(()) => log::info!("📦 Order forwarded to admin {}", self.admin_chat_id),
            Err(e) => log::error!("❌ Failed to notify admin {}: {}", self.admin_chat_id, e),
        }
    }
}
