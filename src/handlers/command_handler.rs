use crate::{
    errors::BotError,
    handlers::{menu, Action, OrderBot},
    models::{ConversationState, IncomingMessage},
    services::notifier::OutgoingMessage,
};

impl OrderBot {
    /// `/start`: drops any unfinished order and greets with the main menu.
    pub async fn handle_start(&self, msg: &IncomingMessage) -> Result<Action, BotError> {
        let chat_id = msg.chat_id;
        log::info!("🎉 User starting bot: {}", chat_id);

        if let Err(e) = self.store.clear(chat_id).await {
            log::warn!("⚠️ Could not reset state of chat {}: {}", chat_id, e);
        }

        let text = menu::welcome_text((self.hour_of_day)(), &msg.first_name);
        self.messenger
            .send(chat_id, OutgoingMessage::markdown(text).with_menu())
            .await?;
        Ok(Action::Greeted)
    }

    pub async fn handle_catalog(&self, chat_id: i64) -> Result<Action, BotError> {
        log::info!("📘 Catalog requested by {}", chat_id);
        self.messenger
            .send(chat_id, OutgoingMessage::markdown(menu::CATALOG_TEXT).with_menu())
            .await?;
        Ok(Action::CatalogSent)
    }

    /// Opens a new order, replacing whatever order was pending for this chat.
    pub async fn handle_make_order(&self, chat_id: i64) -> Result<Action, BotError> {
        log::info!("🛒 Order started by {}", chat_id);

        let opened = match self.store.clear(chat_id).await {
            Ok(()) => {
                self.store
                    .set_step(chat_id, &ConversationState::AwaitingOrderDetails, self.order_ttl)
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = opened {
            log::error!("❌ Could not store order state for {}: {}", chat_id, e);
            return self.report_store_failure(chat_id).await;
        }

        self.messenger
            .send(chat_id, OutgoingMessage::plain(menu::ORDER_PROMPT))
            .await?;
        Ok(Action::OrderStarted)
    }

    pub(crate) async fn report_store_failure(&self, chat_id: i64) -> Result<Action, BotError> {
        self.messenger
            .send(chat_id, OutgoingMessage::plain(menu::SERVICE_ERROR).with_menu())
            .await?;
        Ok(Action::StoreUnavailable)
    }
}
