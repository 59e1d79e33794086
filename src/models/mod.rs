use serde::{Deserialize, Serialize};
use teloxide::types::{Update, UpdateKind};

/// Step of the order flow a chat is in. Absence of a stored step means idle.
/// The order text waiting for a phone is stored separately, see `StateStore`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingOrderDetails,
    AwaitingPhone,
}

/// The parts of a Telegram message the dispatcher looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub text: Option<String>,
    pub first_name: String,
    pub username: Option<String>,
}

impl IncomingMessage {
    /// Extracts the message of an update; other update kinds carry nothing for us.
    /// The sender is taken from `from`, and from the chat only when `from` is missing.
    pub fn from_update(update: &Update) -> Option<Self> {
        let UpdateKind::Message(msg) = &update.kind else {
            return None;
        };
        let (first_name, username) = match &msg.from {
            Some(user) => (user.first_name.clone(), user.username.clone()),
            None => (
                msg.chat.first_name().unwrap_or_default().to_string(),
                msg.chat.username().map(str::to_string),
            ),
        };
        Some(Self {
            chat_id: msg.chat.id.0,
            text: msg.text().map(str::to_string),
            first_name,
            username,
        })
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// A completed order, forwarded once to the administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTicket {
    pub order: String,
    pub phone: String,
    pub first_name: String,
    pub username: Option<String>,
}

impl OrderTicket {
    pub fn new(order: String, phone: String, from: &IncomingMessage) -> Self {
        Self {
            order,
            phone,
            first_name: from.first_name.clone(),
            username: from.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization_is_tagged() {
        let json = serde_json::to_string(&ConversationState::AwaitingOrderDetails).unwrap();
        assert_eq!(json, r#"{"step":"awaiting_order_details"}"#);

        let back: ConversationState = serde_json::from_str(r#"{"step":"awaiting_phone"}"#).unwrap();
        assert_eq!(back, ConversationState::AwaitingPhone);
    }

    #[test]
    fn test_message_from_update() {
        let update: Update = serde_json::from_str(&serde_json::json!({
            "update_id": 7,
            "message": {
                "message_id": 1,
                "date": 1700000000,
                "chat": {"id": 42, "type": "private", "first_name": "Ann", "username": "ann_k"},
                "from": {"id": 42, "is_bot": false, "first_name": "Ann", "username": "ann_k"},
                "text": "🛒 Сделать заказ"
            }
        })
        .to_string())
        .unwrap();

        let msg = IncomingMessage::from_update(&update).unwrap();
        assert_eq!(msg.chat_id, 42);
        assert_eq!(msg.text(), "🛒 Сделать заказ");
        assert_eq!(msg.first_name, "Ann");
        assert_eq!(msg.username.as_deref(), Some("ann_k"));
    }

    #[test]
    fn test_group_message_takes_sender_from_user() {
        let update: Update = serde_json::from_str(&serde_json::json!({
            "update_id": 8,
            "message": {
                "message_id": 2,
                "date": 1700000000,
                "chat": {"id": -100500, "type": "group", "title": "YKK buyers"},
                "from": {"id": 42, "is_bot": false, "first_name": "Ann", "username": "ann_k"},
                "text": "📘 Каталог"
            }
        })
        .to_string())
        .unwrap();

        let msg = IncomingMessage::from_update(&update).unwrap();
        assert_eq!(msg.chat_id, -100500);
        assert_eq!(msg.first_name, "Ann");
        assert_eq!(msg.username.as_deref(), Some("ann_k"));
    }
}
