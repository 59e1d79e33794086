use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::errors::StoreError;
use crate::models::ConversationState;
use crate::services::state_store::StateStore;

const STEP_PREFIX: &str = "order_step:";
const ORDER_PREFIX: &str = "order_text:";

fn step_key(chat_id: i64) -> String {
    format!("{}{}", STEP_PREFIX, chat_id)
}

fn order_key(chat_id: i64) -> String {
    format!("{}{}", ORDER_PREFIX, chat_id)
}

// EX 0 is rejected by redis
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Redis-backed state: a JSON step and a plain order text per chat, each with
/// its own `EX` expiry. `GETDEL` makes taking the order atomic on the server side.
#[derive(Clone)]
pub struct RedisStateStore {
    conn: ConnectionManager,
}

impl RedisStateStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }
}

fn decode(data: Option<String>) -> Result<Option<ConversationState>, StoreError> {
    match data {
        Some(json_str) => Ok(Some(serde_json::from_str(&json_str)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn set_step(&self, chat_id: i64, step: &ConversationState, ttl: Duration) -> Result<(), StoreError> {
        let data = serde_json::to_string(step)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(step_key(chat_id), data, expiry_secs(ttl)).await?;
        Ok(())
    }

    async fn get_step(&self, chat_id: i64) -> Result<Option<ConversationState>, StoreError> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn.get(step_key(chat_id)).await?;
        decode(data)
    }

    async fn set_order(&self, chat_id: i64, order: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(order_key(chat_id), order, expiry_secs(ttl)).await?;
        Ok(())
    }

    async fn take_order(&self, chat_id: i64) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let order: Option<String> = conn.get_del(order_key(chat_id)).await?;
        Ok(order)
    }

    async fn clear(&self, chat_id: i64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(vec![step_key(chat_id), order_key(chat_id)]).await?;
        Ok(())
    }
}
