use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::errors::StoreError;
use crate::models::ConversationState;

/// Per-chat order flow storage.
///
/// The step marker and the pending order text are kept apart with their own
/// lifetimes, so a chat still knows it was waiting for a phone after the
/// order text itself has expired. `take_order` must be atomic per chat: two
/// concurrent callers for the same chat never both receive the order.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Stores the step of `chat_id`, replacing any previous one.
    async fn set_step(&self, chat_id: i64, step: &ConversationState, ttl: Duration) -> Result<(), StoreError>;

    async fn get_step(&self, chat_id: i64) -> Result<Option<ConversationState>, StoreError>;

    /// Stores the pending order text, replacing any previous one.
    async fn set_order(&self, chat_id: i64, order: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Returns and removes the pending order; `None` if absent or expired.
    async fn take_order(&self, chat_id: i64) -> Result<Option<String>, StoreError>;

    /// Drops both the step and the pending order. Absence is not an error.
    async fn clear(&self, chat_id: i64) -> Result<(), StoreError>;
}

struct Timed<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Timed<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Default)]
struct Slot {
    step: Option<Timed<ConversationState>>,
    order: Option<Timed<String>>,
}

impl Slot {
    /// Drops expired parts and returns how many were dropped.
    fn prune(&mut self, now: Instant) -> usize {
        let mut dropped = 0;
        if self.step.as_ref().is_some_and(|s| !s.is_live(now)) {
            self.step = None;
            dropped += 1;
        }
        if self.order.as_ref().is_some_and(|o| !o.is_live(now)) {
            self.order = None;
            dropped += 1;
        }
        dropped
    }

    fn is_empty(&self) -> bool {
        self.step.is_none() && self.order.is_none()
    }
}

/// In-process store used when no `REDIS_URL` is configured.
#[derive(Default)]
pub struct MemoryStateStore {
    slots: Mutex<HashMap<i64, Slot>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every expired step and order and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.slots.lock().await;
        let mut dropped = 0;
        slots.retain(|_, slot| {
            dropped += slot.prune(now);
            !slot.is_empty()
        });
        dropped
    }

    /// Number of chats holding a step or an order.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn set_step(&self, chat_id: i64, step: &ConversationState, ttl: Duration) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().await;
        slots.entry(chat_id).or_default().step = Some(Timed::new(step.clone(), ttl));
        Ok(())
    }

    async fn get_step(&self, chat_id: i64) -> Result<Option<ConversationState>, StoreError> {
        let now = Instant::now();
        let mut slots = self.slots.lock().await;
        let Some(slot) = slots.get_mut(&chat_id) else {
            return Ok(None);
        };
        slot.prune(now);
        let step = slot.step.as_ref().map(|s| s.value.clone());
        if slot.is_empty() {
            slots.remove(&chat_id);
        }
        Ok(step)
    }

    async fn set_order(&self, chat_id: i64, order: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().await;
        slots.entry(chat_id).or_default().order = Some(Timed::new(order.to_string(), ttl));
        Ok(())
    }

    async fn take_order(&self, chat_id: i64) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let mut slots = self.slots.lock().await;
        let Some(slot) = slots.get_mut(&chat_id) else {
            return Ok(None);
        };
        let order = slot.order.take().filter(|o| o.is_live(now)).map(|o| o.value);
        slot.prune(now);
        if slot.is_empty() {
            slots.remove(&chat_id);
        }
        Ok(order)
    }

    async fn clear(&self, chat_id: i64) -> Result<(), StoreError> {
        self.slots.lock().await.remove(&chat_id);
        Ok(())
    }
}
