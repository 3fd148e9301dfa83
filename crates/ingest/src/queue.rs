//! Message source seam and the in-process queue

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::error::IngestError;

/// One delivered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Transport-assigned id, used for logging and settlement
    pub id: String,
    /// Raw JSON payload
    pub body: String,
    /// How many times this message has been delivered, including this one
    pub receive_count: u32,
}

/// Transport seam for ingestion.
///
/// The source owns delivery and redelivery. Workers only report the outcome
/// of each message through `ack` / `nack`.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Wait for up to `max` messages.
    ///
    /// An empty batch means the source is closed and drained.
    async fn receive(&self, max: usize) -> Result<Vec<Message>, IngestError>;

    /// The message was processed; do not deliver it again
    async fn ack(&self, message: &Message) -> Result<(), IngestError>;

    /// Processing failed; the source applies its redelivery policy
    async fn nack(&self, message: &Message) -> Result<(), IngestError>;
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Message>,
    in_flight: HashMap<String, Message>,
    dead_letters: Vec<Message>,
    closed: bool,
}

/// In-process queue with at-least-once delivery.
///
/// A nacked message goes back to the tail until it has been delivered
/// `max_receive_count` times, then it moves to the dead-letter list.
pub struct MemoryQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    max_receive_count: u32,
}

impl MemoryQueue {
    pub fn new(max_receive_count: u32) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            max_receive_count: max_receive_count.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue a payload, returning its message id
    pub fn send(&self, body: impl Into<String>) -> Result<String, IngestError> {
        let id = Uuid::new_v4().to_string();
        {
            let mut state = self.lock();
            if state.closed {
                return Err(IngestError::QueueClosed);
            }
            state.pending.push_back(Message {
                id: id.clone(),
                body: body.into(),
                receive_count: 0,
            });
        }
        self.notify.notify_waiters();
        Ok(id)
    }

    /// Stop accepting messages.
    ///
    /// Receivers keep getting pending and redelivered messages until
    /// nothing is left in flight, then receive an empty batch.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.lock().in_flight.len()
    }

    /// Messages that exhausted their deliveries
    pub fn dead_letters(&self) -> Vec<Message> {
        self.lock().dead_letters.clone()
    }

    fn settle(&self, message: &Message) -> Result<Message, IngestError> {
        self.lock()
            .in_flight
            .remove(&message.id)
            .ok_or_else(|| IngestError::Source(format!("message {} is not in flight", message.id)))
    }
}

#[async_trait]
impl MessageSource for MemoryQueue {
    async fn receive(&self, max: usize) -> Result<Vec<Message>, IngestError> {
        let max = max.max(1);

        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();

                if !state.pending.is_empty() {
                    let take = max.min(state.pending.len());
                    let drained: Vec<Message> = state.pending.drain(..take).collect();
                    let mut batch = Vec::with_capacity(take);
                    for mut message in drained {
                        message.receive_count += 1;
                        state.in_flight.insert(message.id.clone(), message.clone());
                        batch.push(message);
                    }
                    return Ok(batch);
                }

                if state.closed && state.in_flight.is_empty() {
                    return Ok(Vec::new());
                }
            }

            notified.await;
        }
    }

    async fn ack(&self, message: &Message) -> Result<(), IngestError> {
        self.settle(message)?;
        self.notify.notify_waiters();
        Ok(())
    }

    async fn nack(&self, message: &Message) -> Result<(), IngestError> {
        let message = self.settle(message)?;
        {
            let mut state = self.lock();
            if message.receive_count >= self.max_receive_count {
                tracing::warn!(
                    message_id = %message.id,
                    receive_count = message.receive_count,
                    "message moved to dead letters"
                );
                state.dead_letters.push(message);
            } else {
                state.pending.push_back(message);
            }
        }
        self.notify.notify_waiters();
        Ok(())
    }
}
