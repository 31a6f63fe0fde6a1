use super::Message;
use crate::error::ProtocolError;
use std::collections::VecDeque;

/// One direction of a cross-frame channel.
///
/// Delivery is fire-and-forget: `post` only fails when the other side is gone.
pub trait FramePort {
    fn post(&mut self, message: &Message) -> Result<(), ProtocolError>;
}

/// Posts `message` and swallows any failure after logging it.
///
/// Returns whether the message was handed over.
pub fn send_best_effort(port: &mut dyn FramePort, message: &Message) -> bool {
    match port.post(message) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(message_type = message.kind(), error = %e, "message not delivered");
            false
        }
    }
}

/// An in-memory port that queues posted messages until the receiver drains them.
#[derive(Debug, Default, Clone)]
pub struct MessageChannel {
    queue: VecDeque<Message>,
    closed: bool,
}

impl MessageChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the receiving window going away.
    pub fn close(&mut self) {
        self.closed = true;
        self.queue.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn recv(&mut self) -> Option<Message> {
        self.queue.pop_front()
    }

    pub fn drain(&mut self) -> Vec<Message> {
        self.queue.drain(..).collect()
    }
}

impl FramePort for MessageChannel {
    fn post(&mut self, message: &Message) -> Result<(), ProtocolError> {
        if self.closed {
            return Err(ProtocolError::PortClosed("channel closed".to_string()));
        }
        self.queue.push_back(message.clone());
        Ok(())
    }
}
