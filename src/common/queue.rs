//! Broadcast queue for one-to-many event delivery.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{ConvoflowError, Result};

/// Broadcast queue where every subscriber receives every message.
///
/// Sending with no subscribers is not an error for the caller; the message
/// is simply dropped. Backed by tokio's broadcast channel.
#[derive(Clone)]
pub struct BroadcastQueue<T> {
    sender: Arc<broadcast::Sender<T>>,
}

impl<T: Clone> BroadcastQueue<T> {
    /// create a new broadcast queue
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, _) = broadcast::channel(cap);

        Arc::new(Self {
            sender: Arc::new(tx),
        })
    }

    /// send a message to all current subscribers
    pub fn send(
        &self,
        msg: T,
    ) -> Result<()> {
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender.send(msg).map_err(|e| ConvoflowError::Queue(e.to_string()))?;
        Ok(())
    }

    /// subscribe to the queue
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let queue = BroadcastQueue::new(4);
        let mut rx1 = queue.subscribe();
        let mut rx2 = queue.subscribe();

        queue.send(7u8).unwrap();

        assert_eq!(rx1.recv().await.unwrap(), 7);
        assert_eq!(rx2.recv().await.unwrap(), 7);
    }

    #[test]
    fn test_send_without_subscribers() {
        let queue = BroadcastQueue::new(4);
        assert!(queue.send(1u8).is_ok());
    }
}
