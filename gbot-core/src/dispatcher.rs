//! Outbound reply abstraction.
//!
//! [`Dispatcher`] is transport-agnostic: the router never calls it, handlers do (through
//! `Context::dispatcher`). Implementations map to the platform's send API.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Message, SentMessage};

#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<SentMessage>;
    /// Replaces the text of an already-sent message.
    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()>;
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()>;
    /// Acknowledges a trigger-button press, optionally as an alert.
    async fn answer_callback(
        &self,
        chat_id: i64,
        callback_id: &str,
        text: &str,
        show_alert: bool,
    ) -> Result<()>;

    /// Sends a reply into the chat the message came from.
    async fn reply_to(&self, message: &Message, text: &str) -> Result<SentMessage> {
        self.send_text(message.chat_id, text).await
    }
}
