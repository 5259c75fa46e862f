//! Dispatcher that writes outbound messages to stdout.

use std::io::{self, Write};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use gbot_core::{Dispatcher, Result, SentMessage};
use tracing::info;

/// Prints every outbound action and keeps a transcript of sent texts as `(chat_id, text)`.
#[derive(Default)]
pub struct ConsoleDispatcher {
    next_id: AtomicI64,
    transcript: Mutex<Vec<(i64, String)>>,
}

impl ConsoleDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> Vec<(i64, String)> {
        self.transcript
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Dispatcher for ConsoleDispatcher {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<SentMessage> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        info!(chat_id = chat_id, message_id = message_id, text = %text, "Message sent");
        writeln!(io::stdout().lock(), "[chat {}] bot: {}", chat_id, text)?;
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.push((chat_id, text.to_string()));
        }
        Ok(SentMessage {
            chat_id,
            message_id,
        })
    }

    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        info!(chat_id = chat_id, message_id = message_id, "Message edited");
        writeln!(
            io::stdout().lock(),
            "[chat {}] bot edited #{}: {}",
            chat_id, message_id, text
        )?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        info!(chat_id = chat_id, message_id = message_id, "Message deleted");
        writeln!(io::stdout().lock(), "[chat {}] bot deleted #{}", chat_id, message_id)?;
        Ok(())
    }

    async fn answer_callback(
        &self,
        chat_id: i64,
        callback_id: &str,
        text: &str,
        show_alert: bool,
    ) -> Result<()> {
        info!(chat_id = chat_id, callback_id = %callback_id, show_alert = show_alert, "Callback answered");
        writeln!(
            io::stdout().lock(),
            "[chat {}] bot answered {}: {}",
            chat_id, callback_id, text
        )?;
        Ok(())
    }
}
