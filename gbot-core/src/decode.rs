//! Decodes one raw inbound event (JSON) into a [`Message`].
//!
//! The envelope carries `chat_id` (number or numeric string), `id`, `text`, `data`, `type` and
//! `from`; the type-specific payload arrives JSON-encoded inside `data` and is decoded into the
//! matching [`MessageKind`] variant.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::error::DecodeError;
use crate::types::{
    null_as_default, CallbackQuery, FormData, Message, MessageKind, MessageType, User,
};

/// Text given to join events so they route like a start command.
pub const JOIN_TEXT: &str = "/start";
/// Text given to leave events.
pub const LEAVE_TEXT: &str = "/leave";

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    chat_id: Value,
    #[serde(default)]
    id: i64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    data: String,
    #[serde(rename = "type", default)]
    message_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    from: User,
}

/// Decodes a raw event body.
#[instrument(skip(raw), fields(len = raw.len()))]
pub fn decode_message(raw: &[u8]) -> Result<Message, DecodeError> {
    let event: RawEvent = serde_json::from_slice(raw)?;
    let chat_id = coerce_chat_id(&event.chat_id)?;
    let message_type: MessageType = event.message_type.parse()?;

    let mut message_id = event.id;
    let mut text = event.text;
    let data = event.data;

    let kind = match message_type {
        MessageType::Text => {
            text = data.clone();
            MessageKind::Text
        }
        MessageType::Image => MessageKind::Image(payload("image", &data)?),
        MessageType::Video => MessageKind::Video(payload("video", &data)?),
        MessageType::Audio => MessageKind::Audio(payload("audio", &data)?),
        MessageType::Voice => MessageKind::Voice(payload("voice", &data)?),
        MessageType::File => MessageKind::File(payload("file", &data)?),
        MessageType::Contact => MessageKind::Contact(payload("contact", &data)?),
        MessageType::Location => MessageKind::Location(payload("location", &data)?),
        MessageType::PayCallback => MessageKind::PayCallback(payload("payment info", &data)?),
        MessageType::SubmitForm => {
            let mut form: FormData = payload("form data", &data)?;
            form.fields = form_fields(&form.raw);
            MessageKind::SubmitForm(form)
        }
        MessageType::TriggerButton => {
            let mut query: CallbackQuery = payload("callback query", &data)?;
            query.action = payload("callback query action", &query.raw)?;
            message_id = query.message_id;
            MessageKind::TriggerButton(query)
        }
        MessageType::Join => {
            text = JOIN_TEXT.to_string();
            MessageKind::Join
        }
        MessageType::Leave => {
            text = LEAVE_TEXT.to_string();
            MessageKind::Leave
        }
        MessageType::InvoiceCallback => MessageKind::InvoiceCallback,
    };

    debug!(
        chat_id = chat_id,
        user_id = event.from.id,
        message_type = %message_type,
        "step: inbound event decoded"
    );

    Ok(Message {
        chat_id,
        message_id,
        from: event.from,
        text,
        data,
        kind,
    })
}

/// Integers within i64 and numeric strings are accepted; fractional or out-of-range numbers and
/// non-numeric strings are rejected. Anything else (null, missing) is 0.
fn coerce_chat_id(value: &Value) -> Result<i64, DecodeError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| DecodeError::InvalidChatId(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| DecodeError::InvalidChatId(s.clone())),
        _ => Ok(0),
    }
}

fn payload<T: DeserializeOwned>(kind: &'static str, data: &str) -> Result<T, DecodeError> {
    serde_json::from_str(data).map_err(|source| DecodeError::Payload { kind, source })
}

/// First value of every key in the query part of a submitted form (`path?k=v&...`).
fn form_fields(raw: &str) -> HashMap<String, String> {
    let query = raw.split_once('?').map_or(raw, |(_, q)| q);
    let mut fields = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        fields
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    fields
}
