//! Core types: sender, typed inbound message, callback action, parameters, handler response.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// Sender identity as delivered in the `from` field of an inbound event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub uu_id: String,
    #[serde(default, rename = "user")]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Closed set of inbound event kinds. The wire tag is what the platform sends in `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    Voice,
    File,
    Contact,
    Location,
    Join,
    Leave,
    SubmitForm,
    TriggerButton,
    PayCallback,
    InvoiceCallback,
}

impl MessageType {
    pub const ALL: [MessageType; 14] = [
        MessageType::Text,
        MessageType::Image,
        MessageType::Video,
        MessageType::Audio,
        MessageType::Voice,
        MessageType::File,
        MessageType::Contact,
        MessageType::Location,
        MessageType::Join,
        MessageType::Leave,
        MessageType::SubmitForm,
        MessageType::TriggerButton,
        MessageType::PayCallback,
        MessageType::InvoiceCallback,
    ];

    /// Wire tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Video => "video",
            MessageType::Audio => "audio",
            MessageType::Voice => "msgVoice",
            MessageType::File => "file",
            MessageType::Contact => "contact",
            MessageType::Location => "location",
            MessageType::Join => "join",
            MessageType::Leave => "leave",
            MessageType::SubmitForm => "submitForm",
            MessageType::TriggerButton => "triggerButton",
            MessageType::PayCallback => "paycallback",
            MessageType::InvoiceCallback => "invoicecallback",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = DecodeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| DecodeError::UnknownType(tag.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageUrls {
    #[serde(default, rename = "64")]
    pub url_64: String,
    #[serde(default, rename = "128")]
    pub url_128: String,
    #[serde(default, rename = "256")]
    pub url_256: String,
    #[serde(default, rename = "512")]
    pub url_512: String,
}

/// Uploaded media descriptor shared by image, video, audio, voice and file events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    pub id: i64,
    #[serde(rename = "SID")]
    pub sid: String,
    #[serde(rename = "RoundVideo")]
    pub round_video: bool,
    pub extension: String,
    pub filename: String,
    pub filesize: i64,
    #[serde(rename = "type")]
    pub file_type: String,
    pub width: i64,
    pub height: i64,
    pub duration: f64,
    pub desc: String,
    pub path: String,
    #[serde(rename = "image_urls")]
    pub screenshots: ImageUrls,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub id: i64,
    #[serde(rename = "phone")]
    pub phone_number: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub lat: String,
    pub long: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentInfo {
    pub ref_id: String,
    pub message_id: String,
    pub status: String,
}

/// Submitted form. `fields` holds the first value of each key of the query part of `raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub message_id: i64,
    pub callback_id: String,
    #[serde(rename = "data")]
    pub raw: String,
    #[serde(skip)]
    pub fields: HashMap<String, String>,
}

/// Target of an inline button: where to route and with which parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQueryAction {
    #[serde(rename = "state_path")]
    pub target_endpoint: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: HashMap<String, String>,
}

impl CallbackQueryAction {
    pub fn new(target_endpoint: impl Into<String>) -> Self {
        Self {
            target_endpoint: target_endpoint.into(),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Trigger-button payload. `raw` is the JSON-encoded [`CallbackQueryAction`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackQuery {
    pub message_id: i64,
    #[serde(rename = "data")]
    pub raw: String,
    pub callback_id: String,
    #[serde(skip)]
    pub action: CallbackQueryAction,
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Type-specific payload. The variant is the message's type tag, so exactly one payload exists.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    Text,
    Image(File),
    Video(File),
    Audio(File),
    Voice(File),
    File(File),
    Contact(Contact),
    Location(Location),
    Join,
    Leave,
    SubmitForm(FormData),
    TriggerButton(CallbackQuery),
    PayCallback(PaymentInfo),
    /// Not decoded further; the payload stays in [`Message::data`].
    InvoiceCallback,
}

impl MessageKind {
    pub fn message_type(&self) -> MessageType {
        match self {
            MessageKind::Text => MessageType::Text,
            MessageKind::Image(_) => MessageType::Image,
            MessageKind::Video(_) => MessageType::Video,
            MessageKind::Audio(_) => MessageType::Audio,
            MessageKind::Voice(_) => MessageType::Voice,
            MessageKind::File(_) => MessageType::File,
            MessageKind::Contact(_) => MessageType::Contact,
            MessageKind::Location(_) => MessageType::Location,
            MessageKind::Join => MessageType::Join,
            MessageKind::Leave => MessageType::Leave,
            MessageKind::SubmitForm(_) => MessageType::SubmitForm,
            MessageKind::TriggerButton(_) => MessageType::TriggerButton,
            MessageKind::PayCallback(_) => MessageType::PayCallback,
            MessageKind::InvoiceCallback => MessageType::InvoiceCallback,
        }
    }
}

/// A decoded inbound event.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub chat_id: i64,
    pub message_id: i64,
    pub from: User,
    /// Routing text. Set from `data` for text events and to `/start` / `/leave` for join / leave.
    pub text: String,
    /// Raw payload string as received.
    pub data: String,
    pub kind: MessageKind,
}

impl Message {
    /// Builds a text event from `user_id` in `chat_id`.
    pub fn text(chat_id: i64, user_id: i64, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            chat_id,
            message_id: 0,
            from: User {
                id: user_id,
                ..User::default()
            },
            data: text.clone(),
            text,
            kind: MessageKind::Text,
        }
    }

    /// Builds a trigger-button event carrying `action`.
    pub fn callback(chat_id: i64, user_id: i64, action: CallbackQueryAction) -> Self {
        Self {
            chat_id,
            message_id: 0,
            from: User {
                id: user_id,
                ..User::default()
            },
            text: String::new(),
            data: String::new(),
            kind: MessageKind::TriggerButton(CallbackQuery {
                action,
                ..CallbackQuery::default()
            }),
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.kind.message_type()
    }

    /// Sender id; navigation state is keyed by it.
    pub fn sender_id(&self) -> i64 {
        self.from.id
    }

    pub fn callback_action(&self) -> Option<&CallbackQueryAction> {
        match &self.kind {
            MessageKind::TriggerButton(query) => Some(&query.action),
            _ => None,
        }
    }

    /// Media descriptor for image, video, audio, voice and file events.
    pub fn file(&self) -> Option<&File> {
        match &self.kind {
            MessageKind::Image(f)
            | MessageKind::Video(f)
            | MessageKind::Audio(f)
            | MessageKind::Voice(f)
            | MessageKind::File(f) => Some(f),
            _ => None,
        }
    }
}

/// A routing parameter: one value, or several when a query key repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Multi(Vec<String>),
}

impl ParamValue {
    /// The value when there is exactly one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Single(s) => Some(s),
            ParamValue::Multi(_) => None,
        }
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Single(s) => Some(s),
            ParamValue::Multi(values) => values.first().map(String::as_str),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            ParamValue::Single(s) => vec![s.as_str()],
            ParamValue::Multi(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Multi(values)
    }
}

/// Parameter map carried by a dispatch and snapshotted into navigation frames.
pub type Params = HashMap<String, ParamValue>;

/// Reply id returned by a [`crate::Dispatcher`] after sending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub message_id: i64,
}

/// Result of a handler, and of a whole dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Neutral result: nothing to report.
    Empty,
    /// No handler matched and no default handler is configured.
    Unhandled,
    /// A reply went out through the dispatcher.
    Sent(SentMessage),
    /// Reply body produced without sending it.
    Reply(String),
}

impl HandlerResponse {
    pub fn is_unhandled(&self) -> bool {
        matches!(self, HandlerResponse::Unhandled)
    }
}
