//! # gbot-core
//!
//! Core types for the gbot runtime: the typed inbound [`Message`], the [`decode_message`] decoder,
//! error types, the outbound [`Dispatcher`] trait and tracing initialization. Used by
//! handler-chain, middleware and gbot-cli.

pub mod decode;
pub mod dispatcher;
pub mod error;
pub mod logger;
pub mod types;

pub use decode::{decode_message, JOIN_TEXT, LEAVE_TEXT};
pub use dispatcher::Dispatcher;
pub use error::{DecodeError, GbotError, HandlerError, Result};
pub use logger::init_tracing;
pub use types::{
    CallbackQuery, CallbackQueryAction, Contact, File, FormData, HandlerResponse, ImageUrls,
    Location, Message, MessageKind, MessageType, ParamValue, Params, PaymentInfo, SentMessage,
    User,
};
