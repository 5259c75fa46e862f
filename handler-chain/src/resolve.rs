//! Endpoint resolution: routing key and extra parameters from an inbound message.

use std::collections::HashMap;

use gbot_core::{Message, ParamValue, Params};
use tracing::debug;

/// Routing key plus the parameters extracted while deriving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub endpoint: String,
    pub params: Params,
}

/// Trigger-button events route to their action's target (action params included); everything
/// else routes on the message text. In both cases a `path?k=v` query is split off into params,
/// and query values win over action params with the same key.
pub fn resolve_endpoint(message: &Message) -> Resolution {
    let mut params = Params::new();
    let raw = match message.callback_action() {
        Some(action) => {
            for (key, value) in &action.params {
                params.insert(key.clone(), ParamValue::Single(value.clone()));
            }
            action.target_endpoint.as_str()
        }
        None => message.text.as_str(),
    };

    match split_endpoint(raw) {
        Some((endpoint, query)) => {
            params.extend(query);
            Resolution { endpoint, params }
        }
        None => {
            debug!(text = %raw, "step: malformed query, routing on literal text");
            Resolution {
                endpoint: raw.to_string(),
                params,
            }
        }
    }
}

/// Splits `path?query` into the path and its parsed query. `None` when the text is malformed.
pub fn split_endpoint(text: &str) -> Option<(String, Params)> {
    if is_malformed(text) {
        return None;
    }
    match text.split_once('?') {
        Some((path, query)) => {
            let query = query.split_once('#').map_or(query, |(q, _)| q);
            Some((path.to_string(), parse_query(query)))
        }
        None => Some((text.to_string(), Params::new())),
    }
}

/// Form-urlencoded query to params: a key seen once maps to a single value, a repeated key to
/// all its values in order.
pub fn parse_query(query: &str) -> Params {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        grouped
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    grouped
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                ParamValue::Single(values.remove(0))
            } else {
                ParamValue::Multi(values)
            };
            (key, value)
        })
        .collect()
}

/// Control characters or a `%` not followed by two hex digits.
fn is_malformed(text: &str) -> bool {
    if text.chars().any(|c| c.is_ascii_control()) {
        return true;
    }
    let bytes = text.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}
