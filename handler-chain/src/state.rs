//! Per-user navigation state and the concurrent store that owns it.
//!
//! Every mutation of one user's [`UserState`] goes through a single DashMap entry guard, so events
//! from the same sender serialize their read-modify-write while different senders only contend
//! when they hash to the same shard. No guard is ever held across an `.await`.

use std::sync::Arc;

use dashmap::DashMap;
use gbot_core::{Message, ParamValue, Params};
use tracing::debug;

/// A navigation-stack frame: what was dispatched, with which message and params.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub endpoint: String,
    pub message: Arc<Message>,
    pub params: Params,
}

/// One-shot redirection for the sender's next event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingState {
    pub endpoint: String,
    pub params: Params,
}

impl PendingState {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Stack history (oldest first) and pending redirection of one sender.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    pub stack: Vec<State>,
    pub next: Option<PendingState>,
}

impl UserState {
    pub fn top(&self) -> Option<&State> {
        self.stack.last()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn endpoints(&self) -> Vec<&str> {
        self.stack.iter().map(|s| s.endpoint.as_str()).collect()
    }

    /// Pushes unless `frame` repeats the top endpoint. With `max_depth`, the oldest frames are
    /// dropped to stay within it. Returns whether a push happened.
    pub fn push_dedup(&mut self, frame: State, max_depth: Option<usize>) -> bool {
        if self.top().is_some_and(|top| top.endpoint == frame.endpoint) {
            return false;
        }
        self.stack.push(frame);
        if let Some(max) = max_depth {
            let excess = self.stack.len().saturating_sub(max.max(1));
            if excess > 0 {
                self.stack.drain(..excess);
            }
        }
        true
    }
}

#[derive(Debug, Default)]
pub struct StateStore {
    users: DashMap<i64, UserState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` on the user's state under the entry guard, creating the state if absent.
    pub fn update<R>(&self, user_id: i64, f: impl FnOnce(&mut UserState) -> R) -> R {
        let mut entry = self.users.entry(user_id).or_default();
        f(entry.value_mut())
    }

    /// Copy of the user's state; empty when the user has never been seen.
    pub fn snapshot(&self, user_id: i64) -> UserState {
        self.users
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.users.contains_key(&user_id)
    }

    pub fn depth(&self, user_id: i64) -> usize {
        self.users
            .get(&user_id)
            .map_or(0, |entry| entry.value().depth())
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Drops the most recent frame, if any, and returns the state after the pop.
    pub fn pop(&self, user_id: i64) -> UserState {
        match self.users.get_mut(&user_id) {
            Some(mut entry) => {
                let popped = entry.stack.pop();
                debug!(
                    user_id = user_id,
                    endpoint = ?popped.as_ref().map(|s| s.endpoint.as_str()),
                    depth = entry.stack.len(),
                    "step: navigation frame popped"
                );
                entry.value().clone()
            }
            None => UserState::default(),
        }
    }

    /// Replaces any pending redirection of the user.
    pub fn set_next(&self, user_id: i64, pending: PendingState) {
        debug!(user_id = user_id, endpoint = %pending.endpoint, "step: pending next state set");
        self.update(user_id, |state| state.next = Some(pending));
    }

    /// Clears stack and pending redirection of a known user.
    pub fn reset(&self, user_id: i64) {
        if let Some(mut entry) = self.users.get_mut(&user_id) {
            *entry.value_mut() = UserState::default();
        }
    }

    pub fn remove(&self, user_id: i64) -> Option<UserState> {
        self.users.remove(&user_id).map(|(_, state)| state)
    }
}
