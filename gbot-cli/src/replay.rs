//! Replays raw JSON events, one per line, through a router.

use std::sync::Arc;

use futures::future::join_all;
use gbot_core::HandlerResponse;
use handler_chain::Router;
use tracing::{error, info, instrument};

/// Result of dispatching one input line. Errors are kept as display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    /// 1-based line number in the input.
    pub line: usize,
    pub result: Result<HandlerResponse, String>,
}

/// Dispatches every non-blank line of `input`. Sequential mode preserves per-user ordering;
/// concurrent mode spawns one task per line. Outcomes are returned in line order either way.
#[instrument(skip(router, input))]
pub async fn replay(router: &Arc<Router>, input: &str, concurrent: bool) -> Vec<ReplayOutcome> {
    let events: Vec<(usize, String)> = input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect();
    info!(events = events.len(), "step: replay started");

    let outcomes = if concurrent {
        let tasks = events.into_iter().map(|(line, raw)| {
            let router = Arc::clone(router);
            async move {
                let handle =
                    tokio::spawn(async move { router.dispatch_raw(raw.as_bytes()).await });
                let result = match handle.await {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(e) => Err(format!("task failed: {}", e)),
                };
                ReplayOutcome { line, result }
            }
        });
        join_all(tasks).await
    } else {
        let mut outcomes = Vec::with_capacity(events.len());
        for (line, raw) in events {
            let result = router
                .dispatch_raw(raw.as_bytes())
                .await
                .map_err(|e| e.to_string());
            outcomes.push(ReplayOutcome { line, result });
        }
        outcomes
    };

    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            error!(line = outcome.line, error = %e, "Event failed");
        }
    }
    outcomes
}
