//! Concurrent dispatch: per-user isolation and no lost navigation updates under contention.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{text, AskThen, Counter};
use futures::future::join_all;
use handler_chain::Router;

/// **Test: 1000 concurrent dispatches for one user with distinct endpoints all land on the stack.**
///
/// **Setup:** default handler counts calls; no endpoints registered.
/// **Action:** spawn `/e0` .. `/e999` for user 1 on a multi-threaded runtime.
/// **Expected:** 1000 calls; stack depth 1000 with every endpoint present once.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_same_user_distinct_endpoints_no_lost_updates() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::builder()
        .default_handler(Counter(calls.clone()))
        .build();

    let tasks: Vec<_> = (0..1000)
        .map(|i| {
            let router = Arc::clone(&router);
            tokio::spawn(async move { router.dispatch(text(1, &format!("/e{}", i))).await })
        })
        .collect();
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1000);
    let state = router.store().snapshot(1);
    assert_eq!(state.depth(), 1000);
    let mut endpoints: Vec<_> = state.endpoints().into_iter().map(String::from).collect();
    endpoints.sort();
    endpoints.dedup();
    assert_eq!(endpoints.len(), 1000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_same_user_same_endpoint_keeps_one_frame() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::builder().handle("/e", Counter(calls.clone())).build();

    let tasks: Vec<_> = (0..1000)
        .map(|_| {
            let router = Arc::clone(&router);
            tokio::spawn(async move { router.dispatch(text(1, "/e")).await })
        })
        .collect();
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1000);
    assert_eq!(router.store().depth(1), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_users_are_isolated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::builder()
        .handle("/ask", AskThen { target: "/answer" })
        .default_handler(Counter(calls.clone()))
        .build();

    let tasks: Vec<_> = (0..200)
        .map(|user| {
            let router = Arc::clone(&router);
            tokio::spawn(async move {
                router.dispatch(text(user, "/home")).await?;
                if user % 2 == 0 {
                    router.dispatch(text(user, "/ask")).await?;
                }
                router.dispatch(text(user, &format!("/page{}", user))).await
            })
        })
        .collect();
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(router.store().user_count(), 200);
    for user in 0..200 {
        let state = router.store().snapshot(user);
        let page = format!("/page{}", user);
        if user % 2 == 0 {
            assert_eq!(state.endpoints(), vec!["/home", "/ask", page.as_str()]);
            assert!(state.next.is_none(), "user {} kept a pending next", user);
        } else {
            assert_eq!(state.endpoints(), vec!["/home", page.as_str()]);
        }
    }
    // Every unmatched event hit the default handler; the even users' /pageN went to /answer,
    // which is unregistered and so also falls back to the default.
    assert_eq!(calls.load(Ordering::SeqCst), 400);
}
