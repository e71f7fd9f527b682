//! Gateway ingest integration tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use aegis_classifier::{AttributeScores, ClassifierError, ScoreEvaluator};
use aegis_common::AppResult;
use aegis_common::config::TriageConfig;
use aegis_core::{
    GuildChannels, LookupError, MessageLookup, MessageRef, MessageSnapshot, Platform,
    TriageCoordinator, UserRef,
};
use aegis_gateway::{AppState, router};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;
use tower::ServiceExt;

struct NullPlatform {
    dms: Mutex<Vec<(u64, String)>>,
    next_post_id: AtomicU64,
}

impl NullPlatform {
    fn new() -> Self {
        Self {
            dms: Mutex::new(Vec::new()),
            next_post_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl MessageLookup for NullPlatform {
    async fn fetch_message(&self, _message: &MessageRef) -> Result<MessageSnapshot, LookupError> {
        Err(LookupError::MessageNotFound)
    }
}

#[async_trait]
impl Platform for NullPlatform {
    async fn send_direct_message(&self, user_id: u64, text: &str) -> AppResult<()> {
        self.dms.lock().unwrap().push((user_id, text.to_string()));
        Ok(())
    }

    async fn post_to_channel(&self, _channel_id: u64, _text: &str) -> AppResult<u64> {
        Ok(self.next_post_id.fetch_add(1, Ordering::SeqCst))
    }
}

struct NullEvaluator;

#[async_trait]
impl ScoreEvaluator for NullEvaluator {
    async fn score(&self, _text: &str) -> Result<AttributeScores, ClassifierError> {
        Err(ClassifierError::MalformedResponse("unscripted".to_string()))
    }
}

fn test_app() -> (Router, Arc<NullPlatform>) {
    let platform = Arc::new(NullPlatform::new());
    let guilds = HashMap::from([(
        123,
        GuildChannels {
            monitored_channel_id: 456,
            moderation_channel_id: 999,
        },
    )]);
    let coordinator = TriageCoordinator::new(
        Arc::new(NullEvaluator),
        Arc::clone(&platform) as Arc<dyn Platform>,
        guilds,
        TriageConfig::default(),
        1,
    );
    let app = router().with_state(AppState::new(coordinator));
    (app, platform)
}

fn post_event(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/events")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (app, _) = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn direct_message_event_starts_dialogue() {
    let (app, platform) = test_app();

    let response = app
        .oneshot(post_event(json!({
            "type": "direct_message",
            "author": { "id": 7, "username": "reporter" },
            "content": "report"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let dms = platform.dms.lock().unwrap().clone();
    assert_eq!(dms.len(), 1);
    assert!(dms[0].1.contains("Copy Message Link"));
}

#[tokio::test]
async fn reaction_on_unknown_flag_is_accepted() {
    let (app, _) = test_app();

    // Reaction in the moderation channel on a message with no pending flag:
    // an expected race, acknowledged without error
    let response = app
        .oneshot(post_event(json!({
            "type": "reaction_add",
            "message": { "guild_id": 123, "channel_id": 999, "message_id": 5555 },
            "reactor": { "id": 77, "username": "mod" },
            "emoji": "💩"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_event_is_rejected() {
    let (app, _) = test_app();

    let response = app
        .oneshot(post_event(json!({ "type": "unknown_event" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
