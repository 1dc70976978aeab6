//! Notification feed handlers
//!
//! `GET /notifications` returns the current list once; `GET
//! /notifications/stream` pushes a fresh list as a server-sent event on every
//! poll interval until the client goes away.

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures_util::StreamExt;
use shared::Notification;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::NotificationService;
use crate::AppState;

fn service(state: &AppState) -> NotificationService {
    NotificationService::new(state.db.clone(), state.config.notifications.limit)
}

/// Current notifications for the caller
pub async fn get_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = service(&state)
        .notifications_for(&current_user.0)
        .await?;
    Ok(Json(notifications))
}

/// Session-bound notification stream
pub async fn stream_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));

    let interval = Duration::from_secs(state.config.notifications.poll_interval_secs.max(1));
    let user_id = current_user.0.user_id;
    tracing::debug!(user_id = %user_id, "Notification stream opened");

    let events = service(&state)
        .watch(current_user.0, interval)
        .filter_map(|notifications| async move {
            let data = serde_json::to_string(&notifications).ok()?;
            Some(Ok::<_, Infallible>(
                Event::default().event("notifications").data(data),
            ))
        });

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}
