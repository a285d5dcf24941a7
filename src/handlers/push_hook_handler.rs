use std::sync::Arc;

use axum::body::Bytes;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use tracing::Instrument;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::HookError;
use crate::hook_response::{DispatchError, HookResponse};
use crate::platform::SourceFilter;
use crate::signature::{self, SIGNATURE_HEADER};
use crate::webhook_payloads::forgejo::ForgejoPushWebhookPayload;

/// Event type headers, in the order they are consulted.
pub const EVENT_HEADERS: [&str; 3] = ["X-Forgejo-Event", "X-Gitea-Event", "X-GitHub-Event"];
pub const DELIVERY_HEADERS: [&str; 3] = [
    "X-Forgejo-Delivery",
    "X-Gitea-Delivery",
    "X-GitHub-Delivery",
];

const PUSH_EVENT: &str = "push";
const ERROR_LOG_TITLE: &str = "Forgejo Webhook";

pub async fn push_hook_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<HookResponse>, HookError> {
    let delivery = delivery_id(&headers);
    let span = tracing::info_span!("forgejo_hook", delivery = %delivery.as_str());

    let result = process_push(&state, &headers, &body).instrument(span).await;
    if let Err(e) = &result {
        tracing::warn!(delivery = %delivery.as_str(), "Rejected webhook: {e}");
    }

    result.map(Json)
}

/// Runs one delivery: authenticate, filter, look up app sources and create a
/// release for each of them.
///
/// Authentication and parse failures return before any platform write.
/// Release failures are collected per source and never fail the delivery.
/// A failed commit does: the delivery answers 502 and nothing is reported
/// as created.
pub async fn process_push(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<HookResponse, HookError> {
    let secret = state.settings().webhook_secret().await?;
    signature::verify(secret.as_deref(), header_value(headers, SIGNATURE_HEADER), body)?;

    let event = event_type(headers);
    if event != PUSH_EVENT {
        tracing::debug!("Ignoring {event:?} event");
        return Ok(HookResponse::ignored_event(event));
    }

    let payload = ForgejoPushWebhookPayload::from_slice(body)?;

    let Some(branch) = payload.branch() else {
        tracing::debug!("Ignoring push to {}", payload.reference);
        return Ok(HookResponse::not_a_branch_push(&payload.reference));
    };
    let repo = payload.repository_name();

    let Some(commit) = payload.head_commit() else {
        tracing::debug!("Push to {repo}@{branch} has no head commit");
        return Ok(HookResponse::no_head_commit());
    };

    if let Some(pusher) = &payload.pusher {
        tracing::debug!("Push to {repo}@{branch} by {}", pusher.display_name());
    }

    let filter = SourceFilter {
        repository: repo.to_string(),
        branch: branch.to_string(),
    };
    let sources = state.platform().find_app_sources(&filter).await?;

    if sources.is_empty() {
        tracing::info!("No App Source found for {repo}@{branch}");
        return Ok(HookResponse::no_sources(repo, branch));
    }

    let mut releases_created = vec![];
    let mut errors = vec![];

    for source in &sources {
        match state
            .platform()
            .create_app_release(&source.name, &source.app, commit)
            .await
        {
            Ok(()) => {
                tracing::info!("App Release created for {} at {}", source.name, commit.id);
                releases_created.push(source.name.clone());
            }
            Err(e) => {
                let message = e.to_string();

                let span = tracing::error_span!("Can't create App Release", source = %source.name);
                span.in_scope(|| {
                    tracing::error!("{message}");
                });

                state
                    .platform()
                    .log_error(
                        ERROR_LOG_TITLE,
                        &format!(
                            "Forgejo webhook App Release error for {}: {message}",
                            source.name
                        ),
                    )
                    .await;

                errors.push(DispatchError {
                    source: source.name.clone(),
                    error: message,
                });
            }
        }
    }

    state.platform().commit().await?;

    tracing::info!(
        created = releases_created.len(),
        failed = errors.len(),
        "Processed push to {repo}@{branch}"
    );

    Ok(HookResponse::Dispatched {
        repo: repo.to_string(),
        branch: branch.to_string(),
        commit: commit.short_id(),
        releases_created,
        errors,
    })
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// First non-empty event header, or `""` when none is set.
pub fn event_type(headers: &HeaderMap) -> &str {
    EVENT_HEADERS
        .iter()
        .filter_map(|name| header_value(headers, name))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn delivery_id(headers: &HeaderMap) -> String {
    DELIVERY_HEADERS
        .iter()
        .filter_map(|name| header_value(headers, name))
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
