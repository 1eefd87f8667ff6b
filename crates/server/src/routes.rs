//! Interaction endpoints:
//!
//! - `POST /vote`  — button callback casting or retracting a vote
//! - `POST /end`   — button callback closing the poll
//! - `POST /lunch` — slash command managing lunch-restaurant preferences
//! - `GET  /img/*` — static assets (proportional bar image)
//! - `GET  /health` — service and database probe (`health` module)

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use pollbot_core::poll::PollView;
use pollbot_db::{DbPool, LunchRepository, RepositoryError};
use pollbot_mattermost::directory::NameResolver;
use pollbot_mattermost::help;
use pollbot_mattermost::message::{ActionContext, Attachment, CommandResponse};
use pollbot_mattermost::render::{format_poll, format_user_vote};
use pollbot_mattermost::urls::PollUrls;

use crate::store::{PollStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub polls: Arc<dyn PollStore>,
    pub lunch: Arc<dyn LunchRepository>,
    pub resolver: Arc<dyn NameResolver>,
    pub urls: PollUrls,
}

pub fn router(state: AppState, db_pool: DbPool) -> Router {
    Router::new()
        .route("/vote", post(cast_vote))
        .route("/end", post(end_poll))
        .route("/lunch", post(lunch_command))
        .with_state(state)
        .merge(crate::health::router(db_pool))
        .nest_service("/img", ServeDir::new("static"))
}

/// Button callback body: the pressing user plus the context blob we embedded
/// when the actions were generated.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub user_id: String,
    pub context: ActionContext,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<MessageUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ephemeral_text: Option<String>,
}

impl ActionResponse {
    fn ephemeral(text: impl Into<String>) -> Self {
        Self { update: None, ephemeral_text: Some(text.into()) }
    }
}

/// In-place replacement of the poll message.
#[derive(Debug, Serialize)]
pub struct MessageUpdate {
    pub message: String,
    pub props: PostProps,
}

#[derive(Debug, Serialize)]
pub struct PostProps {
    pub attachments: Vec<Attachment>,
}

impl MessageUpdate {
    fn from_rendered(message: impl Into<String>, rendered: CommandResponse) -> Self {
        Self { message: message.into(), props: PostProps { attachments: rendered.attachments } }
    }
}

pub async fn cast_vote(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> (StatusCode, Json<ActionResponse>) {
    let Some(vote_id) = request.context.vote_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ActionResponse::ephemeral("Vote callback without an option.")),
        );
    };

    match state.polls.record_vote(&request.context.poll_id, &request.user_id, vote_id).await {
        Ok(poll) => {
            info!(
                event_name = "server.poll.vote_recorded",
                poll_id = %request.context.poll_id,
                vote_id,
                "vote recorded"
            );
            let rendered = format_poll(&poll, &state.urls, state.resolver.as_ref()).await;
            let summary = format_user_vote(&poll, &request.user_id);
            (
                StatusCode::OK,
                Json(ActionResponse {
                    update: Some(MessageUpdate::from_rendered(poll.message(), rendered)),
                    ephemeral_text: Some(format!("Your vote: {summary}")),
                }),
            )
        }
        Err(err @ StoreError::UnknownPoll(_)) => {
            warn!(event_name = "server.poll.vote_rejected", error = %err, "vote rejected");
            (StatusCode::OK, Json(ActionResponse::ephemeral("This poll no longer exists.")))
        }
        Err(err @ StoreError::UnknownOption { .. }) => {
            warn!(event_name = "server.poll.vote_rejected", error = %err, "vote rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(ActionResponse::ephemeral("This poll has no such option.")),
            )
        }
    }
}

pub async fn end_poll(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> (StatusCode, Json<ActionResponse>) {
    match state.polls.mark_finished(&request.context.poll_id).await {
        Ok(poll) => {
            info!(
                event_name = "server.poll.ended",
                poll_id = %request.context.poll_id,
                num_voters = poll.num_voters(),
                "poll ended"
            );
            let rendered = format_poll(&poll, &state.urls, state.resolver.as_ref()).await;
            (
                StatusCode::OK,
                Json(ActionResponse {
                    update: Some(MessageUpdate::from_rendered(poll.message(), rendered)),
                    ephemeral_text: None,
                }),
            )
        }
        Err(err) => {
            warn!(event_name = "server.poll.end_rejected", error = %err, "end rejected");
            (StatusCode::OK, Json(ActionResponse::ephemeral("This poll no longer exists.")))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SlashCommandRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub command: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum LunchCommand {
    Help,
    List,
    Remove(String),
    Add(String),
}

fn parse_lunch_command(text: &str) -> LunchCommand {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return LunchCommand::List;
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
    let rest = parts.collect::<Vec<_>>().join(" ");

    match verb.as_str() {
        "help" => LunchCommand::Help,
        "list" => LunchCommand::List,
        "remove" if !rest.is_empty() => LunchCommand::Remove(rest),
        _ => LunchCommand::Add(trimmed.to_owned()),
    }
}

pub async fn lunch_command(
    State(state): State<AppState>,
    Form(request): Form<SlashCommandRequest>,
) -> Json<CommandResponse> {
    let command =
        if request.command.is_empty() { "/lunch".to_owned() } else { request.command.clone() };

    let response = match parse_lunch_command(&request.text) {
        LunchCommand::Help => CommandResponse::ephemeral(help::format_help(&command)),
        LunchCommand::List => match state.lunch.list_restaurants().await {
            Ok(restaurants) if restaurants.is_empty() => {
                CommandResponse::ephemeral("No restaurants registered yet.")
            }
            Ok(restaurants) => {
                let lines: Vec<String> =
                    restaurants.iter().map(|restaurant| format!("- {restaurant}")).collect();
                CommandResponse::ephemeral(format!(
                    "Registered restaurants:\n{}",
                    lines.join("\n")
                ))
            }
            Err(err) => lunch_failure(err),
        },
        LunchCommand::Add(restaurant) => {
            match state.lunch.add_restaurant(&request.user_id, &restaurant).await {
                Ok(()) => CommandResponse::ephemeral(format!("Registered `{restaurant}` for lunch.")),
                Err(RepositoryError::DuplicateAuthor(_)) => CommandResponse::ephemeral(
                    "You already registered a restaurant. Remove it before picking a new one.",
                ),
                Err(err) => lunch_failure(err),
            }
        }
        LunchCommand::Remove(restaurant) => {
            match state.lunch.remove_restaurant(&restaurant).await {
                Ok(0) => CommandResponse::ephemeral(format!("No entry for `{restaurant}`.")),
                Ok(1) => CommandResponse::ephemeral(format!("Removed 1 entry for `{restaurant}`.")),
                Ok(removed) => CommandResponse::ephemeral(format!(
                    "Removed {removed} entries for `{restaurant}`."
                )),
                Err(err) => lunch_failure(err),
            }
        }
    };

    Json(response)
}

fn lunch_failure(err: RepositoryError) -> CommandResponse {
    error!(event_name = "server.lunch.repository_failed", error = %err, "lunch command failed");
    CommandResponse::ephemeral("Could not update lunch preferences, please try again later.")
}
