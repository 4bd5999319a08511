use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::{AuthUser, OptionalAuthUser};
use crate::db;
use crate::error::{AppError, found};
use crate::fmt;
use crate::forms::{EventForm, FormErrors, ProfileForm};
use crate::models::{Event, EventResponse, Profile, User, ViewerRole};
use crate::state::AppState;

const MSG_NO_EVENTS: &str = "No events are available.";
const MSG_PAST_NOTICE: &str = "This is a past event.";
const MSG_NO_CHOICE: &str = "You didn't select a choice.";
const MSG_LOGIN_PROMPT: &str =
    "Log in to respond to the event, or delete the event if you are the event creator.";

/// An event with its date and time already rendered for display.
#[derive(Serialize)]
pub struct EventView {
    pub id: i64,
    pub organizer: String,
    pub name: String,
    pub comment: String,
    pub address: String,
    pub geolocation: String,
    pub event_date: String,
    pub event_time: String,
}

impl From<Event> for EventView {
    fn from(e: Event) -> Self {
        EventView {
            id: e.id,
            organizer: e.organizer,
            name: e.name,
            comment: e.comment,
            address: e.address,
            geolocation: e.geolocation,
            event_date: fmt::date_display(e.event_date),
            event_time: fmt::time_display(e.event_time),
        }
    }
}

#[derive(Serialize)]
pub struct EventListPage {
    pub events: Vec<EventView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Serialize)]
pub struct EventFormPage {
    pub values: EventForm,
    pub errors: FormErrors,
}

#[derive(Serialize)]
pub struct EventDetailPage {
    pub event: EventView,
    pub responses: Vec<EventResponse>,
    pub is_past: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_notice: Option<&'static str>,
    pub viewer: ViewerRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_prompt: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn listing_page(pool: &SqlitePool) -> Result<EventListPage, AppError> {
    let now = Local::now().naive_local();
    let events = db::upcoming_events(pool, now).await?;
    let message = events.is_empty().then_some(MSG_NO_EVENTS);
    Ok(EventListPage {
        events: events.into_iter().map(EventView::from).collect(),
        message,
    })
}

fn role_for(user: Option<&User>, event: &Event) -> ViewerRole {
    match user {
        Some(u) if u.id == event.user_id => ViewerRole::Organizer,
        Some(_) => ViewerRole::Respondent,
        None => ViewerRole::Anonymous,
    }
}

async fn detail_page(
    pool: &SqlitePool,
    event: Event,
    viewer: ViewerRole,
    error: Option<&str>,
) -> Result<EventDetailPage, AppError> {
    let responses = db::event_responses(pool, event.id).await?;
    let is_past = event.starts_at() < Local::now().naive_local();
    Ok(EventDetailPage {
        event: event.into(),
        responses,
        is_past,
        past_notice: is_past.then_some(MSG_PAST_NOTICE),
        viewer,
        login_prompt: (viewer == ViewerRole::Anonymous).then_some(MSG_LOGIN_PROMPT),
        error: error.map(str::to_string),
    })
}

pub async fn list_events(State(state): State<AppState>) -> Result<Json<EventListPage>, AppError> {
    listing_page(&state.pool).await.map(Json)
}

/// Blank creation form. Gated like the POST, so logged-out visitors get the
/// login redirect instead of the form.
pub async fn new_event_form(_auth: AuthUser) -> Json<EventFormPage> {
    Json(EventFormPage {
        values: EventForm::default(),
        errors: FormErrors::default(),
    })
}

pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(form): Json<EventForm>,
) -> Result<Response, AppError> {
    let now = Local::now().naive_local();
    match form.validate(now) {
        Ok(new) => {
            let event = db::create_event(&state.pool, auth.user.id, &new).await?;
            tracing::info!(event_id = event.id, user = %auth.user.username, "event created");
            // Creation lands back on the (now refreshed) listing.
            Ok(Json(listing_page(&state.pool).await?).into_response())
        }
        // Validation failures re-display the form: submitted values echoed
        // back untouched, nothing persisted.
        Err(errors) => Ok(Json(EventFormPage {
            values: form,
            errors,
        })
        .into_response()),
    }
}

pub async fn event_detail(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<EventDetailPage>, AppError> {
    let event = db::get_event(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no event with id {event_id}")))?;
    let role = role_for(viewer.0.as_ref(), &event);
    detail_page(&state.pool, event, role, None).await.map(Json)
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct VotePayload {
    pub response: Option<i64>,
}

pub async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<i64>,
    Json(payload): Json<VotePayload>,
) -> Result<Response, AppError> {
    let event = db::get_event(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no event with id {event_id}")))?;

    if let Some(response_id) = payload.response {
        if db::cast_event_vote(&state.pool, event.id, response_id).await? {
            return Ok(found(&format!("/events/{}", event.id)));
        }
    }

    // No selection, or a response id that belongs to some other event:
    // re-display the detail page with the tallies unchanged.
    let role = role_for(Some(&auth.user), &event);
    let page = detail_page(&state.pool, event, role, Some(MSG_NO_CHOICE)).await?;
    Ok(Json(page).into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let event = db::get_event(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no event with id {event_id}")))?;
    if event.user_id != auth.user.id {
        return Err(AppError::Forbidden(
            "only the organizer may delete this event".to_string(),
        ));
    }
    db::delete_event(&state.pool, event.id).await?;
    tracing::info!(event_id = event.id, user = %auth.user.username, "event deleted");
    Ok(found("/events"))
}

// --- profile ---

#[derive(Serialize)]
pub struct ProfileView {
    pub full_name: String,
    pub bio: Option<String>,
    pub birthday: Option<String>,
}

impl From<Option<Profile>> for ProfileView {
    fn from(p: Option<Profile>) -> Self {
        match p {
            Some(p) => ProfileView {
                full_name: p.full_name,
                bio: p.bio,
                birthday: p.birthday.map(fmt::date_display),
            },
            None => ProfileView {
                full_name: String::new(),
                bio: None,
                birthday: None,
            },
        }
    }
}

/// The persisted profile, plus the rejected submission when the last update
/// failed validation.
#[derive(Serialize)]
pub struct ProfilePage {
    pub username: String,
    pub profile: ProfileView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted: Option<ProfileForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FormErrors>,
}

pub async fn profile_view(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfilePage>, AppError> {
    let profile = db::get_profile(&state.pool, auth.user.id).await?;
    Ok(Json(ProfilePage {
        username: auth.user.username,
        profile: profile.into(),
        submitted: None,
        errors: None,
    }))
}

pub async fn profile_update(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ProfilePage>, AppError> {
    match form.validate() {
        Ok(update) => {
            let saved = db::upsert_profile(&state.pool, auth.user.id, &update).await?;
            Ok(Json(ProfilePage {
                username: auth.user.username,
                profile: Some(saved).into(),
                submitted: None,
                errors: None,
            }))
        }
        Err(errors) => {
            // Previously saved values stay on display next to the rejected
            // submission.
            let profile = db::get_profile(&state.pool, auth.user.id).await?;
            Ok(Json(ProfilePage {
                username: auth.user.username,
                profile: profile.into(),
                submitted: Some(form),
                errors: Some(errors),
            }))
        }
    }
}
