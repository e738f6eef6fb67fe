// File: crates/elements_booking/src/handlers.rs
use crate::logic::{
    availability_window, confirm_booking, element_token, exchange_code, parse_slot,
    resolve_contact, schedule_contacts, submit_slot, ScheduleOutcome, AVAILABILITY_PERMISSIONS,
    HOME_PERMISSIONS,
};
use crate::views::{AvailabilityContext, HomeContext, Views};
use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{Html, Json},
};
use chrono::{SecondsFormat, Utc};
use elements_common::services::{CalendarEvent, SchedulingApi};
use elements_common::ElementsError;
use elements_config::AppConfig;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Shared state for every booking route.
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub api: Arc<dyn SchedulingApi>,
    pub views: Arc<Views>,
}

impl BookingState {
    /// Compiles the views; fails only if a template is broken.
    pub fn new(config: Arc<AppConfig>, api: Arc<dyn SchedulingApi>) -> Result<Self, ElementsError> {
        Ok(Self {
            config,
            api,
            views: Arc::new(Views::new()?),
        })
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    /// Authorization code Cronofy appends when redirecting back.
    pub code: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[derive(Debug, Deserialize)]
pub struct SubmitQuery {
    /// JSON encoded `{"start": ..., "end": ...}`.
    pub slot: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Contact the scheduling link was issued for.
    pub id: Option<String>,
}

/// Booking notification. Only the event is read; other fields are ignored.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize)]
pub struct CallbackPayload {
    pub event: CalendarEvent,
}

/// Landing page. Redeems `?code=` when present, then renders the widgets.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/",
    params(HomeQuery),
    responses(
        (status = 200, description = "Home page with calendar widgets", content_type = "text/html", body = String),
        (status = 500, description = "Template failed to render")
    ),
    tag = "Elements"
))]
pub async fn home_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<HomeQuery>,
) -> Result<Html<String>, ElementsError> {
    let config = &state.config;

    if let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) {
        if let Err(kind) = exchange_code(state.api.as_ref(), config, code).await {
            info!("Rendering home without a redeemed code ({:?})", kind);
        }
    }

    let token = element_token(state.api.as_ref(), config, &HOME_PERMISSIONS).await;
    let html = state.views.home(&HomeContext {
        element_token: &token.element_token.token,
        client_id: &config.cronofy.client_id,
        data_center: &config.cronofy.data_center,
        redirect_uri: &config.web.origin,
    })?;
    Ok(Html(html))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    responses(
        (status = 200, description = "Availability viewer page", content_type = "text/html", body = String),
        (status = 500, description = "Template failed to render")
    ),
    tag = "Elements"
))]
pub async fn availability_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Html<String>, ElementsError> {
    let config = &state.config;
    let token = element_token(state.api.as_ref(), config, &AVAILABILITY_PERMISSIONS).await;
    let window = availability_window(Utc::now(), config.scheduling.window_days);

    let html = state.views.availability(&AvailabilityContext {
        element_token: &token.element_token.token,
        sub: &config.cronofy.sub,
        data_center: &config.cronofy.data_center,
        duration_minutes: config.scheduling.required_duration_minutes,
        period_start: window.start.to_rfc3339_opts(SecondsFormat::Secs, true),
        period_end: window.end.to_rfc3339_opts(SecondsFormat::Secs, true),
    })?;
    Ok(Html(html))
}

/// Starts one real-time scheduling link per contact.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/real-time-schedule-click",
    responses(
        (status = 200, description = "At least one contact got a booking link", body = ScheduleOutcome),
        (status = 500, description = "Calendar unavailable or every contact failed")
    ),
    tag = "Elements"
))]
pub async fn real_time_schedule_click_handler(
    State(state): State<Arc<BookingState>>,
    body: Bytes,
) -> Result<Json<ScheduleOutcome>, ElementsError> {
    info!(
        "Real-time schedule click received: {}",
        String::from_utf8_lossy(&body)
    );
    let outcome = schedule_contacts(state.api.as_ref(), &state.config, Utc::now()).await?;
    Ok(Json(outcome))
}

/// Books a slot picked in the availability viewer and confirms it.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/submit",
    params(SubmitQuery),
    responses(
        (status = 200, description = "Confirmation page", content_type = "text/html", body = String),
        (status = 400, description = "Missing or malformed slot"),
        (status = 502, description = "Calendar write failed")
    ),
    tag = "Elements"
))]
pub async fn submit_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<SubmitQuery>,
) -> Result<Html<String>, ElementsError> {
    let slot = parse_slot(query.slot.as_deref())?;
    let confirmation = submit_slot(state.api.as_ref(), &state.config, &slot).await?;
    info!(
        "Submitted slot booked for {} {}-{}",
        confirmation.meeting_date, confirmation.start, confirmation.end
    );
    Ok(Html(state.views.submit(&confirmation)?))
}

/// Receives Cronofy's booking notification for a real-time scheduling link.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/callback-url",
    params(CallbackQuery),
    request_body = CallbackPayload,
    responses(
        (status = 200, description = "Event written", content_type = "text/plain", body = String),
        (status = 400, description = "Missing or unknown contact id"),
        (status = 502, description = "Calendar write failed; Cronofy will retry")
    ),
    tag = "Elements"
))]
pub async fn callback_url_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<CallbackQuery>,
    Json(payload): Json<CallbackPayload>,
) -> Result<&'static str, ElementsError> {
    let contact = resolve_contact(&state.config, query.id.as_deref())?;
    info!(
        "Booking callback for contact {} ({}), event {}",
        contact.id, contact.name, payload.event.event_id
    );
    confirm_booking(state.api.as_ref(), contact, payload.event).await?;
    Ok("OK")
}
